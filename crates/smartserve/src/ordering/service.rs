use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::catalog::{Catalog, EmployeeAssignment};
use super::domain::{
    Booking, BookingId, MenuItem, MenuItemId, NewMenuItem, NewOrder, NewRestaurant, NewSeat,
    NewTable, NewUser, Order, OrderId, Restaurant, RestaurantId, Seat, SeatBooking,
    SeatBookingId, SeatId, Table, TableId, User, UserChanges, UserId,
};
use super::error::OrderingError;
use super::repository::{CatalogStore, StoreError};

/// Service owning the live catalog and writing every accepted change through
/// the store.
pub struct OrderingService<S> {
    store: Arc<S>,
    catalog: RwLock<Catalog>,
}

impl<S> OrderingService<S>
where
    S: CatalogStore + 'static,
{
    /// Loads the current snapshot from the store.
    pub fn open(store: Arc<S>) -> Result<Self, StoreError> {
        let catalog = store.load()?;
        info!(
            users = catalog.user_count(),
            "ordering catalog loaded"
        );
        Ok(Self {
            store,
            catalog: RwLock::new(catalog),
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Runs a query against the current catalog.
    pub fn read<T>(&self, query: impl FnOnce(&Catalog) -> T) -> T {
        let catalog = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        query(&catalog)
    }

    pub fn snapshot(&self) -> Catalog {
        self.read(Catalog::clone)
    }

    /// Applies a mutation to a scratch copy, persists it, then publishes it.
    /// On any error the live catalog is left untouched.
    pub fn transact<T>(
        &self,
        mutation: impl FnOnce(&mut Catalog) -> Result<T, OrderingError>,
    ) -> Result<T, OrderingError> {
        let mut live = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        let mut scratch = live.clone();
        let output = mutation(&mut scratch)?;
        self.store.persist(&scratch)?;
        *live = scratch;
        Ok(output)
    }

    fn run<T>(
        &self,
        action: &'static str,
        mutation: impl FnOnce(&mut Catalog) -> Result<T, OrderingError>,
    ) -> Result<T, OrderingError> {
        match self.transact(mutation) {
            Ok(output) => {
                info!(action, "catalog updated");
                Ok(output)
            }
            Err(err) => {
                warn!(action, error = %err, "catalog change rejected");
                Err(err)
            }
        }
    }

    pub fn create_user(
        &self,
        new: NewUser,
        password: String,
        now: DateTime<Utc>,
    ) -> Result<User, OrderingError> {
        self.run("create_user", |catalog| catalog.create_user(new, password, now))
    }

    pub fn create_superuser(
        &self,
        new: NewUser,
        password: String,
        now: DateTime<Utc>,
    ) -> Result<User, OrderingError> {
        self.run("create_superuser", |catalog| {
            catalog.create_superuser(new, password, now, None, None)
        })
    }

    pub fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, OrderingError> {
        self.run("update_user", |catalog| catalog.update_user(id, changes))
    }

    pub fn set_password(&self, id: UserId, password: String) -> Result<(), OrderingError> {
        self.run("set_password", |catalog| catalog.set_password(id, password))
    }

    pub fn delete_user(&self, id: UserId) -> Result<User, OrderingError> {
        self.run("delete_user", |catalog| catalog.delete_user(id))
    }

    pub fn create_restaurant(&self, new: NewRestaurant) -> Result<Restaurant, OrderingError> {
        self.run("create_restaurant", |catalog| catalog.create_restaurant(new))
    }

    pub fn rename_restaurant(
        &self,
        id: RestaurantId,
        name: String,
    ) -> Result<Restaurant, OrderingError> {
        self.run("rename_restaurant", |catalog| catalog.rename_restaurant(id, name))
    }

    pub fn delete_restaurant(&self, id: RestaurantId) -> Result<Restaurant, OrderingError> {
        self.run("delete_restaurant", |catalog| catalog.delete_restaurant(id))
    }

    pub fn add_employees(
        &self,
        restaurant: RestaurantId,
        users: &[UserId],
    ) -> Result<EmployeeAssignment<UserId>, OrderingError> {
        let outcome = self.run("add_employees", |catalog| {
            catalog.add_employees(restaurant, users)
        })?;
        if !outcome.rejected.is_empty() {
            warn!(
                %restaurant,
                rejected = ?outcome.rejected,
                "employees sharing a full name with existing staff were not added"
            );
        }
        Ok(outcome)
    }

    pub fn set_user_restaurants(
        &self,
        user: UserId,
        restaurants: &[RestaurantId],
    ) -> Result<EmployeeAssignment<RestaurantId>, OrderingError> {
        let outcome = self.run("set_user_restaurants", |catalog| {
            catalog.set_user_restaurants(user, restaurants)
        })?;
        if !outcome.rejected.is_empty() {
            warn!(
                %user,
                rejected = ?outcome.rejected,
                "restaurants already employing a namesake were skipped"
            );
        }
        Ok(outcome)
    }

    pub fn remove_employee(
        &self,
        restaurant: RestaurantId,
        user: UserId,
    ) -> Result<bool, OrderingError> {
        self.run("remove_employee", |catalog| {
            catalog.remove_employee(restaurant, user)
        })
    }

    pub fn create_table(&self, new: NewTable) -> Result<Table, OrderingError> {
        self.run("create_table", |catalog| catalog.create_table(new))
    }

    pub fn set_container_table(
        &self,
        table: TableId,
        container: Option<TableId>,
    ) -> Result<Table, OrderingError> {
        self.run("set_container_table", |catalog| {
            catalog.set_container_table(table, container)
        })
    }

    pub fn delete_table(&self, id: TableId) -> Result<Table, OrderingError> {
        self.run("delete_table", |catalog| catalog.delete_table(id))
    }

    pub fn create_seat(&self, new: NewSeat) -> Result<Seat, OrderingError> {
        self.run("create_seat", |catalog| catalog.create_seat(new))
    }

    pub fn delete_seat(&self, id: SeatId) -> Result<Seat, OrderingError> {
        self.run("delete_seat", |catalog| catalog.delete_seat(id))
    }

    pub fn book_table(
        &self,
        table: TableId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Booking, OrderingError> {
        self.run("book_table", |catalog| catalog.book_table(table, start, end))
    }

    pub fn create_booking(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Booking, OrderingError> {
        self.run("create_booking", |catalog| catalog.create_booking(start, end))
    }

    pub fn add_seat_booking(
        &self,
        booking: BookingId,
        seat: SeatId,
    ) -> Result<SeatBooking, OrderingError> {
        self.run("add_seat_booking", |catalog| {
            catalog.add_seat_booking(booking, seat)
        })
    }

    pub fn reschedule_booking(
        &self,
        booking: BookingId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Booking, OrderingError> {
        self.run("reschedule_booking", |catalog| {
            catalog.reschedule_booking(booking, start, end)
        })
    }

    pub fn delete_booking(&self, id: BookingId) -> Result<Booking, OrderingError> {
        self.run("delete_booking", |catalog| catalog.delete_booking(id))
    }

    pub fn delete_seat_booking(&self, id: SeatBookingId) -> Result<SeatBooking, OrderingError> {
        self.run("delete_seat_booking", |catalog| catalog.delete_seat_booking(id))
    }

    pub fn create_menu_item(&self, new: NewMenuItem) -> Result<MenuItem, OrderingError> {
        self.run("create_menu_item", |catalog| catalog.create_menu_item(new))
    }

    pub fn set_menu_item_availability(
        &self,
        id: MenuItemId,
        restaurants: &[RestaurantId],
    ) -> Result<MenuItem, OrderingError> {
        self.run("set_menu_item_availability", |catalog| {
            catalog.set_menu_item_availability(id, restaurants)
        })
    }

    pub fn delete_menu_item(&self, id: MenuItemId) -> Result<MenuItem, OrderingError> {
        self.run("delete_menu_item", |catalog| catalog.delete_menu_item(id))
    }

    pub fn place_order(&self, new: NewOrder) -> Result<Order, OrderingError> {
        self.run("place_order", |catalog| catalog.place_order(new))
    }

    pub fn delete_order(&self, id: OrderId) -> Result<Order, OrderingError> {
        self.run("delete_order", |catalog| catalog.delete_order(id))
    }
}
