//! In-memory relational state of the ordering system.
//!
//! Every mutation validates the whole change before touching state, so a
//! rejected call leaves the catalog exactly as it was. Relationship queries
//! (a table's seats, a booking's restaurant, ...) are derived on demand rather
//! than stored.

mod bookings;
mod filters;
mod floor;
mod menu;
mod staff;
mod tokens;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::domain::{
    AuthToken, Booking, BookingId, MenuItem, MenuItemId, Order, OrderId, Restaurant,
    RestaurantId, Seat, SeatBooking, SeatBookingId, SeatId, Table, TableId, User, UserId,
};
use super::error::OrderingError;

pub use filters::{
    BookingFilter, MenuItemFilter, OrderFilter, RestaurantFilter, SeatBookingFilter, SeatFilter,
    SubTableFilter, TableFilter, UserFilter,
};
pub use staff::EmployeeAssignment;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Sequences {
    user: u64,
    restaurant: u64,
    table: u64,
    seat: u64,
    booking: u64,
    seat_booking: u64,
    menu_item: u64,
    order: u64,
}

fn advance(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// Snapshot of every entity, serializable as a whole for persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) restaurants: BTreeMap<RestaurantId, Restaurant>,
    pub(crate) tables: BTreeMap<TableId, Table>,
    pub(crate) seats: BTreeMap<SeatId, Seat>,
    pub(crate) bookings: BTreeMap<BookingId, Booking>,
    pub(crate) seat_bookings: BTreeMap<SeatBookingId, SeatBooking>,
    pub(crate) menu_items: BTreeMap<MenuItemId, MenuItem>,
    pub(crate) orders: BTreeMap<OrderId, Order>,
    pub(crate) auth_tokens: BTreeMap<String, AuthToken>,
    pub(crate) sequences: Sequences,
}

fn require<'a, K, V>(
    map: &'a BTreeMap<K, V>,
    id: K,
    entity: &'static str,
) -> Result<&'a V, OrderingError>
where
    K: Ord + Copy,
    u64: From<K>,
{
    map.get(&id)
        .ok_or_else(|| OrderingError::not_found(entity, id))
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self, id: UserId) -> Result<&User, OrderingError> {
        require(&self.users, id, "user")
    }

    pub fn restaurant(&self, id: RestaurantId) -> Result<&Restaurant, OrderingError> {
        require(&self.restaurants, id, "restaurant")
    }

    pub fn table(&self, id: TableId) -> Result<&Table, OrderingError> {
        require(&self.tables, id, "table")
    }

    pub fn seat(&self, id: SeatId) -> Result<&Seat, OrderingError> {
        require(&self.seats, id, "seat")
    }

    pub fn booking(&self, id: BookingId) -> Result<&Booking, OrderingError> {
        require(&self.bookings, id, "booking")
    }

    pub fn seat_booking(&self, id: SeatBookingId) -> Result<&SeatBooking, OrderingError> {
        require(&self.seat_bookings, id, "seat booking")
    }

    pub fn menu_item(&self, id: MenuItemId) -> Result<&MenuItem, OrderingError> {
        require(&self.menu_items, id, "menu item")
    }

    pub fn order(&self, id: OrderId) -> Result<&Order, OrderingError> {
        require(&self.orders, id, "order")
    }

    pub fn user_by_employee_id(&self, employee_id: &str) -> Option<&User> {
        self.users
            .values()
            .find(|user| user.employee_id == employee_id)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Restaurants employing the user, in id order.
    pub fn user_restaurants(&self, user: UserId) -> Vec<RestaurantId> {
        self.restaurants
            .values()
            .filter(|restaurant| restaurant.employees.contains(&user))
            .map(|restaurant| restaurant.id)
            .collect()
    }

    pub fn restaurant_tables(&self, restaurant: RestaurantId) -> Vec<TableId> {
        self.tables
            .values()
            .filter(|table| table.restaurant == restaurant)
            .map(|table| table.id)
            .collect()
    }

    pub fn restaurant_menu(&self, restaurant: RestaurantId) -> Vec<MenuItemId> {
        self.menu_items
            .values()
            .filter(|item| item.available_at.contains(&restaurant))
            .map(|item| item.id)
            .collect()
    }

    pub fn sub_tables(&self, table: TableId) -> Vec<TableId> {
        self.tables
            .values()
            .filter(|candidate| candidate.container_table == Some(table))
            .map(|candidate| candidate.id)
            .collect()
    }

    /// Seats physically attached to the table, ignoring sub tables.
    pub fn direct_seats(&self, table: TableId) -> Vec<SeatId> {
        self.seats
            .values()
            .filter(|seat| seat.table == table)
            .map(|seat| seat.id)
            .collect()
    }

    /// Seats that belong to the table. A top-level table owns its seats plus
    /// every seat of its (transitive) sub tables; a sub table owns only its
    /// direct seats.
    pub fn table_seats(&self, table: TableId) -> Vec<SeatId> {
        let Some(root) = self.tables.get(&table) else {
            return Vec::new();
        };
        if root.container_table.is_some() {
            return self.direct_seats(table);
        }

        let mut seats = BTreeSet::new();
        for member in self.table_family(table) {
            seats.extend(self.direct_seats(member));
        }
        seats.into_iter().collect()
    }

    /// The table and all of its transitive sub tables.
    pub(crate) fn table_family(&self, table: TableId) -> BTreeSet<TableId> {
        let mut family = BTreeSet::new();
        let mut pending = vec![table];
        while let Some(current) = pending.pop() {
            if family.insert(current) {
                pending.extend(self.sub_tables(current));
            }
        }
        family
    }

    /// Number of the outermost container table.
    pub fn true_number(&self, table: TableId) -> Option<u32> {
        let mut current = self.tables.get(&table)?;
        let mut visited = BTreeSet::from([current.id]);
        while let Some(parent) = current.container_table {
            match self.tables.get(&parent) {
                Some(next) if visited.insert(next.id) => current = next,
                _ => break,
            }
        }
        Some(current.number)
    }

    /// Bookings that reserve any seat belonging to the table.
    pub fn table_bookings(&self, table: TableId) -> Vec<BookingId> {
        let seats: BTreeSet<SeatId> = self.table_seats(table).into_iter().collect();
        let bookings: BTreeSet<BookingId> = self
            .seat_bookings
            .values()
            .filter(|seat_booking| seats.contains(&seat_booking.seat))
            .map(|seat_booking| seat_booking.booking)
            .collect();
        bookings.into_iter().collect()
    }

    pub fn seat_restaurant(&self, seat: SeatId) -> Option<RestaurantId> {
        let seat = self.seats.get(&seat)?;
        self.tables.get(&seat.table).map(|table| table.restaurant)
    }

    pub fn booking_seat_bookings(&self, booking: BookingId) -> Vec<SeatBookingId> {
        self.seat_bookings
            .values()
            .filter(|seat_booking| seat_booking.booking == booking)
            .map(|seat_booking| seat_booking.id)
            .collect()
    }

    /// Distinct tables whose seats are reserved by the booking.
    pub fn booking_tables(&self, booking: BookingId) -> Vec<TableId> {
        let tables: BTreeSet<TableId> = self
            .seat_bookings
            .values()
            .filter(|seat_booking| seat_booking.booking == booking)
            .filter_map(|seat_booking| self.seats.get(&seat_booking.seat))
            .map(|seat| seat.table)
            .collect();
        tables.into_iter().collect()
    }

    /// Restaurant of the booking's first table; `None` while nothing is reserved.
    pub fn booking_restaurant(&self, booking: BookingId) -> Option<RestaurantId> {
        self.booking_tables(booking)
            .first()
            .and_then(|table| self.tables.get(table))
            .map(|table| table.restaurant)
    }

    pub fn booking_orders(&self, booking: BookingId) -> Vec<OrderId> {
        let seat_bookings: BTreeSet<SeatBookingId> =
            self.booking_seat_bookings(booking).into_iter().collect();
        self.orders
            .values()
            .filter(|order| seat_bookings.contains(&order.seat_booking))
            .map(|order| order.id)
            .collect()
    }

    pub fn seat_booking_restaurant(&self, seat_booking: SeatBookingId) -> Option<RestaurantId> {
        let seat_booking = self.seat_bookings.get(&seat_booking)?;
        self.seat_restaurant(seat_booking.seat)
    }

    pub fn seat_booking_orders(&self, seat_booking: SeatBookingId) -> Vec<OrderId> {
        self.orders
            .values()
            .filter(|order| order.seat_booking == seat_booking)
            .map(|order| order.id)
            .collect()
    }
}
