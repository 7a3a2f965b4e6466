//! Response shapes. Related records are referenced by primary key.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::IssuedToken;
use crate::ordering::{
    Booking, BookingId, Catalog, MenuItemId, OrderId, Restaurant, RestaurantId, Seat,
    SeatBooking, SeatBookingId, SeatId, Table, TableId, User, UserId,
};

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub restaurants: Vec<RestaurantId>,
}

impl UserView {
    pub fn build(catalog: &Catalog, user: &User) -> Self {
        Self {
            id: user.id,
            employee_id: user.employee_id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_active: user.is_active,
            date_joined: user.date_joined,
            last_login: user.last_login,
            restaurants: catalog.user_restaurants(user.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginView {
    pub expiry: DateTime<Utc>,
    pub token: String,
    pub user: UserView,
}

impl LoginView {
    pub fn build(catalog: &Catalog, issued: IssuedToken) -> Self {
        Self {
            expiry: issued.expiry,
            user: UserView::build(catalog, &issued.user),
            token: issued.token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RestaurantView {
    pub id: RestaurantId,
    pub name: String,
    pub employees: Vec<UserId>,
    pub tables: Vec<TableId>,
    pub menu_items: Vec<MenuItemId>,
}

impl RestaurantView {
    pub fn build(catalog: &Catalog, restaurant: &Restaurant) -> Self {
        Self {
            id: restaurant.id,
            name: restaurant.name.clone(),
            employees: restaurant.employees.iter().copied().collect(),
            tables: catalog.restaurant_tables(restaurant.id),
            menu_items: catalog.restaurant_menu(restaurant.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TableView {
    pub id: TableId,
    pub number: u32,
    pub true_number: Option<u32>,
    pub restaurant: RestaurantId,
    pub container_table: Option<TableId>,
    pub sub_tables: Vec<TableId>,
    pub seats: Vec<SeatId>,
}

impl TableView {
    pub fn build(catalog: &Catalog, table: &Table) -> Self {
        Self {
            id: table.id,
            number: table.number,
            true_number: catalog.true_number(table.id),
            restaurant: table.restaurant,
            container_table: table.container_table,
            sub_tables: catalog.sub_tables(table.id),
            seats: catalog.table_seats(table.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeatView {
    pub id: SeatId,
    pub table: TableId,
    pub location_index: u32,
    pub restaurant: Option<RestaurantId>,
}

impl SeatView {
    pub fn build(catalog: &Catalog, seat: &Seat) -> Self {
        Self {
            id: seat.id,
            table: seat.table,
            location_index: seat.location_index,
            restaurant: catalog.seat_restaurant(seat.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingView {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub restaurant: Option<RestaurantId>,
    pub tables: Vec<TableId>,
    pub seat_bookings: Vec<SeatBookingId>,
    pub orders: Vec<OrderId>,
}

impl BookingView {
    pub fn build(catalog: &Catalog, booking: &Booking) -> Self {
        Self {
            id: booking.id,
            start: booking.start,
            end: booking.end,
            restaurant: catalog.booking_restaurant(booking.id),
            tables: catalog.booking_tables(booking.id),
            seat_bookings: catalog.booking_seat_bookings(booking.id),
            orders: catalog.booking_orders(booking.id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeatBookingView {
    pub id: SeatBookingId,
    pub seat: SeatId,
    pub booking: BookingId,
    pub orders: Vec<OrderId>,
}

impl SeatBookingView {
    pub fn build(catalog: &Catalog, seat_booking: &SeatBooking) -> Self {
        Self {
            id: seat_booking.id,
            seat: seat_booking.seat,
            booking: seat_booking.booking,
            orders: catalog.seat_booking_orders(seat_booking.id),
        }
    }
}
