//! List queries, with the narrowing options staff use when browsing records.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::Catalog;
use crate::ordering::domain::{
    Booking, BookingId, Course, MenuItem, Order, Restaurant, RestaurantId, Seat, SeatBooking,
    Table, TableId, User,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserFilter {
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
    pub restaurant: Option<RestaurantId>,
}

/// Inclusive ranges over how many employees and tables a restaurant has.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RestaurantFilter {
    pub min_employees: Option<usize>,
    pub max_employees: Option<usize>,
    pub min_tables: Option<usize>,
    pub max_tables: Option<usize>,
}

/// Which tables to list with respect to container tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum SubTableFilter {
    #[default]
    #[serde(rename = "0")]
    TopLevel,
    #[serde(rename = "1")]
    Only,
    #[serde(rename = "all")]
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableFilter {
    pub restaurant: Option<RestaurantId>,
    pub sub_tables: SubTableFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeatFilter {
    pub restaurant: Option<RestaurantId>,
    pub table: Option<TableId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookingFilter {
    pub restaurant: Option<RestaurantId>,
    pub start_after: Option<DateTime<Utc>>,
    pub start_before: Option<DateTime<Utc>>,
    pub end_after: Option<DateTime<Utc>>,
    pub end_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeatBookingFilter {
    pub restaurant: Option<RestaurantId>,
    pub booking: Option<BookingId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MenuItemFilter {
    pub restaurant: Option<RestaurantId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderFilter {
    pub booking: Option<BookingId>,
    pub course: Option<Course>,
}

fn within(value: usize, min: Option<usize>, max: Option<usize>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

fn between(
    value: DateTime<Utc>,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
) -> bool {
    after.map_or(true, |after| value >= after) && before.map_or(true, |before| value <= before)
}

impl Catalog {
    pub fn list_users(&self, filter: &UserFilter) -> Vec<&User> {
        let employer = filter
            .restaurant
            .and_then(|restaurant| self.restaurants.get(&restaurant));
        if filter.restaurant.is_some() && employer.is_none() {
            return Vec::new();
        }

        self.users
            .values()
            .filter(|user| filter.is_staff.map_or(true, |flag| user.is_staff == flag))
            .filter(|user| filter.is_active.map_or(true, |flag| user.is_active == flag))
            .filter(|user| employer.map_or(true, |r| r.employees.contains(&user.id)))
            .collect()
    }

    pub fn list_restaurants(&self, filter: &RestaurantFilter) -> Vec<&Restaurant> {
        self.restaurants
            .values()
            .filter(|restaurant| {
                within(
                    restaurant.employees.len(),
                    filter.min_employees,
                    filter.max_employees,
                )
            })
            .filter(|restaurant| {
                within(
                    self.restaurant_tables(restaurant.id).len(),
                    filter.min_tables,
                    filter.max_tables,
                )
            })
            .collect()
    }

    pub fn list_tables(&self, filter: &TableFilter) -> Vec<&Table> {
        self.tables
            .values()
            .filter(|table| filter.restaurant.map_or(true, |r| table.restaurant == r))
            .filter(|table| match filter.sub_tables {
                SubTableFilter::TopLevel => table.container_table.is_none(),
                SubTableFilter::Only => table.container_table.is_some(),
                SubTableFilter::All => true,
            })
            .collect()
    }

    pub fn list_seats(&self, filter: &SeatFilter) -> Vec<&Seat> {
        self.seats
            .values()
            .filter(|seat| filter.table.map_or(true, |table| seat.table == table))
            .filter(|seat| {
                filter
                    .restaurant
                    .map_or(true, |r| self.seat_restaurant(seat.id) == Some(r))
            })
            .collect()
    }

    pub fn list_bookings(&self, filter: &BookingFilter) -> Vec<&Booking> {
        self.bookings
            .values()
            .filter(|booking| {
                filter
                    .restaurant
                    .map_or(true, |r| self.booking_restaurant(booking.id) == Some(r))
            })
            .filter(|booking| between(booking.start, filter.start_after, filter.start_before))
            .filter(|booking| between(booking.end, filter.end_after, filter.end_before))
            .collect()
    }

    pub fn list_seat_bookings(&self, filter: &SeatBookingFilter) -> Vec<&SeatBooking> {
        self.seat_bookings
            .values()
            .filter(|seat_booking| filter.booking.map_or(true, |b| seat_booking.booking == b))
            .filter(|seat_booking| {
                filter
                    .restaurant
                    .map_or(true, |r| self.seat_restaurant(seat_booking.seat) == Some(r))
            })
            .collect()
    }

    pub fn list_menu_items(&self, filter: &MenuItemFilter) -> Vec<&MenuItem> {
        self.menu_items
            .values()
            .filter(|item| {
                filter
                    .restaurant
                    .map_or(true, |r| item.available_at.contains(&r))
            })
            .collect()
    }

    pub fn list_orders(&self, filter: &OrderFilter) -> Vec<&Order> {
        self.orders
            .values()
            .filter(|order| filter.course.map_or(true, |course| order.course == course))
            .filter(|order| {
                filter.booking.map_or(true, |booking| {
                    self.seat_bookings
                        .get(&order.seat_booking)
                        .is_some_and(|seat_booking| seat_booking.booking == booking)
                })
            })
            .collect()
    }
}
