//! Restaurants, their floor plans, bookings, menus and orders.

pub mod catalog;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{
    BookingFilter, Catalog, EmployeeAssignment, MenuItemFilter, OrderFilter, RestaurantFilter,
    SeatBookingFilter, SeatFilter, SubTableFilter, TableFilter, UserFilter,
};
pub use domain::{
    AuthToken, Booking, BookingId, Course, MenuItem, MenuItemId, NewMenuItem, NewOrder,
    NewRestaurant, NewSeat, NewTable, NewUser, Order, OrderId, Restaurant, RestaurantId, Seat,
    SeatBooking, SeatBookingId, SeatId, Table, TableId, User, UserChanges, UserId,
};
pub use error::OrderingError;
pub use repository::{CatalogStore, JsonFileStore, MemoryStore, StoreError};
pub use service::OrderingService;
pub use validation::{ValidationError, NON_FIELD_ERRORS};
