//! SmartServe: table-service ordering for restaurants.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod ordering;
pub mod telemetry;
pub mod testdata;

pub use error::AppError;
