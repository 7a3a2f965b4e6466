pub mod auth;
pub mod bookings;
pub mod floor;
pub mod menu;
pub mod restaurants;
pub mod users;

use std::fmt::Display;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::ordering::ValidationError;

pub type Created<T> = (StatusCode, Json<T>);

pub(crate) fn created<T: Serialize>(body: T) -> Created<T> {
    (StatusCode::CREATED, Json(body))
}

/// Flags a reference in a request body that names no existing record.
pub(crate) fn check_pk(errors: &mut ValidationError, field: &str, exists: bool, id: impl Display) {
    if !exists {
        errors.add(field, format!("Invalid pk \"{id}\" - object does not exist."));
    }
}

/// Unwraps a required body field, recording why it is unusable.
pub(crate) fn required(errors: &mut ValidationError, field: &str, value: Option<String>) -> String {
    match value {
        None => {
            errors.add(field, "This field is required.");
            String::new()
        }
        Some(value) if value.trim().is_empty() => {
            errors.add(field, "This field may not be blank.");
            String::new()
        }
        Some(value) => value,
    }
}
