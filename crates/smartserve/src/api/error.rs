use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;
use crate::ordering::{OrderingError, ValidationError};

const FORBIDDEN: &str = "You do not have permission to perform this action.";
const NOT_FOUND: &str = "Not found.";
const INVALID_PAGE: &str = "Invalid page.";
const SERVER_ERROR: &str = "A server error occurred.";

/// Underlying failure text of a 500 response, surfaced only when DEBUG is on.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

/// Failure of an API request, rendered in the shape API clients expect.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(AuthError),
    #[error("You do not have permission to perform this action.")]
    Forbidden,
    #[error("Not found.")]
    NotFound,
    #[error("Invalid page.")]
    InvalidPage,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Validation(ValidationError),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(errors: ValidationError) -> Self {
        Self::Validation(errors)
    }
}

impl From<OrderingError> for ApiError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::Validation(errors) => Self::Validation(errors),
            OrderingError::NotFound { .. } => Self::NotFound,
            OrderingError::Protected { .. } => Self::Conflict(err.to_string()),
            OrderingError::Store(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Ordering(inner) => inner.into(),
            AuthError::InvalidCredentials => {
                Self::Validation(ValidationError::general(err.to_string()))
            }
            AuthError::ExpiryOutOfRange { .. } => Self::Internal(err.to_string()),
            other => Self::Unauthorized(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(err) => {
                let mut response = (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "detail": err.to_string() })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
                response
            }
            ApiError::Forbidden => detail(StatusCode::FORBIDDEN, FORBIDDEN),
            ApiError::NotFound => detail(StatusCode::NOT_FOUND, NOT_FOUND),
            ApiError::InvalidPage => detail(StatusCode::NOT_FOUND, INVALID_PAGE),
            ApiError::BadRequest(message) => detail(StatusCode::BAD_REQUEST, &message),
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::Conflict(message) => detail(StatusCode::CONFLICT, &message),
            ApiError::Internal(message) => {
                error!(error = %message, "request failed");
                let mut response = detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR);
                response.extensions_mut().insert(ErrorDetail(message));
                response
            }
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}
