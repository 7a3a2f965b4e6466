//! Token authentication and password handling for staff accounts.

pub mod password;
pub mod token;
pub mod validators;

pub use password::PasswordHasher;
pub use token::{Authenticated, Authenticator, IssuedToken, TokenPolicy, TOKEN_KEY_LENGTH};
pub use validators::{CommonPasswords, PasswordPolicy, UserAttributes};

use crate::ordering::{OrderingError, ValidationError};

/// Authentication failure, worded the way API clients see it.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,
    #[error("{0}")]
    MalformedHeader(&'static str),
    #[error("Invalid token.")]
    InvalidToken,
    #[error("User inactive or deleted.")]
    InactiveUser,
    #[error("Unable to log in with provided credentials.")]
    InvalidCredentials,
    #[error("token expiry past {now} is not representable")]
    ExpiryOutOfRange { now: chrono::DateTime<chrono::Utc> },
    #[error(transparent)]
    Ordering(#[from] OrderingError),
}

impl From<ValidationError> for AuthError {
    fn from(errors: ValidationError) -> Self {
        AuthError::Ordering(OrderingError::Validation(errors))
    }
}
