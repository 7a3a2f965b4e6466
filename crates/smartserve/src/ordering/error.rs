use super::repository::StoreError;
use super::validation::ValidationError;

/// Failure of a catalog query or mutation.
#[derive(Debug, thiserror::Error)]
pub enum OrderingError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("cannot delete {entity} {id}: {reason}")]
    Protected {
        entity: &'static str,
        id: u64,
        reason: String,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrderingError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub(crate) fn protected(entity: &'static str, id: impl Into<u64>, reason: impl Into<String>) -> Self {
        Self::Protected {
            entity,
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
