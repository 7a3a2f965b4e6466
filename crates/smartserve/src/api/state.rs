use std::sync::Arc;

use super::error::ApiError;
use crate::auth::Authenticator;
use crate::config::AppConfig;
use crate::ordering::{CatalogStore, OrderingService};

/// Shared handles every request handler works with.
pub struct ApiState<S> {
    pub ordering: Arc<OrderingService<S>>,
    pub auth: Arc<Authenticator<S>>,
    pub config: Arc<AppConfig>,
}

impl<S> ApiState<S>
where
    S: CatalogStore + 'static,
{
    pub fn new(ordering: Arc<OrderingService<S>>, config: AppConfig) -> Self {
        let auth = Arc::new(Authenticator::new(ordering.clone(), &config));
        Self {
            ordering,
            auth,
            config: Arc::new(config),
        }
    }

    /// Runs service work on tokio's blocking pool. Password hashing and
    /// catalog writes go through here so they never stall the async workers.
    pub async fn blocking<T, E>(
        &self,
        work: impl FnOnce(&Self) -> Result<T, E> + Send + 'static,
    ) -> Result<T, ApiError>
    where
        T: Send + 'static,
        E: Send + 'static,
        ApiError: From<E>,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || work(&state))
            .await
            .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
            .map_err(ApiError::from)
    }
}

impl<S> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            ordering: Arc::clone(&self.ordering),
            auth: Arc::clone(&self.auth),
            config: Arc::clone(&self.config),
        }
    }
}
