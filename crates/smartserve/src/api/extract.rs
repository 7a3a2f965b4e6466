use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use chrono::Utc;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::state::ApiState;
use crate::auth::{AuthError, Authenticated};
use crate::ordering::CatalogStore;

/// The caller behind a valid `Authorization: Token ...` header.
#[derive(Debug, Clone)]
pub struct Session(pub Authenticated);

impl Session {
    pub fn require_staff(&self) -> Result<(), ApiError> {
        if self.0.user.is_staff {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<ApiState<S>> for Session
where
    S: CatalogStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState<S>,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            None => None,
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| {
                        AuthError::MalformedHeader(
                            "Invalid token header. Token string should not contain invalid characters.",
                        )
                    })?
                    .to_owned(),
            ),
        };
        let session = state
            .blocking(move |state| state.auth.authenticate(header.as_deref(), Utc::now()))
            .await?;
        Ok(Session(session))
    }
}

/// JSON request body whose rejections are reported as 400 `detail` bodies.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// Query string filters, rejected the same way as bodies.
#[derive(Debug)]
pub struct Params<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Params<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Params(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}
