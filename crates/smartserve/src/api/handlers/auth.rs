use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::required;
use crate::api::error::ApiError;
use crate::api::extract::{Payload, Session};
use crate::api::state::ApiState;
use crate::api::views::LoginView;
use crate::ordering::{CatalogStore, ValidationError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub employee_id: Option<String>,
    pub password: Option<String>,
}

pub async fn login<S>(
    State(state): State<ApiState<S>>,
    Payload(request): Payload<LoginRequest>,
) -> Result<Json<LoginView>, ApiError>
where
    S: CatalogStore + 'static,
{
    let mut errors = ValidationError::default();
    let employee_id = required(&mut errors, "employee_id", request.employee_id);
    let password = required(&mut errors, "password", request.password);
    errors.into_result()?;

    let issued = state
        .blocking(move |state| state.auth.login(&employee_id, &password, Utc::now()))
        .await?;
    let view = state.ordering.read(|catalog| LoginView::build(catalog, issued));
    Ok(Json(view))
}

pub async fn logout<S>(
    State(state): State<ApiState<S>>,
    Session(session): Session,
) -> Result<StatusCode, ApiError>
where
    S: CatalogStore + 'static,
{
    state
        .blocking(move |state| state.auth.logout(&session))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout_all<S>(
    State(state): State<ApiState<S>>,
    Session(session): Session,
) -> Result<StatusCode, ApiError>
where
    S: CatalogStore + 'static,
{
    state
        .blocking(move |state| state.auth.logout_all(session.user.id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
