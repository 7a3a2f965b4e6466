use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{check_pk, created, required, Created};
use crate::api::error::ApiError;
use crate::api::extract::{Params, Payload, Session};
use crate::api::pagination::{paginate, Paginated};
use crate::api::state::ApiState;
use crate::api::views::UserView;
use crate::ordering::{
    CatalogStore, NewUser, RestaurantId, UserChanges, UserFilter, UserId, ValidationError,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordChange {
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RestaurantAssignment {
    pub restaurants: Vec<RestaurantId>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentView {
    pub assigned: Vec<RestaurantId>,
    pub rejected: Vec<RestaurantId>,
}

pub async fn me<S>(
    State(state): State<ApiState<S>>,
    Session(session): Session,
) -> Result<Json<UserView>, ApiError>
where
    S: CatalogStore + 'static,
{
    let view = state
        .ordering
        .read(|catalog| UserView::build(catalog, &session.user));
    Ok(Json(view))
}

pub async fn change_password<S>(
    State(state): State<ApiState<S>>,
    Session(session): Session,
    Payload(request): Payload<PasswordChange>,
) -> Result<StatusCode, ApiError>
where
    S: CatalogStore + 'static,
{
    let mut errors = ValidationError::default();
    let password = required(&mut errors, "password", request.password);
    errors.into_result()?;

    state
        .blocking(move |state| state.auth.change_password(session.user.id, &password))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    uri: Uri,
    Params(filter): Params<UserFilter>,
) -> Result<Json<Paginated<UserView>>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    let users: Vec<UserView> = state.ordering.read(|catalog| {
        catalog
            .list_users(&filter)
            .into_iter()
            .map(|user| UserView::build(catalog, user))
            .collect()
    });
    Ok(Json(paginate(users, state.config.pagination_size, &uri)?))
}

pub async fn create<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Payload(new): Payload<NewUser>,
) -> Result<Created<UserView>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    let user = state
        .blocking(move |state| state.auth.register(new, Utc::now()))
        .await?;
    let view = state.ordering.read(|catalog| UserView::build(catalog, &user));
    Ok(created(view))
}

pub async fn retrieve<S>(
    State(state): State<ApiState<S>>,
    Session(session): Session,
    Path(id): Path<u64>,
) -> Result<Json<UserView>, ApiError>
where
    S: CatalogStore + 'static,
{
    let id = UserId(id);
    if !session.user.is_staff && session.user.id != id {
        return Err(ApiError::Forbidden);
    }
    let view = state.ordering.read(|catalog| {
        catalog
            .user(id)
            .map(|user| UserView::build(catalog, user))
    })?;
    Ok(Json(view))
}

pub async fn update<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(id): Path<u64>,
    Payload(changes): Payload<UserChanges>,
) -> Result<Json<UserView>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    let user = state
        .blocking(move |state| state.ordering.update_user(UserId(id), changes))
        .await?;
    let view = state.ordering.read(|catalog| UserView::build(catalog, &user));
    Ok(Json(view))
}

pub async fn destroy<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    state
        .blocking(move |state| state.ordering.delete_user(UserId(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replaces the restaurants employing the user.
pub async fn assign_restaurants<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(id): Path<u64>,
    Payload(request): Payload<RestaurantAssignment>,
) -> Result<Json<AssignmentView>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    let id = UserId(id);
    state.ordering.read(|catalog| -> Result<(), ApiError> {
        catalog.user(id)?;
        let mut errors = ValidationError::default();
        for restaurant in &request.restaurants {
            check_pk(
                &mut errors,
                "restaurants",
                catalog.restaurant(*restaurant).is_ok(),
                restaurant,
            );
        }
        errors.into_result().map_err(ApiError::from)
    })?;

    let outcome = state
        .blocking(move |state| state.ordering.set_user_restaurants(id, &request.restaurants))
        .await?;
    Ok(Json(AssignmentView {
        assigned: outcome.assigned,
        rejected: outcome.rejected,
    }))
}
