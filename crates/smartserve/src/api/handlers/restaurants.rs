use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{check_pk, created, required, Created};
use crate::api::error::ApiError;
use crate::api::extract::{Params, Payload, Session};
use crate::api::pagination::{paginate, Paginated};
use crate::api::state::ApiState;
use crate::api::views::RestaurantView;
use crate::ordering::{
    CatalogStore, NewRestaurant, RestaurantFilter, RestaurantId, UserId, ValidationError,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Rename {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmployeeList {
    pub employees: Vec<UserId>,
}

#[derive(Debug, Serialize)]
pub struct EmployeesAdded {
    pub added: Vec<UserId>,
    pub rejected: Vec<UserId>,
}

pub async fn list<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    uri: Uri,
    Params(filter): Params<RestaurantFilter>,
) -> Result<Json<Paginated<RestaurantView>>, ApiError>
where
    S: CatalogStore + 'static,
{
    let restaurants: Vec<RestaurantView> = state.ordering.read(|catalog| {
        catalog
            .list_restaurants(&filter)
            .into_iter()
            .map(|restaurant| RestaurantView::build(catalog, restaurant))
            .collect()
    });
    Ok(Json(paginate(restaurants, state.config.pagination_size, &uri)?))
}

pub async fn create<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Payload(new): Payload<NewRestaurant>,
) -> Result<Created<RestaurantView>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    let restaurant = state
        .blocking(move |state| state.ordering.create_restaurant(new))
        .await?;
    let view = state
        .ordering
        .read(|catalog| RestaurantView::build(catalog, &restaurant));
    Ok(created(view))
}

pub async fn retrieve<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
) -> Result<Json<RestaurantView>, ApiError>
where
    S: CatalogStore + 'static,
{
    let view = state.ordering.read(|catalog| {
        catalog
            .restaurant(RestaurantId(id))
            .map(|restaurant| RestaurantView::build(catalog, restaurant))
    })?;
    Ok(Json(view))
}

pub async fn rename<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(id): Path<u64>,
    Payload(request): Payload<Rename>,
) -> Result<Json<RestaurantView>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    let mut errors = ValidationError::default();
    let name = required(&mut errors, "name", request.name);
    errors.into_result()?;

    let restaurant = state
        .blocking(move |state| state.ordering.rename_restaurant(RestaurantId(id), name))
        .await?;
    let view = state
        .ordering
        .read(|catalog| RestaurantView::build(catalog, &restaurant));
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
        .blocking(move |state| state.ordering.delete_restaurant(RestaurantId(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adds employees. Namesakes of existing staff come back as rejected.
pub async fn add_employees<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(id): Path<u64>,
    Payload(request): Payload<EmployeeList>,
) -> Result<Json<EmployeesAdded>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    let id = RestaurantId(id);
    state.ordering.read(|catalog| -> Result<(), ApiError> {
        catalog.restaurant(id)?;
        let mut errors = ValidationError::default();
        for user in &request.employees {
            check_pk(&mut errors, "employees", catalog.user(*user).is_ok(), user);
        }
        errors.into_result().map_err(ApiError::from)
    })?;

    let outcome = state
        .blocking(move |state| state.ordering.add_employees(id, &request.employees))
        .await?;
    Ok(Json(EmployeesAdded {
        added: outcome.assigned,
        rejected: outcome.rejected,
    }))
}

pub async fn remove_employee<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path((id, user)): Path<(u64, u64)>,
) -> Result<StatusCode, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    let removed = state
        .blocking(move |state| {
            state
                .ordering
                .remove_employee(RestaurantId(id), UserId(user))
        })
        .await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
