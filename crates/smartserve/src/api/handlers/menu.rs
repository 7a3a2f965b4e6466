use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use serde::Deserialize;

use super::{check_pk, created, Created};
use crate::api::error::ApiError;
use crate::api::extract::{Params, Payload, Session};
use crate::api::pagination::{paginate, Paginated};
use crate::api::state::ApiState;
use crate::ordering::{
    CatalogStore, MenuItem, MenuItemFilter, MenuItemId, NewMenuItem, NewOrder, Order,
    OrderFilter, OrderId, RestaurantId, ValidationError,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Availability {
    pub available_at: Vec<RestaurantId>,
}

pub async fn list_items<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    uri: Uri,
    Params(filter): Params<MenuItemFilter>,
) -> Result<Json<Paginated<MenuItem>>, ApiError>
where
    S: CatalogStore + 'static,
{
    let items: Vec<MenuItem> = state.ordering.read(|catalog| {
        catalog
            .list_menu_items(&filter)
            .into_iter()
            .cloned()
            .collect()
    });
    Ok(Json(paginate(items, state.config.pagination_size, &uri)?))
}

pub async fn create_item<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Payload(new): Payload<NewMenuItem>,
) -> Result<Created<MenuItem>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    let item = state
        .blocking(move |state| state.ordering.create_menu_item(new))
        .await?;
    Ok(created(item))
}

pub async fn retrieve_item<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
) -> Result<Json<MenuItem>, ApiError>
where
    S: CatalogStore + 'static,
{
    let item = state
        .ordering
        .read(|catalog| catalog.menu_item(MenuItemId(id)).cloned())?;
    Ok(Json(item))
}

pub async fn set_availability<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(id): Path<u64>,
    Payload(request): Payload<Availability>,
) -> Result<Json<MenuItem>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    let item = state
        .blocking(move |state| {
            state
                .ordering
                .set_menu_item_availability(MenuItemId(id), &request.available_at)
        })
        .await?;
    Ok(Json(item))
}

pub async fn destroy_item<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    state
        .blocking(move |state| state.ordering.delete_menu_item(MenuItemId(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_orders<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    uri: Uri,
    Params(filter): Params<OrderFilter>,
) -> Result<Json<Paginated<Order>>, ApiError>
where
    S: CatalogStore + 'static,
{
    let orders: Vec<Order> = state
        .ordering
        .read(|catalog| catalog.list_orders(&filter).into_iter().cloned().collect());
    Ok(Json(paginate(orders, state.config.pagination_size, &uri)?))
}

pub async fn place_order<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Payload(new): Payload<NewOrder>,
) -> Result<Created<Order>, ApiError>
where
    S: CatalogStore + 'static,
{
    state.ordering.read(|catalog| {
        let mut errors = ValidationError::default();
        check_pk(
            &mut errors,
            "menu_item",
            catalog.menu_item(new.menu_item).is_ok(),
            new.menu_item,
        );
        check_pk(
            &mut errors,
            "seat_booking",
            catalog.seat_booking(new.seat_booking).is_ok(),
            new.seat_booking,
        );
        errors.into_result()
    })?;

    let order = state
        .blocking(move |state| state.ordering.place_order(new))
        .await?;
    Ok(created(order))
}

pub async fn retrieve_order<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
) -> Result<Json<Order>, ApiError>
where
    S: CatalogStore + 'static,
{
    let order = state
        .ordering
        .read(|catalog| catalog.order(OrderId(id)).cloned())?;
    Ok(Json(order))
}

pub async fn destroy_order<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError>
where
    S: CatalogStore + 'static,
{
    state
        .blocking(move |state| state.ordering.delete_order(OrderId(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
