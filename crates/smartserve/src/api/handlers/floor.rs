use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{check_pk, created, Created};
use crate::api::error::ApiError;
use crate::api::extract::{Params, Payload, Session};
use crate::api::pagination::{paginate, Paginated};
use crate::api::state::ApiState;
use crate::api::views::{BookingView, SeatView, TableView};
use crate::ordering::{
    CatalogStore, NewSeat, NewTable, SeatFilter, SeatId, TableFilter, TableId, ValidationError,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContainerChange {
    pub container_table: Option<TableId>,
}

/// Start and end of a booking window.
#[derive(Debug, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub async fn list_tables<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    uri: Uri,
    Params(filter): Params<TableFilter>,
) -> Result<Json<Paginated<TableView>>, ApiError>
where
    S: CatalogStore + 'static,
{
    let tables: Vec<TableView> = state.ordering.read(|catalog| {
        catalog
            .list_tables(&filter)
            .into_iter()
            .map(|table| TableView::build(catalog, table))
            .collect()
    });
    Ok(Json(paginate(tables, state.config.pagination_size, &uri)?))
}

pub async fn create_table<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Payload(new): Payload<NewTable>,
) -> Result<Created<TableView>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    state.ordering.read(|catalog| {
        let mut errors = ValidationError::default();
        check_pk(
            &mut errors,
            "restaurant",
            catalog.restaurant(new.restaurant).is_ok(),
            new.restaurant,
        );
        if let Some(container) = new.container_table {
            check_pk(
                &mut errors,
                "container_table",
                catalog.table(container).is_ok(),
                container,
            );
        }
        errors.into_result()
    })?;

    let table = state
        .blocking(move |state| state.ordering.create_table(new))
        .await?;
    let view = state.ordering.read(|catalog| TableView::build(catalog, &table));
    Ok(created(view))
}

pub async fn retrieve_table<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
) -> Result<Json<TableView>, ApiError>
where
    S: CatalogStore + 'static,
{
    let view = state.ordering.read(|catalog| {
        catalog
            .table(TableId(id))
            .map(|table| TableView::build(catalog, table))
    })?;
    Ok(Json(view))
}

/// Moves a table under a container table, or back to the top level.
pub async fn move_table<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(id): Path<u64>,
    Payload(change): Payload<ContainerChange>,
) -> Result<Json<TableView>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    let id = TableId(id);
    state.ordering.read(|catalog| -> Result<(), ApiError> {
        catalog.table(id)?;
        let mut errors = ValidationError::default();
        if let Some(container) = change.container_table {
            check_pk(
                &mut errors,
                "container_table",
                catalog.table(container).is_ok(),
                container,
            );
        }
        errors.into_result().map_err(ApiError::from)
    })?;

    let table = state
        .blocking(move |state| state.ordering.set_container_table(id, change.container_table))
        .await?;
    let view = state.ordering.read(|catalog| TableView::build(catalog, &table));
    Ok(Json(view))
}

pub async fn destroy_table<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    state
        .blocking(move |state| state.ordering.delete_table(TableId(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Books every seat of the table, sub tables included, for one window.
pub async fn book_table<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
    Payload(window): Payload<Window>,
) -> Result<Created<BookingView>, ApiError>
where
    S: CatalogStore + 'static,
{
    let booking = state
        .blocking(move |state| {
            state
                .ordering
                .book_table(TableId(id), window.start, window.end)
        })
        .await?;
    let view = state
        .ordering
        .read(|catalog| BookingView::build(catalog, &booking));
    Ok(created(view))
}

pub async fn list_seats<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    uri: Uri,
    Params(filter): Params<SeatFilter>,
) -> Result<Json<Paginated<SeatView>>, ApiError>
where
    S: CatalogStore + 'static,
{
    let seats: Vec<SeatView> = state.ordering.read(|catalog| {
        catalog
            .list_seats(&filter)
            .into_iter()
            .map(|seat| SeatView::build(catalog, seat))
            .collect()
    });
    Ok(Json(paginate(seats, state.config.pagination_size, &uri)?))
}

pub async fn create_seat<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Payload(new): Payload<NewSeat>,
) -> Result<Created<SeatView>, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    state.ordering.read(|catalog| {
        let mut errors = ValidationError::default();
        check_pk(&mut errors, "table", catalog.table(new.table).is_ok(), new.table);
        errors.into_result()
    })?;

    let seat = state
        .blocking(move |state| state.ordering.create_seat(new))
        .await?;
    let view = state.ordering.read(|catalog| SeatView::build(catalog, &seat));
    Ok(created(view))
}

pub async fn retrieve_seat<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
) -> Result<Json<SeatView>, ApiError>
where
    S: CatalogStore + 'static,
{
    let view = state.ordering.read(|catalog| {
        catalog
            .seat(SeatId(id))
            .map(|seat| SeatView::build(catalog, seat))
    })?;
    Ok(Json(view))
}

pub async fn destroy_seat<S>(
    State(state): State<ApiState<S>>,
    session: Session,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError>
where
    S: CatalogStore + 'static,
{
    session.require_staff()?;
    state
        .blocking(move |state| state.ordering.delete_seat(SeatId(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
