use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use serde::Deserialize;

use super::floor::Window;
use super::{check_pk, created, Created};
use crate::api::error::ApiError;
use crate::api::extract::{Params, Payload, Session};
use crate::api::pagination::{paginate, Paginated};
use crate::api::state::ApiState;
use crate::api::views::{BookingView, SeatBookingView};
use crate::ordering::{
    BookingFilter, BookingId, CatalogStore, SeatBookingFilter, SeatBookingId, SeatId,
    ValidationError,
};

#[derive(Debug, Deserialize)]
pub struct SeatRequest {
    pub seat: SeatId,
}

pub async fn list<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    uri: Uri,
    Params(filter): Params<BookingFilter>,
) -> Result<Json<Paginated<BookingView>>, ApiError>
where
    S: CatalogStore + 'static,
{
    let bookings: Vec<BookingView> = state.ordering.read(|catalog| {
        catalog
            .list_bookings(&filter)
            .into_iter()
            .map(|booking| BookingView::build(catalog, booking))
            .collect()
    });
    Ok(Json(paginate(bookings, state.config.pagination_size, &uri)?))
}

/// Creates a booking without seats; seats are attached afterwards.
pub async fn create<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Payload(window): Payload<Window>,
) -> Result<Created<BookingView>, ApiError>
where
    S: CatalogStore + 'static,
{
    let booking = state
        .blocking(move |state| state.ordering.create_booking(window.start, window.end))
        .await?;
    let view = state
        .ordering
        .read(|catalog| BookingView::build(catalog, &booking));
    Ok(created(view))
}

pub async fn retrieve<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
) -> Result<Json<BookingView>, ApiError>
where
    S: CatalogStore + 'static,
{
    let view = state.ordering.read(|catalog| {
        catalog
            .booking(BookingId(id))
            .map(|booking| BookingView::build(catalog, booking))
    })?;
    Ok(Json(view))
}

pub async fn reschedule<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
    Payload(window): Payload<Window>,
) -> Result<Json<BookingView>, ApiError>
where
    S: CatalogStore + 'static,
{
    let booking = state
        .blocking(move |state| {
            state
                .ordering
                .reschedule_booking(BookingId(id), window.start, window.end)
        })
        .await?;
    let view = state
        .ordering
        .read(|catalog| BookingView::build(catalog, &booking));
    Ok(Json(view))
}

pub async fn destroy<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError>
where
    S: CatalogStore + 'static,
{
    state
        .blocking(move |state| state.ordering.delete_booking(BookingId(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_seat<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
    Payload(request): Payload<SeatRequest>,
) -> Result<Created<SeatBookingView>, ApiError>
where
    S: CatalogStore + 'static,
{
    let id = BookingId(id);
    state.ordering.read(|catalog| -> Result<(), ApiError> {
        catalog.booking(id)?;
        let mut errors = ValidationError::default();
        check_pk(&mut errors, "seat", catalog.seat(request.seat).is_ok(), request.seat);
        errors.into_result().map_err(ApiError::from)
    })?;

    let seat_booking = state
        .blocking(move |state| state.ordering.add_seat_booking(id, request.seat))
        .await?;
    let view = state
        .ordering
        .read(|catalog| SeatBookingView::build(catalog, &seat_booking));
    Ok(created(view))
}

pub async fn list_seat_bookings<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    uri: Uri,
    Params(filter): Params<SeatBookingFilter>,
) -> Result<Json<Paginated<SeatBookingView>>, ApiError>
where
    S: CatalogStore + 'static,
{
    let seat_bookings: Vec<SeatBookingView> = state.ordering.read(|catalog| {
        catalog
            .list_seat_bookings(&filter)
            .into_iter()
            .map(|seat_booking| SeatBookingView::build(catalog, seat_booking))
            .collect()
    });
    Ok(Json(paginate(
        seat_bookings,
        state.config.pagination_size,
        &uri,
    )?))
}

pub async fn destroy_seat_booking<S>(
    State(state): State<ApiState<S>>,
    _session: Session,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError>
where
    S: CatalogStore + 'static,
{
    state
        .blocking(move |state| state.ordering.delete_seat_booking(SeatBookingId(id)))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
