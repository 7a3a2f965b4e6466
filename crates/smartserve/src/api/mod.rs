//! JSON REST API over the ordering service, authenticated with tokens.

pub mod error;
pub mod extract;
pub mod guard;
pub mod handlers;
pub mod pagination;
pub mod state;
pub mod views;

pub use error::{ApiError, ErrorDetail};
pub use extract::{Params, Payload, Session};
pub use pagination::{paginate, Paginated};
pub use state::ApiState;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::ordering::CatalogStore;
use handlers::{auth, bookings, floor, menu, restaurants, users};

/// Every API route, behind the request guards.
pub fn router<S>(state: ApiState<S>) -> Router
where
    S: CatalogStore + 'static,
{
    let config = state.config.clone();
    Router::new()
        .route("/api/auth/login/", post(auth::login::<S>))
        .route("/api/auth/logout/", post(auth::logout::<S>))
        .route("/api/auth/logoutall/", post(auth::logout_all::<S>))
        .route("/api/users/", get(users::list::<S>).post(users::create::<S>))
        .route("/api/users/me/", get(users::me::<S>))
        .route("/api/users/me/password/", post(users::change_password::<S>))
        .route(
            "/api/users/:id/",
            get(users::retrieve::<S>)
                .patch(users::update::<S>)
                .delete(users::destroy::<S>),
        )
        .route(
            "/api/users/:id/restaurants/",
            axum::routing::put(users::assign_restaurants::<S>),
        )
        .route(
            "/api/restaurants/",
            get(restaurants::list::<S>).post(restaurants::create::<S>),
        )
        .route(
            "/api/restaurants/:id/",
            get(restaurants::retrieve::<S>)
                .patch(restaurants::rename::<S>)
                .delete(restaurants::destroy::<S>),
        )
        .route(
            "/api/restaurants/:id/employees/",
            post(restaurants::add_employees::<S>),
        )
        .route(
            "/api/restaurants/:id/employees/:user/",
            axum::routing::delete(restaurants::remove_employee::<S>),
        )
        .route(
            "/api/tables/",
            get(floor::list_tables::<S>).post(floor::create_table::<S>),
        )
        .route(
            "/api/tables/:id/",
            get(floor::retrieve_table::<S>)
                .patch(floor::move_table::<S>)
                .delete(floor::destroy_table::<S>),
        )
        .route("/api/tables/:id/bookings/", post(floor::book_table::<S>))
        .route(
            "/api/seats/",
            get(floor::list_seats::<S>).post(floor::create_seat::<S>),
        )
        .route(
            "/api/seats/:id/",
            get(floor::retrieve_seat::<S>).delete(floor::destroy_seat::<S>),
        )
        .route(
            "/api/bookings/",
            get(bookings::list::<S>).post(bookings::create::<S>),
        )
        .route(
            "/api/bookings/:id/",
            get(bookings::retrieve::<S>)
                .patch(bookings::reschedule::<S>)
                .delete(bookings::destroy::<S>),
        )
        .route("/api/bookings/:id/seats/", post(bookings::add_seat::<S>))
        .route(
            "/api/seat-bookings/",
            get(bookings::list_seat_bookings::<S>),
        )
        .route(
            "/api/seat-bookings/:id/",
            axum::routing::delete(bookings::destroy_seat_booking::<S>),
        )
        .route(
            "/api/menu-items/",
            get(menu::list_items::<S>).post(menu::create_item::<S>),
        )
        .route(
            "/api/menu-items/:id/",
            get(menu::retrieve_item::<S>)
                .patch(menu::set_availability::<S>)
                .delete(menu::destroy_item::<S>),
        )
        .route(
            "/api/orders/",
            get(menu::list_orders::<S>).post(menu::place_order::<S>),
        )
        .route(
            "/api/orders/:id/",
            get(menu::retrieve_order::<S>).delete(menu::destroy_order::<S>),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(config, guard::guard))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
