//! End-to-end behavior of the REST API, driven through the router with an
//! in-memory catalog.

mod common {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, HeaderMap, Method, Request, StatusCode};
    use axum::Router;
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;

    use smartserve::api::{router, ApiState};
    use smartserve::config::AppConfig;
    use smartserve::ordering::{MemoryStore, NewUser, OrderingService, User};

    pub(super) const HOST: &str = "testserver";
    pub(super) const PASSWORD: &str = "tangerine-Orbit-57";

    pub(super) fn config(overrides: &[(&str, &str)]) -> AppConfig {
        let mut vars: HashMap<String, String> = [
            ("SECRET_KEY", "integration-secret"),
            ("PRODUCTION", "False"),
            ("DEBUG", "False"),
            ("ALLOWED_HOSTS", HOST),
            ("PASSWORD_HASH_ITERATIONS", "1"),
            ("API_RESPONSE_PAGINATION_SIZE", "2"),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
        for (name, value) in overrides {
            vars.insert(name.to_string(), value.to_string());
        }
        AppConfig::from_lookup(|name| vars.get(name).cloned()).expect("config loads")
    }

    pub(super) struct Harness {
        pub(super) router: Router,
        pub(super) state: ApiState<MemoryStore>,
    }

    pub(super) fn harness(overrides: &[(&str, &str)]) -> Harness {
        let ordering = Arc::new(OrderingService::open(Arc::new(MemoryStore)).expect("opens"));
        let state = ApiState::new(ordering, config(overrides));
        Harness {
            router: router(state.clone()),
            state,
        }
    }

    impl Harness {
        pub(super) fn account(
            &self,
            employee_id: &str,
            first_name: &str,
            last_name: &str,
            is_staff: bool,
        ) -> User {
            self.state
                .auth
                .register(
                    NewUser {
                        employee_id: Some(employee_id.to_string()),
                        first_name: first_name.to_string(),
                        last_name: last_name.to_string(),
                        password: Some(PASSWORD.to_string()),
                        is_staff,
                        ..NewUser::default()
                    },
                    Utc::now(),
                )
                .expect("account registers")
        }

        pub(super) async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, HeaderMap, Value) {
            let mut request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::HOST, HOST);
            if let Some(token) = token {
                request = request.header(header::AUTHORIZATION, format!("Token {token}"));
            }
            let body = match body {
                Some(body) => {
                    request = request.header(header::CONTENT_TYPE, "application/json");
                    Body::from(body.to_string())
                }
                None => Body::empty(),
            };
            let response = self
                .router
                .clone()
                .oneshot(request.body(body).expect("request builds"))
                .await
                .expect("router responds");

            let status = response.status();
            let headers = response.headers().clone();
            let bytes = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body reads");
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("json body")
            };
            (status, headers, json)
        }

        pub(super) async fn login(&self, employee_id: &str) -> String {
            let (status, _, body) = self
                .send(
                    Method::POST,
                    "/api/auth/login/",
                    None,
                    Some(serde_json::json!({ "employee_id": employee_id, "password": PASSWORD })),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "login failed: {body}");
            body["token"].as_str().expect("token issued").to_string()
        }
    }
}

use axum::http::{header, Method, StatusCode};
use serde_json::json;

use common::*;

#[tokio::test]
async fn login_issues_a_token_for_the_current_user() {
    let app = harness(&[]);
    app.account("482913", "Ada", "Lovelace", true);

    let token = app.login("482913").await;
    assert_eq!(token.len(), 64);

    let (status, _, body) = app.send(Method::GET, "/api/users/me/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employee_id"], "482913");
    assert_eq!(body["full_name"], "Ada Lovelace");
    assert!(body["last_login"].is_string());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_missing_fields() {
    let app = harness(&[]);
    app.account("482913", "Ada", "Lovelace", true);

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/auth/login/",
            None,
            Some(json!({ "employee_id": "482913", "password": "wrong-password-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "non_field_errors": ["Unable to log in with provided credentials."] })
    );

    let (status, _, body) = app
        .send(Method::POST, "/api/auth/login/", None, Some(json!({ "username": "482913" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "password": ["This field is required."] }));
}

#[tokio::test]
async fn resources_require_a_token() {
    let app = harness(&[]);

    let (status, headers, body) = app.send(Method::GET, "/api/restaurants/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Authentication credentials were not provided.");
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).expect("challenge"), "Token");

    let (status, _, body) = app
        .send(Method::GET, "/api/restaurants/", Some("not-a-real-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid token.");
}

#[tokio::test]
async fn logout_revokes_only_the_presented_token() {
    let app = harness(&[]);
    app.account("482913", "Ada", "Lovelace", true);
    let first = app.login("482913").await;
    let second = app.login("482913").await;

    let (status, _, _) = app.send(Method::POST, "/api/auth/logout/", Some(&first), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = app.send(Method::GET, "/api/users/me/", Some(&first), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = app.send(Method::GET, "/api/users/me/", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = app
        .send(Method::POST, "/api/auth/logoutall/", Some(&second), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = app.send(Method::GET, "/api/users/me/", Some(&second), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn staff_only_routes_forbid_other_users() {
    let app = harness(&[]);
    app.account("520114", "Grace", "Hopper", false);
    let token = app.login("520114").await;

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/restaurants/",
            Some(&token),
            Some(json!({ "name": "The Olive Tree" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "You do not have permission to perform this action.");

    let (status, _, _) = app.send(Method::GET, "/api/users/", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = app.send(Method::GET, "/api/restaurants/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn new_users_get_every_password_failure_reported() {
    let app = harness(&[]);
    app.account("482913", "Ada", "Lovelace", true);
    let token = app.login("482913").await;

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/users/",
            Some(&token),
            Some(json!({
                "employee_id": "730021",
                "first_name": "Alan",
                "last_name": "Turing",
                "password": "1111"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["password"],
        json!([
            "This password is too short. It must contain at least 8 characters.",
            "This password is too common.",
            "This password is entirely numeric."
        ])
    );

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/users/",
            Some(&token),
            Some(json!({
                "employee_id": "730021",
                "first_name": "Alan",
                "last_name": "Turing",
                "password": PASSWORD
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["employee_id"], "730021");
    assert_eq!(body["is_staff"], false);
}

#[tokio::test]
async fn staff_build_a_floor_and_book_a_table() {
    let app = harness(&[]);
    app.account("482913", "Ada", "Lovelace", true);
    let token = app.login("482913").await;

    let (status, _, restaurant) = app
        .send(
            Method::POST,
            "/api/restaurants/",
            Some(&token),
            Some(json!({ "name": "The Olive Tree" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let restaurant_id = restaurant["id"].as_u64().expect("restaurant id");

    let (status, _, table) = app
        .send(
            Method::POST,
            "/api/tables/",
            Some(&token),
            Some(json!({ "number": 1, "restaurant": restaurant_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let table_id = table["id"].as_u64().expect("table id");

    let (status, _, sub_table) = app
        .send(
            Method::POST,
            "/api/tables/",
            Some(&token),
            Some(json!({ "number": 2, "restaurant": restaurant_id, "container_table": table_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sub_table["true_number"], 1);
    let sub_table_id = sub_table["id"].as_u64().expect("sub table id");

    for (table, location_index) in [(table_id, 1), (table_id, 2), (sub_table_id, 1)] {
        let (status, _, _) = app
            .send(
                Method::POST,
                "/api/seats/",
                Some(&token),
                Some(json!({ "table": table, "location_index": location_index })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/seats/",
            Some(&token),
            Some(json!({ "table": table_id, "location_index": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["non_field_errors"],
        json!(["Seat with this Table and Location Index already exists."])
    );

    let (_, _, table) = app
        .send(Method::GET, &format!("/api/tables/{table_id}/"), Some(&token), None)
        .await;
    assert_eq!(table["seats"].as_array().map(Vec::len), Some(3));
    assert_eq!(table["sub_tables"], json!([sub_table_id]));

    let window = json!({ "start": "2026-03-14T18:00:00Z", "end": "2026-03-14T20:00:00Z" });
    let (status, _, booking) = app
        .send(
            Method::POST,
            &format!("/api/tables/{table_id}/bookings/"),
            Some(&token),
            Some(window.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["seat_bookings"].as_array().map(Vec::len), Some(3));
    assert_eq!(booking["restaurant"], restaurant_id);

    let (status, _, body) = app
        .send(
            Method::POST,
            &format!("/api/tables/{table_id}/bookings/"),
            Some(&token),
            Some(window),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["seat"],
        json!(["A booking for this seat's table already exists within these start & end points."])
    );

    let (status, _, _) = app
        .send(Method::DELETE, &format!("/api/tables/{table_id}/"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn orders_are_limited_to_the_booking_restaurant_menu() {
    let app = harness(&[]);
    app.account("482913", "Ada", "Lovelace", true);
    let token = app.login("482913").await;

    let mut restaurant_ids = Vec::new();
    for name in ["The Olive Tree", "Blue Door"] {
        let (_, _, restaurant) = app
            .send(Method::POST, "/api/restaurants/", Some(&token), Some(json!({ "name": name })))
            .await;
        restaurant_ids.push(restaurant["id"].as_u64().expect("restaurant id"));
    }
    let (_, _, table) = app
        .send(
            Method::POST,
            "/api/tables/",
            Some(&token),
            Some(json!({ "number": 1, "restaurant": restaurant_ids[0] })),
        )
        .await;
    let table_id = table["id"].as_u64().expect("table id");
    app.send(
        Method::POST,
        "/api/seats/",
        Some(&token),
        Some(json!({ "table": table_id, "location_index": 1 })),
    )
    .await;
    let (_, _, booking) = app
        .send(
            Method::POST,
            &format!("/api/tables/{table_id}/bookings/"),
            Some(&token),
            Some(json!({ "start": "2026-03-14T12:00:00Z", "end": "2026-03-14T13:30:00Z" })),
        )
        .await;
    let seat_booking = booking["seat_bookings"][0].as_u64().expect("seat booking");

    let (status, _, here) = app
        .send(
            Method::POST,
            "/api/menu-items/",
            Some(&token),
            Some(json!({ "name": "Garlic Bread", "available_at": [restaurant_ids[0]] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, _, elsewhere) = app
        .send(
            Method::POST,
            "/api/menu-items/",
            Some(&token),
            Some(json!({ "name": "Lemon Tart", "available_at": [restaurant_ids[1]] })),
        )
        .await;

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/orders/",
            Some(&token),
            Some(json!({ "menu_item": elsewhere["id"], "seat_booking": seat_booking, "course": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["menu_item"],
        json!(["Only menu items at this booking's restaurant can be ordered."])
    );

    let (status, _, order) = app
        .send(
            Method::POST,
            "/api/orders/",
            Some(&token),
            Some(json!({ "menu_item": here["id"], "seat_booking": seat_booking, "course": 1, "notes": "No onions." })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["course"], 1);

    let (status, _, _) = app
        .send(
            Method::DELETE,
            &format!("/api/menu-items/{}/", here["id"]),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, _, listed) = app
        .send(
            Method::GET,
            &format!("/api/orders/?booking={}", booking["id"]),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(listed["count"], 1);
}

#[tokio::test]
async fn unknown_references_in_bodies_are_field_errors() {
    let app = harness(&[]);
    app.account("482913", "Ada", "Lovelace", true);
    let token = app.login("482913").await;

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/tables/",
            Some(&token),
            Some(json!({ "number": 1, "restaurant": 99 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["restaurant"],
        json!(["Invalid pk \"99\" - object does not exist."])
    );

    let (status, _, body) = app
        .send(Method::GET, "/api/bookings/42/", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Not found.");
}

#[tokio::test]
async fn lists_are_paginated() {
    let app = harness(&[]);
    app.account("482913", "Ada", "Lovelace", true);
    let token = app.login("482913").await;
    for name in ["The Olive Tree", "Blue Door", "Luigi's Kitchen"] {
        app.send(Method::POST, "/api/restaurants/", Some(&token), Some(json!({ "name": name })))
            .await;
    }

    let (status, _, page) = app.send(Method::GET, "/api/restaurants/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"].as_array().map(Vec::len), Some(2));
    assert_eq!(page["next"], "/api/restaurants/?page=2");
    assert!(page["previous"].is_null());

    let (_, _, page) = app
        .send(Method::GET, "/api/restaurants/?page=2", Some(&token), None)
        .await;
    assert_eq!(page["results"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["previous"], "/api/restaurants/");

    let (status, _, body) = app
        .send(Method::GET, "/api/restaurants/?page=3", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Invalid page.");
}

#[tokio::test]
async fn namesakes_are_not_added_as_employees() {
    let app = harness(&[]);
    app.account("482913", "Ada", "Lovelace", true);
    let first = app.account("520114", "Grace", "Hopper", false);
    let namesake = app.account("640223", "Grace", "Hopper", false);
    let token = app.login("482913").await;

    let (_, _, restaurant) = app
        .send(
            Method::POST,
            "/api/restaurants/",
            Some(&token),
            Some(json!({ "name": "Blue Door" })),
        )
        .await;
    let (status, _, body) = app
        .send(
            Method::POST,
            &format!("/api/restaurants/{}/employees/", restaurant["id"]),
            Some(&token),
            Some(json!({ "employees": [first.id, namesake.id] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], json!([first.id]));
    assert_eq!(body["rejected"], json!([namesake.id]));
}
