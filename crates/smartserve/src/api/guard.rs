//! Request screening applied to every API route: host allow-listing, origin
//! checks for unsafe requests, CORS echoing and protective response headers.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use super::error::ErrorDetail;
use crate::config::AppConfig;

const DEBUG_HOSTS: &[&str] = &[".localhost", "127.0.0.1", "[::1]"];
const PREFLIGHT_METHODS: &str = "DELETE, GET, OPTIONS, PATCH, POST, PUT";
const PREFLIGHT_HEADERS: &str = "authorization, content-type";
const PREFLIGHT_MAX_AGE: &str = "86400";

pub async fn guard(
    State(config): State<Arc<AppConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let allowed_origin = origin
        .as_deref()
        .filter(|origin| origin_allowed(origin, &config.allowed_origins));

    let mut response = match screen(&config, &request, origin.as_deref()) {
        Some(rejection) => rejection,
        None if is_preflight(&request) && allowed_origin.is_some() => preflight(),
        None => next.run(request).await,
    };

    if let Some(origin) = allowed_origin {
        if let Ok(value) = HeaderValue::from_str(origin) {
            let headers = response.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
            headers.append(header::VARY, HeaderValue::from_static("origin"));
        }
    }
    if config.debug {
        expose_error_detail(&mut response);
    }
    let headers = response.headers_mut();
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

fn screen(config: &AppConfig, request: &Request, origin: Option<&str>) -> Option<Response> {
    let host = request_host(request.headers(), request.uri().authority().map(|a| a.as_str()));
    if !host_allowed(&host, &config.allowed_hosts, config.debug) {
        warn!(%host, "request rejected: host not allowed");
        let message = format!(
            "Invalid HTTP_HOST header: '{host}'. You may need to add '{}' to ALLOWED_HOSTS.",
            domain(&host)
        );
        return Some((StatusCode::BAD_REQUEST, Json(json!({ "detail": message }))).into_response());
    }

    if config.environment.is_production() && !request.method().is_safe() {
        if let Some(origin) = origin {
            if !origin_allowed(origin, &config.allowed_origins) {
                warn!(%origin, "request rejected: untrusted origin");
                let message = format!(
                    "CSRF Failed: Origin checking failed - {origin} does not match any trusted origins."
                );
                return Some(
                    (StatusCode::FORBIDDEN, Json(json!({ "detail": message }))).into_response(),
                );
            }
        }
    }
    None
}

fn request_host(headers: &HeaderMap, authority: Option<&str>) -> String {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or(authority)
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Host without its port, and without a trailing dot.
fn domain(host: &str) -> &str {
    let bare = if host.starts_with('[') {
        host.find(']').map_or(host, |end| &host[..=end])
    } else {
        host.rsplit_once(':').map_or(host, |(name, _)| name)
    };
    bare.strip_suffix('.').unwrap_or(bare)
}

/// `*` matches anything, `.example.com` matches the domain and its
/// subdomains, anything else must match exactly.
pub fn host_allowed(host: &str, allowed: &[String], debug: bool) -> bool {
    let domain = domain(host);
    if domain.is_empty() {
        return false;
    }
    let patterns: Vec<&str> = if allowed.is_empty() && debug {
        DEBUG_HOSTS.to_vec()
    } else {
        allowed.iter().map(String::as_str).collect()
    };
    patterns.into_iter().any(|pattern| {
        let pattern = pattern.to_ascii_lowercase();
        pattern == "*"
            || match pattern.strip_prefix('.') {
                Some(parent) => domain == parent || domain.ends_with(&pattern),
                None => domain == pattern,
            }
    })
}

pub fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    allowed
        .iter()
        .any(|candidate| candidate.trim_end_matches('/').eq_ignore_ascii_case(origin))
}

fn is_preflight(request: &Request) -> bool {
    request.method() == Method::OPTIONS
        && request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, PREFLIGHT_METHODS),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, PREFLIGHT_HEADERS),
            (header::ACCESS_CONTROL_MAX_AGE, PREFLIGHT_MAX_AGE),
        ],
    )
        .into_response()
}

fn expose_error_detail(response: &mut Response) {
    let Some(ErrorDetail(detail)) = response.extensions_mut().remove::<ErrorDetail>() else {
        return;
    };
    let body = json!({ "detail": "A server error occurred.", "error": detail });
    response.headers_mut().remove(header::CONTENT_LENGTH);
    *response.body_mut() = Body::from(body.to_string());
}
