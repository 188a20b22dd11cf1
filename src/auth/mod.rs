//! PSK-based authentication for mutating routes.
//!
//! Reads stay public because the marketing site renders from them.
//! Uses constant-time comparison to mitigate timing attacks.

use axum::{
    extract::Request,
    http::{header, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// PSK authentication layer function that takes the expected PSK as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // No PSK configured means dev mode
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    if is_read_only(request.method()) {
        return next.run(request).await;
    }

    match provided_key(&request) {
        Some(key) if constant_time_compare(&key, &expected) => next.run(request).await,
        Some(_) => unauthorized_response("Invalid API key"),
        None => unauthorized_response("Missing API key"),
    }
}

fn is_read_only(method: &Method) -> bool {
    [Method::GET, Method::HEAD, Method::OPTIONS].contains(method)
}

/// API key from `x-api-key`, falling back to a bearer token.
fn provided_key(request: &Request) -> Option<String> {
    let headers = request.headers();
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
        .map(|s| s.to_string())
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    tracing::warn!("Rejected write request: {}", message);
    AppError::Unauthorized(message.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_read_only_methods() {
        assert!(is_read_only(&Method::GET));
        assert!(is_read_only(&Method::HEAD));
        assert!(!is_read_only(&Method::POST));
        assert!(!is_read_only(&Method::PUT));
        assert!(!is_read_only(&Method::DELETE));
    }

    #[test]
    fn test_bearer_token_fallback() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(provided_key(&request).as_deref(), Some("abc"));

        let request = Request::builder()
            .header(API_KEY_HEADER, "direct")
            .header(header::AUTHORIZATION, "Bearer abc")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(provided_key(&request).as_deref(), Some("direct"));
    }
}
