//! Cross-cutting middleware applied to every request.
//!
//! Order, outermost first: security headers, preflight status, CORS, body
//! decoding, panic capture. See [`crate::api::create_router`].

use std::any::Any;

use axum::{
    body::Body,
    extract::Request,
    http::{
        header::{self, HeaderName},
        HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{self, CorsLayer};
use tracing::debug;

use crate::body::{ContentType, ParsedBody, BODY_LIMIT};
use crate::error::{AppError, BodyError, Result};

/// Hardening headers added to every response.
pub const SECURITY_HEADERS: [(&str, &str); 12] = [
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains",
    ),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Add [`SECURITY_HEADERS`], replacing any value set further in.
pub async fn security_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    response
}

/// Allow any origin; preflight requests are answered by the layer itself.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(cors::Any)
}

/// Answer CORS preflights with 204 No Content instead of 200.
pub async fn preflight_no_content(request: Request, next: Next) -> Response {
    let preflight = request.method() == Method::OPTIONS
        && request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    let mut response = next.run(request).await;
    if preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// Decode JSON and form bodies into a [`ParsedBody`] extension.
///
/// Other content types get an empty object and keep their body untouched.
/// Failures short-circuit into the central error response.
pub async fn parse_body(request: Request, next: Next) -> Result<Response> {
    let Some(content_type) = ContentType::from_headers(request.headers()) else {
        let mut request = request;
        request.extensions_mut().insert(ParsedBody::empty());
        return Ok(next.run(request).await);
    };

    let (mut parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, BODY_LIMIT)
        .await
        .map_err(BodyError::from)?;
    let value = content_type.decode(&bytes)?;
    debug!(kind = ?content_type.kind, len = bytes.len(), "Decoded request body");

    parts.extensions.insert(ParsedBody(value));
    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Turn a handler panic into the generic 500 response.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Unhandled(detail).into_response()
}
