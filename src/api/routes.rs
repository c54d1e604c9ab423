//! HTTP API route definitions.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::handlers::{api_info, health, index, not_found, receive_data, AppState};
use super::middleware::{
    cors_layer, handle_panic, parse_body, preflight_no_content, security_headers,
};

/// Create the API router with the full middleware stack.
pub fn create_router(state: AppState) -> Router {
    with_middleware(routes(state))
}

/// Wrap any router in the middleware every request passes through.
pub fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(parse_body))
        .layer(cors_layer())
        .layer(middleware::from_fn(preflight_no_content))
        .layer(middleware::map_response(security_headers))
        .layer(TraceLayer::new_for_http())
}

/// Route table without middleware.
///
/// Known paths with an unexpected method fall through to `not_found`
/// instead of answering 405.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).fallback(not_found))
        .route("/health", get(health).fallback(not_found))
        .route("/api", get(api_info).fallback(not_found))
        .route("/api/data", post(receive_data).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = create_router(AppState::default());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_path_returns_404() {
        let app = create_router(AppState::default());

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_returns_404_not_405() {
        let app = create_router(AppState::default());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn routes_answer_without_middleware() {
        let app = routes(AppState::default());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/data")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-frame-options").is_none());
    }
}
