//! HTTP API handlers.

use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::body::ParsedBody;
use crate::config::Config;
use crate::error::ErrorBody;
use crate::utils::now_iso;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "k-le-paas-backend-test";
/// Service version reported by `/health` and `/`.
pub const SERVICE_VERSION: &str = "1.0.0";

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Startup configuration, read-only for the life of the process.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new app state.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Configured listener port.
    pub fn port(&self) -> u16 {
        self.config.listen_port()
    }

    /// Port as `/api` reports it.
    pub fn reported_port(&self) -> ReportedPort {
        match self.config.port_env() {
            Some(raw) => ReportedPort::Env(raw.to_string()),
            None => ReportedPort::Default(self.port()),
        }
    }

    /// Deployment environment name.
    pub fn environment(&self) -> &str {
        &self.config.node_env
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy".
    pub status: &'static str,
    /// ISO-8601 time of the check.
    pub timestamp: String,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Service description returned by `/`.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

/// Paths advertised by `/`.
#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub health: &'static str,
    pub api: &'static str,
}

/// Response of `GET /api`.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub message: &'static str,
    pub data: ApiData,
}

/// Runtime details included in `GET /api`.
#[derive(Debug, Serialize)]
pub struct ApiData {
    pub timestamp: String,
    pub environment: String,
    pub port: ReportedPort,
}

/// `PORT` verbatim as a string when it was set, otherwise the default number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportedPort {
    Env(String),
    Default(u16),
}

/// Response of `POST /api/data`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    pub message: &'static str,
    /// Request body exactly as decoded.
    pub received_data: Value,
    pub processed_at: String,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            timestamp: now_iso(),
            service: SERVICE_NAME,
            version: SERVICE_VERSION,
        }),
    )
}

/// Root handler - static service description.
pub async fn index() -> impl IntoResponse {
    Json(IndexResponse {
        message: "K-Le PaaS Backend Test API",
        version: SERVICE_VERSION,
        endpoints: Endpoints {
            health: "/health",
            api: "/api",
        },
    })
}

/// API info handler - reports environment and port.
pub async fn api_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse {
        message: "API 엔드포인트에 접근했습니다",
        data: ApiData {
            timestamp: now_iso(),
            environment: state.environment().to_string(),
            port: state.reported_port(),
        },
    })
}

/// Echo handler - returns the decoded body unchanged.
pub async fn receive_data(body: Option<Extension<ParsedBody>>) -> impl IntoResponse {
    let received = body.map(|Extension(b)| b).unwrap_or_default();
    tracing::debug!(body = %received.0, "Echoing request body");

    Json(DataResponse {
        message: "데이터를 성공적으로 받았습니다",
        received_data: received.into_inner(),
        processed_at: now_iso(),
    })
}

/// Fallback for unmatched paths and methods.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    let original_url = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());

    (StatusCode::NOT_FOUND, Json(ErrorBody::not_found(original_url)))
}
