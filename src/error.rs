//! Unified error types for the backend test service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::utils::now_iso;

/// Generic message returned for every internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "서버에서 오류가 발생했습니다";

/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body present but not decodable per its content type.
    #[error("malformed body: {0}")]
    MalformedBody(#[from] BodyError),

    /// Any other failure raised while running a route.
    #[error("unhandled handler error: {0}")]
    Unhandled(String),
}

/// Request body decoding errors.
#[derive(Error, Debug)]
pub enum BodyError {
    /// Body could not be read, or exceeded the size limit.
    #[error("failed to read request body: {0}")]
    Read(#[from] axum::Error),

    /// Charset the decoder for this content type does not accept.
    #[error("unsupported charset \"{0}\"")]
    UnsupportedCharset(String),

    /// Body bytes are not valid UTF-8.
    #[error("body is not valid utf-8")]
    InvalidUtf8,

    /// Body bytes are not valid UTF-16.
    #[error("body is not valid utf-16")]
    InvalidUtf16,

    /// JSON body does not start with an object or array.
    #[error("json body must be an object or array")]
    NotAContainer,

    /// JSON syntax error.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// Form body has more parameters than allowed.
    #[error("too many parameters: limit is {limit}")]
    TooManyParameters {
        /// Maximum accepted parameter count.
        limit: usize,
    },

    /// Form key nests deeper than allowed.
    #[error("input depth exceeded limit of {limit}")]
    DepthExceeded {
        /// Maximum accepted bracket depth.
        limit: usize,
    },
}

/// JSON body of the 404 and 500 responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Short status text.
    pub error: &'static str,
    /// Human-readable message.
    pub message: String,
    /// ISO-8601 time of the response.
    pub timestamp: String,
}

impl ErrorBody {
    /// Generic 500 body; never carries failure detail.
    pub fn internal() -> Self {
        Self {
            error: "Internal Server Error",
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: now_iso(),
        }
    }

    /// 404 body naming the requested path.
    pub fn not_found(original_url: &str) -> Self {
        Self {
            error: "Not Found",
            message: format!("경로 {original_url}를 찾을 수 없습니다"),
            timestamp: now_iso(),
        }
    }
}

/// Build the generic 500 response.
pub fn internal_error_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::internal())).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Error while handling request");
        internal_error_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
