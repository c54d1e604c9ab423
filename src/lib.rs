//! K-Le PaaS backend test service.
//!
//! A small HTTP backend used to verify PaaS deployments: a health check,
//! static and echo JSON endpoints, a JSON 404 and a central 500 handler.
//!
//! # Endpoints
//!
//! ```text
//! GET  /          service description
//! GET  /health    {"status": "healthy", ...}
//! GET  /api       environment and port
//! POST /api/data  echoes the decoded request body
//! *    anything   404 {"error": "Not Found", ...}
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types and the 500 response
//! - [`body`]: JSON and nested form body decoding
//! - [`api`]: Routes, handlers and middleware
//! - [`utils`]: Timestamps and shutdown signal

pub mod api;
pub mod body;
pub mod config;
pub mod error;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
