//! HTTP API module: route table, handlers and request middleware.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::AppState;
pub use routes::{create_router, with_middleware};
