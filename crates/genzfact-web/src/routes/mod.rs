//! Route handlers.

pub mod api;
pub mod page;

/// GET /health - Liveness check.
pub async fn health() -> &'static str {
    "ok"
}
