//! REST surface
//!
//! # Routes
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | / | GET | banner and default printer |
//! | /health | GET | liveness |
//! | /print | POST | run a print job (`?printer_ip=&printer_port=` override the default printer) |
//! | /jobs/{job_id} | GET | status of a submitted job |
//! | /examples | GET | sample command lists |

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::{AppState, JobRecord, JobStatus, JobTable};

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/print", post(handlers::print))
        .route("/jobs/{job_id}", get(handlers::job_status))
        .route("/examples", get(handlers::examples))
}

/// Build the application with middleware and state
pub fn build_app(state: AppState) -> Router {
    build_router()
        // CORS - any origin, method and header
        .layer(CorsLayer::permissive())
        // Trace - request spans at INFO level
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
