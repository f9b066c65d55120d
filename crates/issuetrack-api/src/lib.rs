//! issuetrack-api: REST API server for the issuetrack issue tracker
//!
//! Serves create/list/update/delete on `/api/issues/{project}` from an
//! in-memory store.

pub mod extract;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::{AppState, create_routes};

/// Build the full application: routes plus tracing and CORS layers
pub fn app(state: Arc<AppState>) -> Router {
    create_routes(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)),
    )
}
