//! Questboard API — HTTP surface of the live interaction engine.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;

use crate::state::AppState;

/// Builds the application router with every route mounted.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/campaigns", routes::campaigns::router())
        .nest(
            "/api/v1/interactions",
            routes::interactions::router().merge(routes::notifications::router()),
        )
        .nest("/api/v1/actions", routes::actions::router())
        .with_state(state)
}
