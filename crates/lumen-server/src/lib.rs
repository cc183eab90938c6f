//! # lumen-server
//!
//! JSON API over a media root.
//!
//! | Prefix            | Module                | Auth |
//! |-------------------|-----------------------|------|
//! | `/health`         | here                  | no   |
//! | `/api/browse/*`   | [`routes::browse`]    | yes  |
//! | `/api/download/*` | [`routes::files`]     | no   |
//! | `/api/text/*`, `/api/image/*`, `/api/stream/*`, `/api/play/*`, `/api/playlist/*` | [`routes::files`] | yes |
//! | `/api/upload/*`, `/api/folders/*`, `/api/items/*` | [`routes::manage`] | yes |
//!
//! Authentication is per request through the [`auth::Authenticated`]
//! extractor.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use crate::state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
