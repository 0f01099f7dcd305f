//! Route definitions for community statistics, mounted at `/stats`.
//!
//! The read endpoints are public; the compute trigger is too, since a
//! recompute is idempotent and reveals nothing.
//!
//! ```text
//! GET  /overview          -> overview
//! GET  /boss/{id}         -> boss_rates
//! GET  /item/{id}         -> item_rates
//! GET  /leaderboard/rare  -> rare_leaderboard
//! POST /compute           -> compute
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::stats;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(stats::overview))
        .route("/boss/{id}", get(stats::boss_rates))
        .route("/item/{id}", get(stats::item_rates))
        .route("/leaderboard/rare", get(stats::rare_leaderboard))
        .route("/compute", post(stats::compute))
}
