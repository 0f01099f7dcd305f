//! Route definitions for the boss-run tracker, mounted at `/tracking`.
//!
//! ```text
//! POST   /runs              -> create_run
//! GET    /runs              -> list_runs
//! GET    /runs/{id}         -> get_run
//! DELETE /runs/{id}         -> delete_run
//! POST   /runs/{id}/drops   -> add_drop
//! GET    /weekly            -> weekly_summary
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tracking;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/runs", post(tracking::create_run).get(tracking::list_runs))
        .route(
            "/runs/{id}",
            get(tracking::get_run).delete(tracking::delete_run),
        )
        .route("/runs/{id}/drops", post(tracking::add_drop))
        .route("/weekly", get(tracking::weekly_summary))
}
