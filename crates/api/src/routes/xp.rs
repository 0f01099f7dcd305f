//! Route definitions for daily XP entries, mounted at `/xp`.
//!
//! ```text
//! POST   /        -> create_entry
//! GET    /        -> list_entries
//! GET    /stats   -> entry_stats
//! GET    /{id}    -> get_entry
//! PUT    /{id}    -> update_entry
//! DELETE /{id}    -> delete_entry
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::xp;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(xp::list_entries).post(xp::create_entry))
        .route("/stats", get(xp::entry_stats))
        .route(
            "/{id}",
            get(xp::get_entry).put(xp::update_entry).delete(xp::delete_entry),
        )
}
