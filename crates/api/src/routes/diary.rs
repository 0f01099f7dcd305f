//! Route definitions for the drop diary, mounted at `/diary`.
//!
//! ```text
//! GET /          -> list
//! GET /stats     -> stats
//! GET /items     -> items
//! GET /timeline  -> timeline
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::diary;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(diary::list))
        .route("/stats", get(diary::stats))
        .route("/items", get(diary::items))
        .route("/timeline", get(diary::timeline))
}
