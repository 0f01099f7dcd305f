//! Route definitions for character XP snapshots, mounted at `/character-xp`.
//!
//! ```text
//! POST /snapshot                  -> create_snapshot
//! GET  /history/{character_id}   -> history
//! GET  /overview                  -> overview
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::character_xp;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/snapshot", post(character_xp::create_snapshot))
        .route("/history/{character_id}", get(character_xp::history))
        .route("/overview", get(character_xp::overview))
}
