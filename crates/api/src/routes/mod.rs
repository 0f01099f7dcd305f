pub mod character_xp;
pub mod diary;
pub mod health;
pub mod stats;
pub mod tracking;
pub mod xp;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /tracking/runs                   log run (POST), list runs (GET)
/// /tracking/runs/{id}              get, delete
/// /tracking/runs/{id}/drops        append drop (POST)
/// /tracking/weekly                 current-week progress summary
///
/// /diary                           filtered drop history
/// /diary/stats                     totals + per-boss/per-item breakdowns
/// /diary/items                     unique items with counts
/// /diary/timeline                  drops grouped by date
///
/// /stats/overview                  community totals (public)
/// /stats/boss/{id}                 per-boss drop rates (public)
/// /stats/item/{id}                 per-item drop rates (public)
/// /stats/leaderboard/rare          rarest drops (public)
/// /stats/compute                   trigger recompute (POST)
///
/// /xp                              create (POST), list (GET)
/// /xp/stats                        rolling totals
/// /xp/{id}                         get, update, delete
///
/// /character-xp/snapshot           upsert day reading (POST)
/// /character-xp/history/{id}       daily gain series
/// /character-xp/overview           per-character trend overview
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/tracking", tracking::router())
        .nest("/diary", diary::router())
        .nest("/stats", stats::router())
        .nest("/xp", xp::router())
        .nest("/character-xp", character_xp::router())
}
