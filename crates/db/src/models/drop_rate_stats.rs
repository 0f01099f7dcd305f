//! Aggregated drop-rate statistics. Derived data: written only by
//! `DropRateStatsRepo::recompute_all`, fully replaceable at any time.

use bosstrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `drop_rate_stats`, unique per (boss, item).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DropRateStat {
    pub id: DbId,
    pub boss_id: DbId,
    pub item_id: DbId,
    /// Lifetime count of successful runs against the boss.
    pub sample_size: i64,
    /// Lifetime count of observed drops of the item from the boss.
    pub drop_count: i64,
    /// drop_count / sample_size; 0.0 when no runs are recorded.
    pub drop_rate: f64,
    pub last_computed: Timestamp,
}

/// A stats row joined with boss and item display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DropRateStatDetail {
    pub boss_id: DbId,
    pub boss_name: String,
    pub boss_difficulty: Option<String>,
    pub item_id: DbId,
    pub item_name: String,
    pub item_category: Option<String>,
    pub item_rarity: Option<String>,
    pub sample_size: i64,
    pub drop_count: i64,
    pub drop_rate: f64,
    pub last_computed: Timestamp,
}
