//! Per-character daily absolute-XP snapshots from the external ranking
//! feed. Unique per (character, date); day-over-day deltas are derived at
//! read time.

use bosstrack_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A snapshot row from `character_xp_snapshots`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CharacterXpSnapshot {
    pub id: DbId,
    pub character_id: DbId,
    pub snapshot_date: NaiveDate,
    /// Cumulative lifetime XP; NUMERIC(30,0), far beyond i64 range.
    pub total_xp: Decimal,
    pub level: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
