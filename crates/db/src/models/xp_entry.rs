//! Daily XP progression entries.
//!
//! Gained/total XP is stored in both billions and trillions. Both columns
//! are always written from one [`bosstrack_core::xp_table::XpGain`] value,
//! so the two magnitudes cannot disagree.

use bosstrack_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// An entry row from the `xp_entries` table, unique per (user, date).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct XpEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub entry_date: NaiveDate,
    pub level: i32,
    pub old_percent: Decimal,
    pub new_percent: Decimal,
    pub xp_gained_trillions: Decimal,
    pub xp_gained_billions: Decimal,
    pub epic_dungeon: bool,
    pub epic_dungeon_xp_trillions: Option<Decimal>,
    pub epic_dungeon_xp_billions: Option<Decimal>,
    pub epic_dungeon_multiplier: i32,
    pub total_daily_xp_trillions: Decimal,
    pub total_daily_xp_billions: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fully-computed column values for inserting or rewriting an entry.
///
/// Handlers derive every value here from core arithmetic before touching
/// the database; the repository never computes.
#[derive(Debug, Clone)]
pub struct XpEntryValues {
    pub entry_date: NaiveDate,
    pub level: i32,
    pub old_percent: Decimal,
    pub new_percent: Decimal,
    pub xp_gained_trillions: Decimal,
    pub xp_gained_billions: Decimal,
    pub epic_dungeon: bool,
    pub epic_dungeon_xp_trillions: Option<Decimal>,
    pub epic_dungeon_xp_billions: Option<Decimal>,
    pub epic_dungeon_multiplier: i32,
    pub total_daily_xp_trillions: Decimal,
    pub total_daily_xp_billions: Decimal,
}
