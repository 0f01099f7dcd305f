//! Boss-run ledger models and DTOs.
//!
//! A `BossRun` is one user-generated clear (or attempt) event; its drops
//! live in `boss_run_drops` and cascade-delete with the run. `week_start`
//! is the reset-window Thursday derived from `cleared_at` at insert time.

use bosstrack_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A run row from the `boss_runs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BossRun {
    pub id: DbId,
    pub character_id: DbId,
    pub boss_id: DbId,
    pub cleared_at: Timestamp,
    pub week_start: NaiveDate,
    pub party_size: i32,
    pub notes: Option<String>,
    pub is_clear: bool,
    pub created_at: Timestamp,
}

/// A drop row from the `boss_run_drops` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BossRunDrop {
    pub id: DbId,
    pub boss_run_id: DbId,
    pub item_id: DbId,
    pub quantity: i32,
}

/// DTO for recording a new run. The resolved `cleared_at` and derived
/// `week_start` are passed alongside by the caller.
///
/// `drop_item_ids` entries that do not match an existing item are
/// silently skipped (lossy-accept policy).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBossRun {
    pub character_id: DbId,
    pub boss_id: DbId,
    pub party_size: i32,
    pub notes: Option<String>,
    pub is_clear: bool,
    pub drop_item_ids: Vec<DbId>,
}

/// A run joined with its character/boss display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BossRunDetail {
    pub id: DbId,
    pub character_id: DbId,
    pub boss_id: DbId,
    pub cleared_at: Timestamp,
    pub week_start: NaiveDate,
    pub party_size: i32,
    pub notes: Option<String>,
    pub is_clear: bool,
    pub created_at: Timestamp,
    pub character_name: String,
    pub boss_name: String,
    pub boss_difficulty: Option<String>,
}

/// A drop joined with its item name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BossRunDropDetail {
    pub id: DbId,
    pub boss_run_id: DbId,
    pub item_id: DbId,
    pub item_name: String,
    pub quantity: i32,
}

/// Filters for listing runs. `character_ids` scopes every query to the
/// requesting user's characters.
#[derive(Debug, Clone, Default)]
pub struct BossRunFilter {
    pub character_ids: Vec<DbId>,
    pub character_id: Option<DbId>,
    pub boss_id: Option<DbId>,
    pub week_start: Option<NaiveDate>,
}

/// A successful clear within one reset window, joined for summaries.
#[derive(Debug, Clone, FromRow)]
pub struct WeeklyClear {
    pub boss_id: DbId,
    pub character_id: DbId,
    pub character_name: String,
    pub cleared_at: Timestamp,
    pub party_size: i32,
}
