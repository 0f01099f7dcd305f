//! Boss drop-table edge: which items are possible drops from which boss.

use bosstrack_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from `boss_drop_table`, unique per (boss, item).
///
/// These pairs are the population universe for drop-rate aggregation:
/// every pair gets a statistics row whether or not a drop was ever seen.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DropTableEntry {
    pub id: DbId,
    pub boss_id: DbId,
    pub item_id: DbId,
    pub is_guaranteed: bool,
}
