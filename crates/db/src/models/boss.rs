//! Boss reference entity.
//!
//! Seeded by migration, never user-written. The (name, difficulty) pair is
//! unique; the same named boss can exist in several difficulty variants
//! with different reset cadences and crystal values.

use bosstrack_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Reset cadence values stored in `bosses.reset_type`.
pub const RESET_TYPE_DAILY: &str = "daily";
pub const RESET_TYPE_WEEKLY: &str = "weekly";
pub const RESET_TYPE_MONTHLY: &str = "monthly";

/// A boss row from the `bosses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Boss {
    pub id: DbId,
    pub name: String,
    pub difficulty: Option<String>,
    pub reset_type: String,
    pub party_size: i32,
    pub crystal_meso: Option<i64>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl Boss {
    /// Display name including the difficulty variant when present.
    pub fn full_name(&self) -> String {
        match &self.difficulty {
            Some(difficulty) => format!("{difficulty} {}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn is_weekly(&self) -> bool {
        self.reset_type == RESET_TYPE_WEEKLY
    }
}
