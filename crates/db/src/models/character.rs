//! Character entity model.

use bosstrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A character row from the `characters` table.
///
/// Unique per (user, name, world); a user may track the same character
/// name on different worlds.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub world: String,
    pub job: Option<String>,
    pub level: Option<i32>,
    pub is_main: bool,
    pub icon_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new character.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCharacter {
    pub user_id: DbId,
    pub name: String,
    pub world: String,
    pub job: Option<String>,
    pub level: Option<i32>,
    #[serde(default)]
    pub is_main: bool,
    pub icon_url: Option<String>,
}
