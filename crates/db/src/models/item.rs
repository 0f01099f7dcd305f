//! Item reference entity. Seeded by migration, never user-written.

use bosstrack_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// An item row from the `items` table. Names are globally unique.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Item {
    pub id: DbId,
    pub name: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub rarity: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
}
