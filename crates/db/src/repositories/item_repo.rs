//! Repository for the `items` reference table. Read-only: rows are
//! seeded by migration.

use sqlx::PgPool;

use bosstrack_core::types::DbId;

use crate::models::item::Item;

const COLUMNS: &str = "id, name, category, subcategory, rarity, image_url, is_active";

pub struct ItemRepo;

impl ItemRepo {
    /// Find an item by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
