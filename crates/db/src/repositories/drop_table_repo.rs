//! Repository for the `boss_drop_table` edge. Read-only: rows are seeded
//! by migration.

use sqlx::PgPool;

use crate::models::drop_table::DropTableEntry;

const COLUMNS: &str = "id, boss_id, item_id, is_guaranteed";

pub struct DropTableRepo;

impl DropTableRepo {
    /// Every (boss, item) pair that can drop. The aggregator's universe.
    pub async fn list_pairs(pool: &PgPool) -> Result<Vec<DropTableEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM boss_drop_table ORDER BY boss_id, item_id");
        sqlx::query_as::<_, DropTableEntry>(&query)
            .fetch_all(pool)
            .await
    }
}
