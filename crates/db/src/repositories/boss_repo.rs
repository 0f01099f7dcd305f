//! Repository for the `bosses` reference table. Read-only: rows are
//! seeded by migration.

use sqlx::PgPool;

use bosstrack_core::types::DbId;

use crate::models::boss::Boss;

const COLUMNS: &str =
    "id, name, difficulty, reset_type, party_size, crystal_meso, image_url, sort_order, is_active";

pub struct BossRepo;

impl BossRepo {
    /// Find a boss by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Boss>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bosses WHERE id = $1");
        sqlx::query_as::<_, Boss>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All active weekly-reset bosses in display order.
    pub async fn list_active_weekly(pool: &PgPool) -> Result<Vec<Boss>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bosses
             WHERE reset_type = 'weekly' AND is_active = TRUE
             ORDER BY sort_order ASC, name ASC"
        );
        sqlx::query_as::<_, Boss>(&query).fetch_all(pool).await
    }
}
