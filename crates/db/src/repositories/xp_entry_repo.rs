//! Repository for the `xp_entries` table.
//!
//! All derived columns arrive precomputed in [`XpEntryValues`]; updates
//! rewrite the full value set so the dual-magnitude columns always come
//! from one computation.

use chrono::NaiveDate;
use sqlx::PgPool;

use bosstrack_core::types::DbId;

use crate::models::xp_entry::{XpEntry, XpEntryValues};

const COLUMNS: &str = "id, user_id, entry_date, level, old_percent, new_percent, \
     xp_gained_trillions, xp_gained_billions, epic_dungeon, epic_dungeon_xp_trillions, \
     epic_dungeon_xp_billions, epic_dungeon_multiplier, total_daily_xp_trillions, \
     total_daily_xp_billions, created_at, updated_at";

pub struct XpEntryRepo;

impl XpEntryRepo {
    /// Insert a new entry, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        values: &XpEntryValues,
    ) -> Result<XpEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO xp_entries
                (user_id, entry_date, level, old_percent, new_percent,
                 xp_gained_trillions, xp_gained_billions, epic_dungeon,
                 epic_dungeon_xp_trillions, epic_dungeon_xp_billions,
                 epic_dungeon_multiplier, total_daily_xp_trillions, total_daily_xp_billions)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, XpEntry>(&query)
            .bind(user_id)
            .bind(values.entry_date)
            .bind(values.level)
            .bind(values.old_percent)
            .bind(values.new_percent)
            .bind(values.xp_gained_trillions)
            .bind(values.xp_gained_billions)
            .bind(values.epic_dungeon)
            .bind(values.epic_dungeon_xp_trillions)
            .bind(values.epic_dungeon_xp_billions)
            .bind(values.epic_dungeon_multiplier)
            .bind(values.total_daily_xp_trillions)
            .bind(values.total_daily_xp_billions)
            .fetch_one(pool)
            .await
    }

    /// Find an entry by ID, scoped to its owner.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<XpEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM xp_entries WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, XpEntry>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the user already has an entry for the date.
    pub async fn exists_for_date(
        pool: &PgPool,
        user_id: DbId,
        entry_date: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM xp_entries WHERE user_id = $1 AND entry_date = $2 LIMIT 1",
        )
        .bind(user_id)
        .bind(entry_date)
        .fetch_optional(pool)
        .await?;
        Ok(found.is_some())
    }

    /// Date-filtered listing, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<XpEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM xp_entries
             WHERE user_id = $1
               AND ($2::date IS NULL OR entry_date >= $2)
               AND ($3::date IS NULL OR entry_date <= $3)
             ORDER BY entry_date DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, XpEntry>(&query)
            .bind(user_id)
            .bind(start_date)
            .bind(end_date)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total rows the date filter matches, for pagination metadata.
    pub async fn count_for_user(
        pool: &PgPool,
        user_id: DbId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM xp_entries
             WHERE user_id = $1
               AND ($2::date IS NULL OR entry_date >= $2)
               AND ($3::date IS NULL OR entry_date <= $3)",
        )
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(pool)
        .await
    }

    /// Entries on or after the cutoff date, for rolling statistics.
    pub async fn since(
        pool: &PgPool,
        user_id: DbId,
        cutoff: NaiveDate,
    ) -> Result<Vec<XpEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM xp_entries
             WHERE user_id = $1 AND entry_date >= $2
             ORDER BY entry_date ASC"
        );
        sqlx::query_as::<_, XpEntry>(&query)
            .bind(user_id)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Rewrite an entry's values. Returns `None` when the entry does not
    /// exist or belongs to another user.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        values: &XpEntryValues,
    ) -> Result<Option<XpEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE xp_entries SET
                entry_date = $3, level = $4, old_percent = $5, new_percent = $6,
                xp_gained_trillions = $7, xp_gained_billions = $8, epic_dungeon = $9,
                epic_dungeon_xp_trillions = $10, epic_dungeon_xp_billions = $11,
                epic_dungeon_multiplier = $12, total_daily_xp_trillions = $13,
                total_daily_xp_billions = $14, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, XpEntry>(&query)
            .bind(id)
            .bind(user_id)
            .bind(values.entry_date)
            .bind(values.level)
            .bind(values.old_percent)
            .bind(values.new_percent)
            .bind(values.xp_gained_trillions)
            .bind(values.xp_gained_billions)
            .bind(values.epic_dungeon)
            .bind(values.epic_dungeon_xp_trillions)
            .bind(values.epic_dungeon_xp_billions)
            .bind(values.epic_dungeon_multiplier)
            .bind(values.total_daily_xp_trillions)
            .bind(values.total_daily_xp_billions)
            .fetch_optional(pool)
            .await
    }

    /// Delete an entry. Returns `true` if a row owned by the user was
    /// removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM xp_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
