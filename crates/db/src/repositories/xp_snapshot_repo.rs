//! Repository for the `character_xp_snapshots` table.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use bosstrack_core::types::DbId;

use crate::models::xp_snapshot::CharacterXpSnapshot;

const COLUMNS: &str =
    "id, character_id, snapshot_date, total_xp, level, created_at, updated_at";

pub struct XpSnapshotRepo;

impl XpSnapshotRepo {
    /// Insert or refresh the snapshot for a (character, date) pair.
    ///
    /// Re-submitting the same day replaces `total_xp`; a missing `level`
    /// keeps the previously stored one.
    pub async fn upsert(
        pool: &PgPool,
        character_id: DbId,
        snapshot_date: NaiveDate,
        total_xp: Decimal,
        level: Option<i32>,
    ) -> Result<CharacterXpSnapshot, sqlx::Error> {
        let query = format!(
            "INSERT INTO character_xp_snapshots (character_id, snapshot_date, total_xp, level)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_character_xp_snapshots_character_date DO UPDATE SET
                total_xp = EXCLUDED.total_xp,
                level = COALESCE(EXCLUDED.level, character_xp_snapshots.level),
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CharacterXpSnapshot>(&query)
            .bind(character_id)
            .bind(snapshot_date)
            .bind(total_xp)
            .bind(level)
            .fetch_one(pool)
            .await
    }

    /// Snapshots on or after the cutoff, oldest first, for delta series.
    pub async fn since(
        pool: &PgPool,
        character_id: DbId,
        cutoff: NaiveDate,
    ) -> Result<Vec<CharacterXpSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM character_xp_snapshots
             WHERE character_id = $1 AND snapshot_date >= $2
             ORDER BY snapshot_date ASC"
        );
        sqlx::query_as::<_, CharacterXpSnapshot>(&query)
            .bind(character_id)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// The most recent snapshot for a character.
    pub async fn latest(
        pool: &PgPool,
        character_id: DbId,
    ) -> Result<Option<CharacterXpSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM character_xp_snapshots
             WHERE character_id = $1
             ORDER BY snapshot_date DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, CharacterXpSnapshot>(&query)
            .bind(character_id)
            .fetch_optional(pool)
            .await
    }

    /// The snapshot on an exact date, if any.
    pub async fn on_date(
        pool: &PgPool,
        character_id: DbId,
        snapshot_date: NaiveDate,
    ) -> Result<Option<CharacterXpSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM character_xp_snapshots
             WHERE character_id = $1 AND snapshot_date = $2"
        );
        sqlx::query_as::<_, CharacterXpSnapshot>(&query)
            .bind(character_id)
            .bind(snapshot_date)
            .fetch_optional(pool)
            .await
    }
}
