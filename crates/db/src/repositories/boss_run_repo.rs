//! Repository for the `boss_runs` ledger and its child drops.

use chrono::NaiveDate;
use sqlx::PgPool;

use bosstrack_core::types::{DbId, Timestamp};

use crate::models::boss::Boss;
use crate::models::boss_run::{
    BossRun, BossRunDetail, BossRunDropDetail, BossRunFilter, CreateBossRun, WeeklyClear,
};

const RUN_COLUMNS: &str = "id, character_id, boss_id, cleared_at, week_start, party_size, notes, \
     is_clear, created_at";

const DETAIL_COLUMNS: &str = "r.id, r.character_id, r.boss_id, r.cleared_at, r.week_start, \
     r.party_size, r.notes, r.is_clear, r.created_at, \
     c.name AS character_name, b.name AS boss_name, b.difficulty AS boss_difficulty";

/// Result of attempting to record a run.
#[derive(Debug)]
pub enum CreateRunOutcome {
    Created(BossRun),
    /// A successful clear for the same (character, boss, week) already
    /// exists and the boss resets weekly.
    DuplicateWeeklyClear,
}

pub struct BossRunRepo;

impl BossRunRepo {
    /// Record a run and its drops as one atomic unit.
    ///
    /// The transaction takes an advisory lock keyed on the character id, so
    /// two concurrent submissions for the same character serialize and the
    /// duplicate check below cannot race. For weekly bosses a successful
    /// clear is allowed at most once per (character, boss, week_start);
    /// attempts (`is_clear = false`) are unrestricted.
    ///
    /// Drop item ids that do not match an existing item are silently
    /// skipped rather than failing the run.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBossRun,
        boss: &Boss,
        cleared_at: Timestamp,
        week_start: NaiveDate,
    ) -> Result<CreateRunOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Serializes run inserts per character for the duplicate check.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(input.character_id)
            .execute(&mut *tx)
            .await?;

        if boss.is_weekly() && input.is_clear {
            let duplicate: Option<DbId> = sqlx::query_scalar(
                "SELECT id FROM boss_runs
                 WHERE character_id = $1 AND boss_id = $2 AND week_start = $3
                   AND is_clear = TRUE
                 LIMIT 1",
            )
            .bind(input.character_id)
            .bind(input.boss_id)
            .bind(week_start)
            .fetch_optional(&mut *tx)
            .await?;

            if duplicate.is_some() {
                return Ok(CreateRunOutcome::DuplicateWeeklyClear);
            }
        }

        let insert_query = format!(
            "INSERT INTO boss_runs
                (character_id, boss_id, cleared_at, week_start, party_size, notes, is_clear)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {RUN_COLUMNS}"
        );
        let run = sqlx::query_as::<_, BossRun>(&insert_query)
            .bind(input.character_id)
            .bind(input.boss_id)
            .bind(cleared_at)
            .bind(week_start)
            .bind(input.party_size)
            .bind(&input.notes)
            .bind(input.is_clear)
            .fetch_one(&mut *tx)
            .await?;

        for item_id in &input.drop_item_ids {
            // The SELECT makes unknown item ids insert zero rows.
            sqlx::query(
                "INSERT INTO boss_run_drops (boss_run_id, item_id, quantity)
                 SELECT $1, id, 1 FROM items WHERE id = $2",
            )
            .bind(run.id)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(CreateRunOutcome::Created(run))
    }

    /// A run with its character/boss display fields.
    pub async fn find_detailed(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Option<BossRunDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM boss_runs r
             JOIN characters c ON c.id = r.character_id
             JOIN bosses b ON b.id = r.boss_id
             WHERE r.id = $1"
        );
        sqlx::query_as::<_, BossRunDetail>(&query)
            .bind(run_id)
            .fetch_optional(pool)
            .await
    }

    /// Drops of a run with item names, oldest first.
    pub async fn drops_for_run(
        pool: &PgPool,
        run_id: DbId,
    ) -> Result<Vec<BossRunDropDetail>, sqlx::Error> {
        sqlx::query_as::<_, BossRunDropDetail>(
            "SELECT d.id, d.boss_run_id, d.item_id, i.name AS item_name, d.quantity
             FROM boss_run_drops d
             JOIN items i ON i.id = d.item_id
             WHERE d.boss_run_id = $1
             ORDER BY d.id ASC",
        )
        .bind(run_id)
        .fetch_all(pool)
        .await
    }

    /// Drops for a whole page of runs in one query, grouped by caller.
    pub async fn drops_for_runs(
        pool: &PgPool,
        run_ids: &[DbId],
    ) -> Result<Vec<BossRunDropDetail>, sqlx::Error> {
        sqlx::query_as::<_, BossRunDropDetail>(
            "SELECT d.id, d.boss_run_id, d.item_id, i.name AS item_name, d.quantity
             FROM boss_run_drops d
             JOIN items i ON i.id = d.item_id
             WHERE d.boss_run_id = ANY($1)
             ORDER BY d.boss_run_id ASC, d.id ASC",
        )
        .bind(run_ids)
        .fetch_all(pool)
        .await
    }

    /// Filtered, paginated run listing, newest clear first.
    pub async fn list_detailed(
        pool: &PgPool,
        filter: &BossRunFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BossRunDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM boss_runs r
             JOIN characters c ON c.id = r.character_id
             JOIN bosses b ON b.id = r.boss_id
             WHERE r.character_id = ANY($1)
               AND ($2::bigint IS NULL OR r.character_id = $2)
               AND ($3::bigint IS NULL OR r.boss_id = $3)
               AND ($4::date IS NULL OR r.week_start = $4)
             ORDER BY r.cleared_at DESC, r.created_at DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, BossRunDetail>(&query)
            .bind(&filter.character_ids)
            .bind(filter.character_id)
            .bind(filter.boss_id)
            .bind(filter.week_start)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total rows the filter matches, for pagination metadata.
    pub async fn count(pool: &PgPool, filter: &BossRunFilter) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM boss_runs r
             WHERE r.character_id = ANY($1)
               AND ($2::bigint IS NULL OR r.character_id = $2)
               AND ($3::bigint IS NULL OR r.boss_id = $3)
               AND ($4::date IS NULL OR r.week_start = $4)",
        )
        .bind(&filter.character_ids)
        .bind(filter.character_id)
        .bind(filter.boss_id)
        .bind(filter.week_start)
        .fetch_one(pool)
        .await
    }

    /// The user owning the run's character, for authorization checks.
    pub async fn find_owner(pool: &PgPool, run_id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT c.user_id FROM boss_runs r
             JOIN characters c ON c.id = r.character_id
             WHERE r.id = $1",
        )
        .bind(run_id)
        .fetch_optional(pool)
        .await
    }

    /// Delete a run; drops cascade. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, run_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boss_runs WHERE id = $1")
            .bind(run_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Successful clears for the given characters in one reset window,
    /// earliest first so summaries can take the first clearing character.
    pub async fn weekly_clears(
        pool: &PgPool,
        character_ids: &[DbId],
        week_start: NaiveDate,
    ) -> Result<Vec<WeeklyClear>, sqlx::Error> {
        sqlx::query_as::<_, WeeklyClear>(
            "SELECT r.boss_id, r.character_id, c.name AS character_name, r.cleared_at,
                    r.party_size
             FROM boss_runs r
             JOIN characters c ON c.id = r.character_id
             WHERE r.character_id = ANY($1) AND r.week_start = $2 AND r.is_clear = TRUE
             ORDER BY r.cleared_at ASC",
        )
        .bind(character_ids)
        .bind(week_start)
        .fetch_all(pool)
        .await
    }

    /// Append a drop to an existing run, returning it with the item name.
    pub async fn add_drop(
        pool: &PgPool,
        run_id: DbId,
        item_id: DbId,
        quantity: i32,
    ) -> Result<BossRunDropDetail, sqlx::Error> {
        sqlx::query_as::<_, BossRunDropDetail>(
            "WITH inserted AS (
                 INSERT INTO boss_run_drops (boss_run_id, item_id, quantity)
                 VALUES ($1, $2, $3)
                 RETURNING id, boss_run_id, item_id, quantity
             )
             SELECT d.id, d.boss_run_id, d.item_id, i.name AS item_name, d.quantity
             FROM inserted d
             JOIN items i ON i.id = d.item_id",
        )
        .bind(run_id)
        .bind(item_id)
        .bind(quantity)
        .fetch_one(pool)
        .await
    }
}
