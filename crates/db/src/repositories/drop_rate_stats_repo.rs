//! Repository for the `drop_rate_stats` table and the recompute job that
//! is its only writer.

use std::collections::HashMap;

use sqlx::PgPool;

use bosstrack_core::drop_rate;
use bosstrack_core::types::{DbId, Timestamp};

use crate::models::drop_rate_stats::DropRateStatDetail;
use crate::repositories::drop_table_repo::DropTableRepo;

const DETAIL_COLUMNS: &str = "s.boss_id, b.name AS boss_name, b.difficulty AS boss_difficulty, \
     s.item_id, i.name AS item_name, i.category AS item_category, i.rarity AS item_rarity, \
     s.sample_size, s.drop_count, s.drop_rate, s.last_computed";

#[derive(Debug, sqlx::FromRow)]
struct BossCountRow {
    boss_id: DbId,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct PairCountRow {
    boss_id: DbId,
    item_id: DbId,
    count: i64,
}

/// Community-wide totals for the stats overview endpoint.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct StatsOverview {
    pub total_runs_logged: i64,
    pub total_drops_logged: i64,
    pub unique_contributors: i64,
    pub most_tracked_boss: Option<String>,
    pub most_dropped_item: Option<String>,
    pub last_updated: Option<Timestamp>,
}

pub struct DropRateStatsRepo;

impl DropRateStatsRepo {
    /// Recompute every (boss, item) statistic from the run and drop
    /// ledgers. Returns the number of pairs written.
    ///
    /// The read side is two grouped queries (per-boss successful-run
    /// counts, per-pair drop counts); the write side upserts one row per
    /// drop-table pair, each in its own implicit transaction. A failure
    /// partway leaves earlier pairs current and later pairs stale, which
    /// is the accepted steady state -- `last_computed` is per row, and a
    /// rerun converges. Runs with no intervening ledger writes are
    /// idempotent apart from `last_computed`.
    pub async fn recompute_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let pairs = DropTableRepo::list_pairs(pool).await?;

        let sample_sizes: HashMap<DbId, i64> = sqlx::query_as::<_, BossCountRow>(
            "SELECT boss_id, COUNT(*) AS count
             FROM boss_runs
             WHERE is_clear = TRUE
             GROUP BY boss_id",
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| (row.boss_id, row.count))
        .collect();

        // Drop counts are not filtered on is_clear: a drop logged against
        // an attempt still counts as an observation of the item.
        let drop_counts: HashMap<(DbId, DbId), i64> = sqlx::query_as::<_, PairCountRow>(
            "SELECT r.boss_id, d.item_id, COUNT(*) AS count
             FROM boss_run_drops d
             JOIN boss_runs r ON r.id = d.boss_run_id
             GROUP BY r.boss_id, d.item_id",
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| ((row.boss_id, row.item_id), row.count))
        .collect();

        let mut updated = 0u64;
        for pair in &pairs {
            let sample_size = sample_sizes.get(&pair.boss_id).copied().unwrap_or(0);
            let drop_count = drop_counts
                .get(&(pair.boss_id, pair.item_id))
                .copied()
                .unwrap_or(0);
            let rate = drop_rate::rate(drop_count, sample_size);

            sqlx::query(
                "INSERT INTO drop_rate_stats
                    (boss_id, item_id, sample_size, drop_count, drop_rate, last_computed)
                 VALUES ($1, $2, $3, $4, $5, NOW())
                 ON CONFLICT ON CONSTRAINT uq_drop_rate_stats_boss_item DO UPDATE SET
                    sample_size = EXCLUDED.sample_size,
                    drop_count = EXCLUDED.drop_count,
                    drop_rate = EXCLUDED.drop_rate,
                    last_computed = EXCLUDED.last_computed",
            )
            .bind(pair.boss_id)
            .bind(pair.item_id)
            .bind(sample_size)
            .bind(drop_count)
            .bind(rate)
            .execute(pool)
            .await?;

            updated += 1;
        }

        tracing::info!(pairs = updated, "Drop rate statistics recomputed");
        Ok(updated)
    }

    /// Stats for every item of one boss, highest rate first.
    pub async fn list_for_boss(
        pool: &PgPool,
        boss_id: DbId,
        min_sample_size: i64,
    ) -> Result<Vec<DropRateStatDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM drop_rate_stats s
             JOIN bosses b ON b.id = s.boss_id
             JOIN items i ON i.id = s.item_id
             WHERE s.boss_id = $1 AND s.sample_size >= $2
             ORDER BY s.drop_rate DESC"
        );
        sqlx::query_as::<_, DropRateStatDetail>(&query)
            .bind(boss_id)
            .bind(min_sample_size)
            .fetch_all(pool)
            .await
    }

    /// Stats for one item across every boss that drops it, highest rate
    /// first.
    pub async fn list_for_item(
        pool: &PgPool,
        item_id: DbId,
        min_sample_size: i64,
    ) -> Result<Vec<DropRateStatDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM drop_rate_stats s
             JOIN bosses b ON b.id = s.boss_id
             JOIN items i ON i.id = s.item_id
             WHERE s.item_id = $1 AND s.sample_size >= $2
             ORDER BY s.drop_rate DESC"
        );
        sqlx::query_as::<_, DropRateStatDetail>(&query)
            .bind(item_id)
            .bind(min_sample_size)
            .fetch_all(pool)
            .await
    }

    /// The rarest observed drops: ascending rate, only pairs with at
    /// least one drop and a sample size that makes the rate meaningful.
    pub async fn rarest(
        pool: &PgPool,
        limit: i64,
        min_sample_size: i64,
    ) -> Result<Vec<DropRateStatDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM drop_rate_stats s
             JOIN bosses b ON b.id = s.boss_id
             JOIN items i ON i.id = s.item_id
             WHERE s.sample_size >= $1 AND s.drop_count > 0
             ORDER BY s.drop_rate ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, DropRateStatDetail>(&query)
            .bind(min_sample_size)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Lifetime run count for a boss, attempts included.
    pub async fn count_runs_for_boss(pool: &PgPool, boss_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM boss_runs WHERE boss_id = $1")
            .bind(boss_id)
            .fetch_one(pool)
            .await
    }

    /// Community-wide totals for the overview endpoint.
    pub async fn overview(pool: &PgPool) -> Result<StatsOverview, sqlx::Error> {
        sqlx::query_as::<_, StatsOverview>(
            "SELECT
                (SELECT COUNT(*) FROM boss_runs) AS total_runs_logged,
                (SELECT COUNT(*) FROM boss_run_drops) AS total_drops_logged,
                (SELECT COUNT(DISTINCT c.user_id)
                 FROM boss_runs r JOIN characters c ON c.id = r.character_id)
                    AS unique_contributors,
                (SELECT b.name FROM bosses b
                 JOIN boss_runs r ON r.boss_id = b.id
                 GROUP BY b.id, b.name
                 ORDER BY COUNT(r.id) DESC LIMIT 1) AS most_tracked_boss,
                (SELECT i.name FROM items i
                 JOIN boss_run_drops d ON d.item_id = i.id
                 GROUP BY i.id, i.name
                 ORDER BY COUNT(d.id) DESC LIMIT 1) AS most_dropped_item,
                (SELECT MAX(last_computed) FROM drop_rate_stats) AS last_updated",
        )
        .fetch_one(pool)
        .await
    }
}
