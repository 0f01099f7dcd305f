//! Diary views over the drop ledger: a user's drops with filtering,
//! grouping, and running totals.
//!
//! These are pure read projections; the drop rows themselves belong to
//! `boss_run_repo`.

use chrono::NaiveDate;
use sqlx::PgPool;

use bosstrack_core::types::{DbId, Timestamp};

/// Filters shared by every diary view. `character_ids` scopes queries to
/// the requesting user's characters; the rest are optional narrowing.
#[derive(Debug, Clone, Default)]
pub struct DiaryFilter {
    pub character_ids: Vec<DbId>,
    pub boss_id: Option<DbId>,
    pub item_id: Option<DbId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive substring match on item names.
    pub search: Option<String>,
}

/// One drop with its full context, newest first in listings.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct DiaryEntry {
    pub id: DbId,
    pub boss_run_id: DbId,
    pub item_id: DbId,
    pub item_name: String,
    pub quantity: i32,
    pub character_id: DbId,
    pub character_name: String,
    pub boss_id: DbId,
    pub boss_name: String,
    pub boss_difficulty: Option<String>,
    pub cleared_at: Timestamp,
    pub created_at: Timestamp,
}

/// Aggregate totals over the filtered drops.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct DiaryTotals {
    pub total_drops: i64,
    pub unique_items: i64,
    pub unique_bosses: i64,
    pub total_quantity: i64,
}

/// Per-boss drop quantity, for the stats breakdown.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct DiaryBossCount {
    pub boss_id: DbId,
    pub boss_name: String,
    pub count: i64,
}

/// Per-item drop quantity, for the stats breakdown.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct DiaryItemCount {
    pub item_id: DbId,
    pub item_name: String,
    pub count: i64,
}

/// Per-item rollup with first/last observation timestamps.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct DiaryItemSummary {
    pub item_id: DbId,
    pub item_name: String,
    pub drop_count: i64,
    pub total_quantity: i64,
    pub first_dropped: Option<Timestamp>,
    pub last_dropped: Option<Timestamp>,
}

/// Shared FROM/WHERE tail for every diary query. `$1..$6` are the filter
/// binds in `DiaryFilter` field order.
const FROM_WHERE: &str = "FROM boss_run_drops d
     JOIN boss_runs r ON r.id = d.boss_run_id
     JOIN characters c ON c.id = r.character_id
     JOIN bosses b ON b.id = r.boss_id
     JOIN items i ON i.id = d.item_id
     WHERE r.character_id = ANY($1)
       AND ($2::bigint IS NULL OR r.boss_id = $2)
       AND ($3::bigint IS NULL OR d.item_id = $3)
       AND ($4::date IS NULL OR r.cleared_at >= $4::date)
       AND ($5::date IS NULL OR r.cleared_at < ($5::date + 1))
       AND ($6::text IS NULL OR i.name ILIKE '%' || $6 || '%')";

fn bind_filter<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    filter: &'q DiaryFilter,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    query
        .bind(&filter.character_ids)
        .bind(filter.boss_id)
        .bind(filter.item_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(&filter.search)
}

pub struct DiaryRepo;

impl DiaryRepo {
    /// Paginated drop entries, newest clear first.
    pub async fn list_entries(
        pool: &PgPool,
        filter: &DiaryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DiaryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT d.id, d.boss_run_id, d.item_id, i.name AS item_name, d.quantity,
                    r.character_id, c.name AS character_name, r.boss_id,
                    b.name AS boss_name, b.difficulty AS boss_difficulty,
                    r.cleared_at, r.created_at
             {FROM_WHERE}
             ORDER BY r.cleared_at DESC, r.created_at DESC
             LIMIT $7 OFFSET $8"
        );
        bind_filter(sqlx::query_as::<_, DiaryEntry>(&query), filter)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every matching entry, newest first, for the timeline grouping.
    pub async fn list_entries_all(
        pool: &PgPool,
        filter: &DiaryFilter,
    ) -> Result<Vec<DiaryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT d.id, d.boss_run_id, d.item_id, i.name AS item_name, d.quantity,
                    r.character_id, c.name AS character_name, r.boss_id,
                    b.name AS boss_name, b.difficulty AS boss_difficulty,
                    r.cleared_at, r.created_at
             {FROM_WHERE}
             ORDER BY r.cleared_at DESC, r.created_at DESC"
        );
        bind_filter(sqlx::query_as::<_, DiaryEntry>(&query), filter)
            .fetch_all(pool)
            .await
    }

    /// Total rows the filter matches, for pagination metadata.
    pub async fn count(pool: &PgPool, filter: &DiaryFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) AS count {FROM_WHERE}");
        #[derive(sqlx::FromRow)]
        struct CountRow {
            count: i64,
        }
        let row = bind_filter(sqlx::query_as::<_, CountRow>(&query), filter)
            .fetch_one(pool)
            .await?;
        Ok(row.count)
    }

    /// Aggregate totals over the filtered drops.
    pub async fn totals(pool: &PgPool, filter: &DiaryFilter) -> Result<DiaryTotals, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) AS total_drops,
                    COUNT(DISTINCT d.item_id) AS unique_items,
                    COUNT(DISTINCT r.boss_id) AS unique_bosses,
                    COALESCE(SUM(d.quantity), 0)::bigint AS total_quantity
             {FROM_WHERE}"
        );
        bind_filter(sqlx::query_as::<_, DiaryTotals>(&query), filter)
            .fetch_one(pool)
            .await
    }

    /// Drop quantity per boss, largest first.
    pub async fn counts_by_boss(
        pool: &PgPool,
        filter: &DiaryFilter,
    ) -> Result<Vec<DiaryBossCount>, sqlx::Error> {
        let query = format!(
            "SELECT r.boss_id, b.name AS boss_name,
                    COALESCE(SUM(d.quantity), 0)::bigint AS count
             {FROM_WHERE}
             GROUP BY r.boss_id, b.name
             ORDER BY count DESC"
        );
        bind_filter(sqlx::query_as::<_, DiaryBossCount>(&query), filter)
            .fetch_all(pool)
            .await
    }

    /// Drop quantity per item, largest first.
    pub async fn counts_by_item(
        pool: &PgPool,
        filter: &DiaryFilter,
    ) -> Result<Vec<DiaryItemCount>, sqlx::Error> {
        let query = format!(
            "SELECT d.item_id, i.name AS item_name,
                    COALESCE(SUM(d.quantity), 0)::bigint AS count
             {FROM_WHERE}
             GROUP BY d.item_id, i.name
             ORDER BY count DESC"
        );
        bind_filter(sqlx::query_as::<_, DiaryItemCount>(&query), filter)
            .fetch_all(pool)
            .await
    }

    /// Per-item rollup with first/last observation, most collected first.
    pub async fn item_summaries(
        pool: &PgPool,
        filter: &DiaryFilter,
    ) -> Result<Vec<DiaryItemSummary>, sqlx::Error> {
        let query = format!(
            "SELECT d.item_id, i.name AS item_name,
                    COUNT(*) AS drop_count,
                    COALESCE(SUM(d.quantity), 0)::bigint AS total_quantity,
                    MIN(r.created_at) AS first_dropped,
                    MAX(r.created_at) AS last_dropped
             {FROM_WHERE}
             GROUP BY d.item_id, i.name
             ORDER BY total_quantity DESC"
        );
        bind_filter(sqlx::query_as::<_, DiaryItemSummary>(&query), filter)
            .fetch_all(pool)
            .await
    }
}
