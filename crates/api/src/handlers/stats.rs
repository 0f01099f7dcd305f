//! Handlers for the public community drop-rate statistics.
//!
//! All reads come from the precomputed `drop_rate_stats` table; the
//! `min_sample_size` floor is applied at read time only, so callers can
//! pick their own confidence threshold.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use bosstrack_core::error::CoreError;
use bosstrack_core::types::{DbId, Timestamp};
use bosstrack_db::models::drop_rate_stats::DropRateStatDetail;
use bosstrack_db::repositories::{BossRepo, DropRateStatsRepo, ItemRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

const DEFAULT_MIN_SAMPLE_SIZE: i64 = 10;
const LEADERBOARD_MIN_SAMPLE_FLOOR: i64 = 10;
const DEFAULT_LEADERBOARD_MIN_SAMPLE: i64 = 50;
const DEFAULT_LEADERBOARD_LIMIT: i64 = 20;
const MAX_LEADERBOARD_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct MinSampleParams {
    pub min_sample_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
    pub min_sample_size: Option<i64>,
}

/// A stats row plus the rate expressed as a percentage for display.
#[derive(Debug, Serialize)]
pub struct DropRateRow {
    #[serde(flatten)]
    pub stat: DropRateStatDetail,
    pub drop_rate_percent: f64,
}

impl From<DropRateStatDetail> for DropRateRow {
    fn from(stat: DropRateStatDetail) -> Self {
        let drop_rate_percent = stat.drop_rate * 100.0;
        Self {
            stat,
            drop_rate_percent,
        }
    }
}

/// Per-boss rate listing.
#[derive(Debug, Serialize)]
pub struct BossDropRates {
    pub boss_id: DbId,
    pub boss_name: String,
    pub boss_difficulty: Option<String>,
    /// Lifetime run count for the boss, attempts included.
    pub total_runs: i64,
    pub drops: Vec<DropRateRow>,
}

/// Per-item rate listing.
#[derive(Debug, Serialize)]
pub struct ItemDropRates {
    pub item_id: DbId,
    pub item_name: String,
    pub item_category: Option<String>,
    pub item_rarity: Option<String>,
    pub sources: Vec<DropRateRow>,
}

/// One row of the rarest-drops leaderboard.
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub item_id: DbId,
    pub item_name: String,
    pub boss_id: DbId,
    pub boss_name: String,
    pub drop_rate: f64,
    pub sample_size: i64,
}

#[derive(Debug, Serialize)]
pub struct RareDropsLeaderboard {
    pub title: &'static str,
    pub entries: Vec<LeaderboardEntry>,
}

/// Result of a recompute trigger.
#[derive(Debug, Serialize)]
pub struct ComputeResult {
    pub stats_updated: u64,
    pub computed_at: Timestamp,
}

fn resolve_min_sample(params: Option<i64>, floor: i64, default: i64) -> Result<i64, AppError> {
    let min_sample_size = params.unwrap_or(default);
    if min_sample_size < floor {
        return Err(AppError::BadRequest(format!(
            "min_sample_size must be >= {floor}"
        )));
    }
    Ok(min_sample_size)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /stats/overview
pub async fn overview(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let overview = DropRateStatsRepo::overview(&state.pool).await?;
    Ok(Json(DataResponse { data: overview }))
}

/// GET /stats/boss/{id}
///
/// Drop rates for every item of one boss. Rows under `min_sample_size`
/// (default 10) are filtered out as statistically unreliable.
pub async fn boss_rates(
    State(state): State<AppState>,
    Path(boss_id): Path<DbId>,
    Query(params): Query<MinSampleParams>,
) -> AppResult<impl IntoResponse> {
    let min_sample_size =
        resolve_min_sample(params.min_sample_size, 1, DEFAULT_MIN_SAMPLE_SIZE)?;

    let boss = BossRepo::find_by_id(&state.pool, boss_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Boss",
            id: boss_id,
        }))?;

    let total_runs = DropRateStatsRepo::count_runs_for_boss(&state.pool, boss_id).await?;
    let stats = DropRateStatsRepo::list_for_boss(&state.pool, boss_id, min_sample_size).await?;

    Ok(Json(DataResponse {
        data: BossDropRates {
            boss_id: boss.id,
            boss_name: boss.name,
            boss_difficulty: boss.difficulty,
            total_runs,
            drops: stats.into_iter().map(DropRateRow::from).collect(),
        },
    }))
}

/// GET /stats/item/{id}
///
/// Drop rates for one item across every boss that can drop it.
pub async fn item_rates(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Query(params): Query<MinSampleParams>,
) -> AppResult<impl IntoResponse> {
    let min_sample_size =
        resolve_min_sample(params.min_sample_size, 1, DEFAULT_MIN_SAMPLE_SIZE)?;

    let item = ItemRepo::find_by_id(&state.pool, item_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Item",
            id: item_id,
        }))?;

    let stats = DropRateStatsRepo::list_for_item(&state.pool, item_id, min_sample_size).await?;

    Ok(Json(DataResponse {
        data: ItemDropRates {
            item_id: item.id,
            item_name: item.name,
            item_category: item.category,
            item_rarity: item.rarity,
            sources: stats.into_iter().map(DropRateRow::from).collect(),
        },
    }))
}

/// GET /stats/leaderboard/rare
///
/// The rarest observed drops, ascending by rate. The sample-size floor
/// is higher here (>= 10, default 50) because a tiny sample makes a
/// "rarest" ranking meaningless.
pub async fn rare_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    if !(1..=MAX_LEADERBOARD_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LEADERBOARD_LIMIT}"
        )));
    }
    let min_sample_size = resolve_min_sample(
        params.min_sample_size,
        LEADERBOARD_MIN_SAMPLE_FLOOR,
        DEFAULT_LEADERBOARD_MIN_SAMPLE,
    )?;

    let stats = DropRateStatsRepo::rarest(&state.pool, limit, min_sample_size).await?;

    let entries = stats
        .into_iter()
        .enumerate()
        .map(|(i, stat)| LeaderboardEntry {
            rank: i as i64 + 1,
            item_id: stat.item_id,
            item_name: stat.item_name,
            boss_id: stat.boss_id,
            boss_name: match &stat.boss_difficulty {
                Some(difficulty) => format!("{difficulty} {}", stat.boss_name),
                None => stat.boss_name.clone(),
            },
            drop_rate: stat.drop_rate,
            sample_size: stat.sample_size,
        })
        .collect();

    Ok(Json(DataResponse {
        data: RareDropsLeaderboard {
            title: "Rarest Boss Drops",
            entries,
        },
    }))
}

/// POST /stats/compute
///
/// Trigger a full recompute of the drop-rate statistics. Returns 202 with
/// the number of (boss, item) pairs written. Safe to call repeatedly.
pub async fn compute(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats_updated = DropRateStatsRepo::recompute_all(&state.pool).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: ComputeResult {
                stats_updated,
                computed_at: chrono::Utc::now(),
            },
        }),
    ))
}
