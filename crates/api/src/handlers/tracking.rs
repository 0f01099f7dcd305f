//! Handlers for the boss-run ledger: recording clears, listing and
//! deleting runs, appending drops, and the weekly progress summary.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use bosstrack_core::drop_rate;
use bosstrack_core::error::CoreError;
use bosstrack_core::reset;
use bosstrack_core::types::{DbId, Timestamp};
use bosstrack_db::models::boss_run::{
    BossRunDetail, BossRunDropDetail, BossRunFilter, CreateBossRun,
};
use bosstrack_db::repositories::{
    BossRepo, BossRunRepo, CharacterRepo, CreateRunOutcome, ItemRepo,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{page_offset, resolve_page};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /tracking/runs`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRunRequest {
    pub boss_id: DbId,
    pub character_id: DbId,
    /// Defaults to now when omitted.
    pub cleared_at: Option<Timestamp>,
    #[serde(default = "default_party_size")]
    #[validate(range(min = 1, max = 6, message = "party_size must be between 1 and 6"))]
    pub party_size: i32,
    #[validate(length(max = 500, message = "notes must be at most 500 characters"))]
    pub notes: Option<String>,
    #[serde(default = "default_true")]
    pub is_clear: bool,
    #[serde(default)]
    pub drop_item_ids: Vec<DbId>,
}

fn default_party_size() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

/// Body of `POST /tracking/runs/{id}/drops`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddDropRequest {
    pub item_id: DbId,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// A run with its drops, as returned by the tracking endpoints.
#[derive(Debug, Serialize)]
pub struct RunWithDrops {
    #[serde(flatten)]
    pub run: BossRunDetail,
    pub drops: Vec<BossRunDropDetail>,
}

/// Paginated run listing.
#[derive(Debug, Serialize)]
pub struct RunListData {
    pub runs: Vec<RunWithDrops>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

/// Query parameters of `GET /tracking/runs`.
#[derive(Debug, Deserialize)]
pub struct ListRunsParams {
    pub character_id: Option<DbId>,
    pub boss_id: Option<DbId>,
    /// ISO date (`YYYY-MM-DD`); rejected with 400 when malformed.
    pub week_start: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Query parameters of `GET /tracking/weekly`.
#[derive(Debug, Deserialize)]
pub struct WeeklyParams {
    pub character_id: Option<DbId>,
}

/// One boss row in the weekly progress summary.
#[derive(Debug, Serialize)]
pub struct WeeklyBossProgress {
    pub boss_id: DbId,
    pub boss_name: String,
    pub boss_difficulty: Option<String>,
    pub crystal_meso: Option<i64>,
    pub cleared: bool,
    pub cleared_at: Option<Timestamp>,
    pub character_id: Option<DbId>,
    pub character_name: Option<String>,
}

/// The weekly progress summary.
#[derive(Debug, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_bosses: i64,
    pub cleared_count: i64,
    /// Sum of crystal_meso / party_size over cleared bosses. Integer
    /// division; the truncation loss is accepted.
    pub total_meso: i64,
    pub progress: Vec<WeeklyBossProgress>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Attach drops to their runs with one query for the whole page.
async fn with_drops(
    pool: &bosstrack_db::DbPool,
    runs: Vec<BossRunDetail>,
) -> Result<Vec<RunWithDrops>, sqlx::Error> {
    let run_ids: Vec<DbId> = runs.iter().map(|r| r.id).collect();
    let mut drops_by_run: HashMap<DbId, Vec<BossRunDropDetail>> = HashMap::new();
    for drop in BossRunRepo::drops_for_runs(pool, &run_ids).await? {
        drops_by_run.entry(drop.boss_run_id).or_default().push(drop);
    }
    Ok(runs
        .into_iter()
        .map(|run| {
            let drops = drops_by_run.remove(&run.id).unwrap_or_default();
            RunWithDrops { run, drops }
        })
        .collect())
}

/// Resolve a run's owner, mapping a missing run to 404 and another user's
/// run to 403.
async fn require_run_owner(
    pool: &bosstrack_db::DbPool,
    run_id: DbId,
    user_id: DbId,
) -> AppResult<()> {
    let owner = BossRunRepo::find_owner(pool, run_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Boss run",
            id: run_id,
        }))?;
    if owner != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Boss run does not belong to you".into(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /tracking/runs
///
/// Log a boss clear (or attempt) for one of the caller's characters.
/// Weekly bosses allow at most one successful clear per character per
/// reset window; a duplicate is rejected with 409. Unknown drop item ids
/// are silently skipped.
pub async fn create_run(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateRunRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let character = CharacterRepo::find_owned(&state.pool, payload.character_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id: payload.character_id,
        }))?;

    let boss = BossRepo::find_by_id(&state.pool, payload.boss_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Boss",
            id: payload.boss_id,
        }))?;

    let cleared_at = payload.cleared_at.unwrap_or_else(Utc::now);
    let week_start = reset::week_start_for_datetime(cleared_at);

    let input = CreateBossRun {
        character_id: character.id,
        boss_id: boss.id,
        party_size: payload.party_size,
        notes: payload.notes.clone(),
        is_clear: payload.is_clear,
        drop_item_ids: payload.drop_item_ids.clone(),
    };

    let run = match BossRunRepo::create(&state.pool, &input, &boss, cleared_at, week_start).await? {
        CreateRunOutcome::Created(run) => run,
        CreateRunOutcome::DuplicateWeeklyClear => {
            return Err(AppError::Core(CoreError::Conflict(
                "This boss has already been cleared this week on this character".into(),
            )));
        }
    };

    tracing::info!(
        user_id = auth.user_id,
        run_id = run.id,
        boss_id = boss.id,
        %week_start,
        "Boss run recorded"
    );

    let detail = BossRunRepo::find_detailed(&state.pool, run.id)
        .await?
        .ok_or_else(|| AppError::InternalError("Created run vanished".into()))?;
    let drops = BossRunRepo::drops_for_run(&state.pool, run.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RunWithDrops { run: detail, drops },
        }),
    ))
}

/// GET /tracking/runs
///
/// List the caller's runs, newest clear first, with optional character,
/// boss, and week filters.
pub async fn list_runs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListRunsParams>,
) -> AppResult<impl IntoResponse> {
    let (page, page_size) = resolve_page(params.page, params.page_size)?;

    let week_start = params
        .week_start
        .as_deref()
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::BadRequest("Invalid week_start format. Use YYYY-MM-DD".into())
            })
        })
        .transpose()?;

    let character_ids = CharacterRepo::ids_for_user(&state.pool, auth.user_id).await?;
    if character_ids.is_empty() {
        return Ok(Json(DataResponse {
            data: RunListData {
                runs: vec![],
                total: 0,
                page,
                page_size,
            },
        }));
    }

    if let Some(character_id) = params.character_id {
        if !character_ids.contains(&character_id) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Character does not belong to you".into(),
            )));
        }
    }

    let filter = BossRunFilter {
        character_ids,
        character_id: params.character_id,
        boss_id: params.boss_id,
        week_start,
    };

    let total = BossRunRepo::count(&state.pool, &filter).await?;
    let runs = BossRunRepo::list_detailed(
        &state.pool,
        &filter,
        page_size,
        page_offset(page, page_size),
    )
    .await?;
    let runs = with_drops(&state.pool, runs).await?;

    Ok(Json(DataResponse {
        data: RunListData {
            runs,
            total,
            page,
            page_size,
        },
    }))
}

/// GET /tracking/runs/{id}
pub async fn get_run(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(run_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_run_owner(&state.pool, run_id, auth.user_id).await?;

    let detail = BossRunRepo::find_detailed(&state.pool, run_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Boss run",
            id: run_id,
        }))?;
    let drops = BossRunRepo::drops_for_run(&state.pool, run_id).await?;

    Ok(Json(DataResponse {
        data: RunWithDrops { run: detail, drops },
    }))
}

/// DELETE /tracking/runs/{id}
///
/// Remove a run and (by cascade) its drops. Only the owner may delete.
pub async fn delete_run(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(run_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_run_owner(&state.pool, run_id, auth.user_id).await?;
    BossRunRepo::delete(&state.pool, run_id).await?;

    tracing::info!(user_id = auth.user_id, run_id, "Boss run deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /tracking/runs/{id}/drops
///
/// Append one drop to an existing run. Unlike run creation's lossy
/// drop_item_ids, an unknown item here is a 404.
pub async fn add_drop(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(run_id): Path<DbId>,
    Json(payload): Json<AddDropRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    require_run_owner(&state.pool, run_id, auth.user_id).await?;

    ItemRepo::find_by_id(&state.pool, payload.item_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Item",
            id: payload.item_id,
        }))?;

    let drop = BossRunRepo::add_drop(&state.pool, run_id, payload.item_id, payload.quantity).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: drop })))
}

/// GET /tracking/weekly
///
/// Current-reset-window summary: every active weekly boss with whether
/// any of the caller's characters cleared it (first clear wins -- a boss
/// is never counted twice), plus the crystal meso total.
pub async fn weekly_summary(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<WeeklyParams>,
) -> AppResult<impl IntoResponse> {
    let week_start = reset::current_week_start();
    let week_end = week_start + Duration::days(6);

    let mut characters = CharacterRepo::list_by_user(&state.pool, auth.user_id).await?;
    if let Some(character_id) = params.character_id {
        characters.retain(|c| c.id == character_id);
    }

    if characters.is_empty() {
        return Ok(Json(DataResponse {
            data: WeeklySummary {
                week_start,
                week_end,
                total_bosses: 0,
                cleared_count: 0,
                total_meso: 0,
                progress: vec![],
            },
        }));
    }

    let character_ids: Vec<DbId> = characters.iter().map(|c| c.id).collect();
    let bosses = BossRepo::list_active_weekly(&state.pool).await?;
    let clears = BossRunRepo::weekly_clears(&state.pool, &character_ids, week_start).await?;

    // Earliest clear per boss; weekly_clears is ordered by cleared_at.
    let mut first_clear_by_boss = HashMap::new();
    for clear in &clears {
        first_clear_by_boss.entry(clear.boss_id).or_insert(clear);
    }

    let mut progress = Vec::with_capacity(bosses.len());
    let mut cleared_count = 0i64;
    let mut total_meso = 0i64;

    for boss in &bosses {
        match first_clear_by_boss.get(&boss.id) {
            Some(clear) => {
                cleared_count += 1;
                if let Some(crystal_meso) = boss.crystal_meso {
                    total_meso += drop_rate::crystal_share(crystal_meso, clear.party_size);
                }
                progress.push(WeeklyBossProgress {
                    boss_id: boss.id,
                    boss_name: boss.name.clone(),
                    boss_difficulty: boss.difficulty.clone(),
                    crystal_meso: boss.crystal_meso,
                    cleared: true,
                    cleared_at: Some(clear.cleared_at),
                    character_id: Some(clear.character_id),
                    character_name: Some(clear.character_name.clone()),
                });
            }
            None => progress.push(WeeklyBossProgress {
                boss_id: boss.id,
                boss_name: boss.name.clone(),
                boss_difficulty: boss.difficulty.clone(),
                crystal_meso: boss.crystal_meso,
                cleared: false,
                cleared_at: None,
                character_id: None,
                character_name: None,
            }),
        }
    }

    Ok(Json(DataResponse {
        data: WeeklySummary {
            week_start,
            week_end,
            total_bosses: bosses.len() as i64,
            cleared_count,
            total_meso,
            progress,
        },
    }))
}
