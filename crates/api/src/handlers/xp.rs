//! Handlers for manually-logged daily XP entries.
//!
//! All derived columns (gained XP in both magnitudes, the optional epic
//! dungeon bonus, and the totals) are computed here from the core
//! calculators and written together, on create and on every update.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use bosstrack_core::epic_dungeon;
use bosstrack_core::error::CoreError;
use bosstrack_core::types::DbId;
use bosstrack_core::xp_table::{XpGain, XpTable};
use bosstrack_db::models::xp_entry::{XpEntry, XpEntryValues};
use bosstrack_db::repositories::XpEntryRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /xp`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateXpEntryRequest {
    pub entry_date: NaiveDate,
    #[validate(range(min = 200, max = 299, message = "level must be between 200 and 299"))]
    pub level: i32,
    pub old_percent: Decimal,
    pub new_percent: Decimal,
    #[serde(default)]
    pub epic_dungeon: bool,
    #[serde(default = "default_multiplier")]
    #[validate(range(min = 1, max = 9, message = "epic_dungeon_multiplier must be 1-9"))]
    pub epic_dungeon_multiplier: i32,
}

fn default_multiplier() -> i32 {
    1
}

/// Body of `PUT /xp/{id}`. All fields optional; derived values are
/// recomputed from the merged inputs.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateXpEntryRequest {
    #[validate(range(min = 200, max = 299, message = "level must be between 200 and 299"))]
    pub level: Option<i32>,
    pub old_percent: Option<Decimal>,
    pub new_percent: Option<Decimal>,
    pub epic_dungeon: Option<bool>,
    #[validate(range(min = 1, max = 9, message = "epic_dungeon_multiplier must be 1-9"))]
    pub epic_dungeon_multiplier: Option<i32>,
}

/// Query parameters of `GET /xp`.
#[derive(Debug, Deserialize)]
pub struct ListXpParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct XpEntryListData {
    pub entries: Vec<XpEntry>,
    pub total: i64,
}

/// Query parameters of `GET /xp/stats`.
#[derive(Debug, Deserialize)]
pub struct XpStatsParams {
    pub days: Option<i64>,
}

/// Rolling totals over the last N days of entries.
#[derive(Debug, Serialize)]
pub struct XpStatsData {
    pub average_daily_trillions: Decimal,
    pub average_daily_billions: Decimal,
    pub total_xp_trillions: Decimal,
    pub total_xp_billions: Decimal,
    pub entry_count: i64,
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// The XP table from state, or an explicit "unavailable" error.
fn require_xp_table(state: &AppState) -> AppResult<&XpTable> {
    state
        .xp_table
        .as_deref()
        .ok_or_else(|| {
            AppError::Core(CoreError::Unsupported(
                "XP table is not loaded; XP tracking is unavailable".into(),
            ))
        })
}

/// Compute every derived column from validated inputs.
///
/// Rejects a non-increasing percent pair, and distinguishes "no epic
/// dungeon at this level" (Unsupported) from a zero bonus.
fn derive_values(
    table: &XpTable,
    entry_date: NaiveDate,
    level: i32,
    old_percent: Decimal,
    new_percent: Decimal,
    epic_dungeon_flag: bool,
    multiplier: i32,
) -> AppResult<XpEntryValues> {
    if new_percent <= old_percent {
        return Err(AppError::Core(CoreError::Validation(
            "New percent must be greater than old percent".into(),
        )));
    }

    let gained = table.xp_gained(level, old_percent, new_percent)?;

    let bonus = if epic_dungeon_flag {
        let bonus = epic_dungeon::bonus_xp(level, multiplier).ok_or_else(|| {
            AppError::Core(CoreError::Unsupported(format!(
                "Epic dungeon XP not available for level {level}"
            )))
        })?;
        Some(bonus)
    } else {
        None
    };

    let total = gained + bonus.unwrap_or_else(XpGain::zero);

    Ok(XpEntryValues {
        entry_date,
        level,
        old_percent,
        new_percent,
        xp_gained_trillions: gained.trillions,
        xp_gained_billions: gained.billions,
        epic_dungeon: epic_dungeon_flag,
        epic_dungeon_xp_trillions: bonus.map(|b| b.trillions),
        epic_dungeon_xp_billions: bonus.map(|b| b.billions),
        epic_dungeon_multiplier: multiplier,
        total_daily_xp_trillions: total.trillions,
        total_daily_xp_billions: total.billions,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /xp
///
/// Log one day's progression. One entry per user per date; a duplicate
/// date is a 409.
pub async fn create_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateXpEntryRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let table = require_xp_table(&state)?;
    let values = derive_values(
        table,
        payload.entry_date,
        payload.level,
        payload.old_percent,
        payload.new_percent,
        payload.epic_dungeon,
        payload.epic_dungeon_multiplier,
    )?;

    if XpEntryRepo::exists_for_date(&state.pool, auth.user_id, payload.entry_date).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "XP entry already exists for date {}",
            payload.entry_date
        ))));
    }

    let entry = XpEntryRepo::create(&state.pool, auth.user_id, &values).await?;
    tracing::info!(
        user_id = auth.user_id,
        entry_id = entry.id,
        entry_date = %entry.entry_date,
        "XP entry created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// GET /xp
pub async fn list_entries(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListXpParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(100);
    if !(1..=1000).contains(&limit) {
        return Err(AppError::BadRequest("limit must be between 1 and 1000".into()));
    }
    let offset = params.offset.unwrap_or(0);
    if offset < 0 {
        return Err(AppError::BadRequest("offset must be >= 0".into()));
    }

    let total = XpEntryRepo::count_for_user(
        &state.pool,
        auth.user_id,
        params.start_date,
        params.end_date,
    )
    .await?;
    let entries = XpEntryRepo::list_for_user(
        &state.pool,
        auth.user_id,
        params.start_date,
        params.end_date,
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse {
        data: XpEntryListData { entries, total },
    }))
}

/// GET /xp/stats
///
/// Totals and daily average over the last N days (default 7).
pub async fn entry_stats(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<XpStatsParams>,
) -> AppResult<impl IntoResponse> {
    let days = params.days.unwrap_or(7);
    if !(1..=365).contains(&days) {
        return Err(AppError::BadRequest("days must be between 1 and 365".into()));
    }

    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(days);
    let entries = XpEntryRepo::since(&state.pool, auth.user_id, cutoff).await?;

    if entries.is_empty() {
        return Ok(Json(DataResponse {
            data: XpStatsData {
                average_daily_trillions: Decimal::ZERO,
                average_daily_billions: Decimal::ZERO,
                total_xp_trillions: Decimal::ZERO,
                total_xp_billions: Decimal::ZERO,
                entry_count: 0,
            },
        }));
    }

    let count = Decimal::from(entries.len() as i64);
    let total_trillions: Decimal = entries.iter().map(|e| e.total_daily_xp_trillions).sum();
    let total_billions: Decimal = entries.iter().map(|e| e.total_daily_xp_billions).sum();

    Ok(Json(DataResponse {
        data: XpStatsData {
            average_daily_trillions: total_trillions / count,
            average_daily_billions: total_billions / count,
            total_xp_trillions: total_trillions,
            total_xp_billions: total_billions,
            entry_count: entries.len() as i64,
        },
    }))
}

/// GET /xp/{id}
pub async fn get_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entry = XpEntryRepo::find_for_user(&state.pool, entry_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "XP entry",
            id: entry_id,
        }))?;
    Ok(Json(DataResponse { data: entry }))
}

/// PUT /xp/{id}
///
/// Merge the provided fields into the entry and recompute every derived
/// value from the merged inputs.
pub async fn update_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
    Json(payload): Json<UpdateXpEntryRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let existing = XpEntryRepo::find_for_user(&state.pool, entry_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "XP entry",
            id: entry_id,
        }))?;

    let table = require_xp_table(&state)?;
    let values = derive_values(
        table,
        existing.entry_date,
        payload.level.unwrap_or(existing.level),
        payload.old_percent.unwrap_or(existing.old_percent),
        payload.new_percent.unwrap_or(existing.new_percent),
        payload.epic_dungeon.unwrap_or(existing.epic_dungeon),
        payload
            .epic_dungeon_multiplier
            .unwrap_or(existing.epic_dungeon_multiplier),
    )?;

    let entry = XpEntryRepo::update(&state.pool, entry_id, auth.user_id, &values)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "XP entry",
            id: entry_id,
        }))?;

    Ok(Json(DataResponse { data: entry }))
}

/// DELETE /xp/{id}
pub async fn delete_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = XpEntryRepo::delete(&state.pool, entry_id, auth.user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "XP entry",
            id: entry_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
