//! Handlers for character XP snapshots: per-day absolute-XP readings and
//! the trends derived from them.
//!
//! Snapshots normally arrive from the external ranking feed's ingestion
//! glue; the POST endpoint is that glue's write path and upserts per
//! (character, date).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bosstrack_core::error::CoreError;
use bosstrack_core::types::DbId;
use bosstrack_db::repositories::{CharacterRepo, XpSnapshotRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /character-xp/snapshot`.
#[derive(Debug, Deserialize)]
pub struct CreateSnapshotRequest {
    pub character_id: DbId,
    pub snapshot_date: NaiveDate,
    pub total_xp: Decimal,
    pub level: Option<i32>,
}

/// Query parameters of `GET /character-xp/history/{character_id}`.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub days: Option<i64>,
}

/// One positive day-over-day XP delta.
#[derive(Debug, Serialize)]
pub struct DailyGain {
    pub date: NaiveDate,
    pub xp_gained: Decimal,
    pub level: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct XpHistoryData {
    pub character_id: DbId,
    pub character_name: String,
    pub daily_gains: Vec<DailyGain>,
    pub total_days: i64,
    pub average_daily_xp: Decimal,
    pub total_xp_gained: Decimal,
}

/// One character's row in the overview.
#[derive(Debug, Serialize)]
pub struct CharacterXpOverview {
    pub character_id: DbId,
    pub character_name: String,
    pub world: String,
    pub job: Option<String>,
    pub level: Option<i32>,
    pub icon_url: Option<String>,
    pub current_xp: Option<Decimal>,
    pub xp_today: Option<Decimal>,
    pub xp_yesterday: Option<Decimal>,
    pub average_xp: Option<Decimal>,
    pub total_xp_gained: Option<Decimal>,
    /// Percent into the current level. Omitted when the XP table is not
    /// loaded or the level is outside it.
    pub progress_percent: Option<Decimal>,
    pub days_tracked: i64,
}

#[derive(Debug, Serialize)]
pub struct CharacterXpOverviewList {
    pub characters: Vec<CharacterXpOverview>,
}

/// A positive delta, or `None` (negative readings are level resets or
/// feed glitches, not progress).
fn positive_delta(current: Decimal, previous: Decimal) -> Option<Decimal> {
    let delta = current - previous;
    (delta > Decimal::ZERO).then_some(delta)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /character-xp/snapshot
///
/// Record (or refresh) the day's absolute-XP reading for an owned
/// character.
pub async fn create_snapshot(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateSnapshotRequest>,
) -> AppResult<impl IntoResponse> {
    CharacterRepo::find_owned(&state.pool, payload.character_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id: payload.character_id,
        }))?;

    let snapshot = XpSnapshotRepo::upsert(
        &state.pool,
        payload.character_id,
        payload.snapshot_date,
        payload.total_xp,
        payload.level,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: snapshot })))
}

/// GET /character-xp/history/{character_id}
///
/// Daily positive XP deltas over the last N days (default 30).
pub async fn history(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(character_id): Path<DbId>,
    Query(params): Query<HistoryParams>,
) -> AppResult<impl IntoResponse> {
    let days = params.days.unwrap_or(30);
    if !(1..=365).contains(&days) {
        return Err(AppError::BadRequest("days must be between 1 and 365".into()));
    }

    let character = CharacterRepo::find_owned(&state.pool, character_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id: character_id,
        }))?;

    let cutoff = Utc::now().date_naive() - Duration::days(days);
    let snapshots = XpSnapshotRepo::since(&state.pool, character_id, cutoff).await?;

    let mut daily_gains = Vec::new();
    let mut total_xp_gained = Decimal::ZERO;
    for pair in snapshots.windows(2) {
        if let Some(gain) = positive_delta(pair[1].total_xp, pair[0].total_xp) {
            daily_gains.push(DailyGain {
                date: pair[1].snapshot_date,
                xp_gained: gain,
                level: pair[1].level,
            });
            total_xp_gained += gain;
        }
    }

    let average_daily_xp = if daily_gains.is_empty() {
        Decimal::ZERO
    } else {
        total_xp_gained / Decimal::from(daily_gains.len() as i64)
    };

    Ok(Json(DataResponse {
        data: XpHistoryData {
            character_id,
            character_name: character.name,
            total_days: daily_gains.len() as i64,
            daily_gains,
            average_daily_xp,
            total_xp_gained,
        },
    }))
}

/// GET /character-xp/overview
///
/// Today/yesterday gains, a 7-day average, and percent-into-level for
/// every character the caller owns. Progress percent is omitted (not
/// faked) when the XP table is unavailable.
pub async fn overview(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let characters = CharacterRepo::list_by_user(&state.pool, auth.user_id).await?;
    let today = Utc::now().date_naive();

    let mut overviews = Vec::with_capacity(characters.len());
    for character in characters {
        let latest = XpSnapshotRepo::latest(&state.pool, character.id).await?;
        let today_snap = XpSnapshotRepo::on_date(&state.pool, character.id, today).await?;
        let yesterday_snap =
            XpSnapshotRepo::on_date(&state.pool, character.id, today - Duration::days(1)).await?;

        let xp_today = match (&today_snap, &yesterday_snap) {
            (Some(t), Some(y)) => positive_delta(t.total_xp, y.total_xp),
            // No yesterday reading: fall back to the latest earlier one.
            (Some(t), None) => match &latest {
                Some(l) if l.snapshot_date < today => positive_delta(t.total_xp, l.total_xp),
                _ => None,
            },
            _ => None,
        };

        let xp_yesterday = match &yesterday_snap {
            Some(y) => {
                let before =
                    XpSnapshotRepo::on_date(&state.pool, character.id, today - Duration::days(2))
                        .await?;
                before.and_then(|b| positive_delta(y.total_xp, b.total_xp))
            }
            None => None,
        };

        let recent =
            XpSnapshotRepo::since(&state.pool, character.id, today - Duration::days(7)).await?;
        let days_tracked = recent.len() as i64;
        let (average_xp, total_xp_gained) = if recent.len() >= 2 {
            let total = recent[recent.len() - 1].total_xp - recent[0].total_xp;
            let average = total / Decimal::from(recent.len() as i64 - 1);
            (
                (average > Decimal::ZERO).then_some(average),
                (total > Decimal::ZERO).then_some(total),
            )
        } else {
            (None, None)
        };

        // Percent into the current level, only when both the table and a
        // leveled snapshot are available.
        let progress_percent = state.xp_table.as_deref().and_then(|table| {
            let snapshot = latest.as_ref()?;
            let level = snapshot.level?;
            table.progress_percent(level, snapshot.total_xp)
        });

        overviews.push(CharacterXpOverview {
            character_id: character.id,
            character_name: character.name,
            world: character.world,
            job: character.job,
            level: latest.as_ref().and_then(|s| s.level).or(character.level),
            icon_url: character.icon_url,
            current_xp: latest.as_ref().map(|s| s.total_xp),
            xp_today,
            xp_yesterday,
            average_xp,
            total_xp_gained,
            progress_percent,
            days_tracked,
        });
    }

    Ok(Json(DataResponse {
        data: CharacterXpOverviewList {
            characters: overviews,
        },
    }))
}
