//! Handlers for the drop diary: filtered and grouped views of the
//! caller's drop history.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bosstrack_core::types::DbId;
use bosstrack_db::repositories::diary_repo::{
    DiaryBossCount, DiaryEntry, DiaryFilter, DiaryItemCount, DiaryItemSummary,
};
use bosstrack_db::repositories::{CharacterRepo, DiaryRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{page_offset, resolve_page};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Filters shared by the diary endpoints.
#[derive(Debug, Deserialize)]
pub struct DiaryParams {
    pub character_id: Option<DbId>,
    pub boss_id: Option<DbId>,
    pub item_id: Option<DbId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DiaryListData {
    pub entries: Vec<DiaryEntry>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize)]
pub struct DiaryStatsData {
    pub total_drops: i64,
    pub unique_items: i64,
    pub unique_bosses: i64,
    pub total_quantity: i64,
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,
    pub drops_by_boss: Vec<DiaryBossCount>,
    pub drops_by_item: Vec<DiaryItemCount>,
}

/// One calendar day's drops in the timeline view.
#[derive(Debug, Serialize)]
pub struct TimelineDay {
    pub date: NaiveDate,
    pub entries: Vec<DiaryEntry>,
    pub total_drops: i64,
}

#[derive(Debug, Serialize)]
pub struct DiaryTimelineData {
    pub timeline: Vec<TimelineDay>,
    pub total_entries: i64,
}

/// Build the repository filter, scoped to the caller's characters.
///
/// An unowned `character_id` filter simply matches nothing -- diary views
/// never reveal whether the character exists.
async fn build_filter(
    state: &AppState,
    user_id: DbId,
    params: &DiaryParams,
) -> Result<DiaryFilter, sqlx::Error> {
    let mut character_ids = CharacterRepo::ids_for_user(&state.pool, user_id).await?;
    if let Some(character_id) = params.character_id {
        character_ids.retain(|id| *id == character_id);
    }
    Ok(DiaryFilter {
        character_ids,
        boss_id: params.boss_id,
        item_id: params.item_id,
        start_date: params.start_date,
        end_date: params.end_date,
        search: params.search.clone(),
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /diary
///
/// Paginated drop history, newest clear first.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DiaryParams>,
) -> AppResult<impl IntoResponse> {
    let (page, page_size) = resolve_page(params.page, params.page_size)?;
    let filter = build_filter(&state, auth.user_id, &params).await?;

    if filter.character_ids.is_empty() {
        return Ok(Json(DataResponse {
            data: DiaryListData {
                entries: vec![],
                total: 0,
                page,
                page_size,
            },
        }));
    }

    let total = DiaryRepo::count(&state.pool, &filter).await?;
    let entries = DiaryRepo::list_entries(
        &state.pool,
        &filter,
        page_size,
        page_offset(page, page_size),
    )
    .await?;

    Ok(Json(DataResponse {
        data: DiaryListData {
            entries,
            total,
            page,
            page_size,
        },
    }))
}

/// GET /diary/stats
///
/// Aggregate totals plus per-boss and per-item breakdowns.
pub async fn stats(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DiaryParams>,
) -> AppResult<impl IntoResponse> {
    let filter = build_filter(&state, auth.user_id, &params).await?;

    if filter.character_ids.is_empty() {
        return Ok(Json(DataResponse {
            data: DiaryStatsData {
                total_drops: 0,
                unique_items: 0,
                unique_bosses: 0,
                total_quantity: 0,
                date_range_start: params.start_date,
                date_range_end: params.end_date,
                drops_by_boss: vec![],
                drops_by_item: vec![],
            },
        }));
    }

    let totals = DiaryRepo::totals(&state.pool, &filter).await?;
    let drops_by_boss = DiaryRepo::counts_by_boss(&state.pool, &filter).await?;
    let drops_by_item = DiaryRepo::counts_by_item(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: DiaryStatsData {
            total_drops: totals.total_drops,
            unique_items: totals.unique_items,
            unique_bosses: totals.unique_bosses,
            total_quantity: totals.total_quantity,
            date_range_start: params.start_date,
            date_range_end: params.end_date,
            drops_by_boss,
            drops_by_item,
        },
    }))
}

/// GET /diary/items
///
/// Unique dropped items with counts and first/last-seen timestamps.
pub async fn items(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DiaryParams>,
) -> AppResult<impl IntoResponse> {
    let filter = build_filter(&state, auth.user_id, &params).await?;

    let summaries: Vec<DiaryItemSummary> = if filter.character_ids.is_empty() {
        vec![]
    } else {
        DiaryRepo::item_summaries(&state.pool, &filter).await?
    };

    Ok(Json(DataResponse { data: summaries }))
}

/// GET /diary/timeline
///
/// Drops grouped by the calendar date of their run's clear, newest day
/// first.
pub async fn timeline(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DiaryParams>,
) -> AppResult<impl IntoResponse> {
    let filter = build_filter(&state, auth.user_id, &params).await?;

    if filter.character_ids.is_empty() {
        return Ok(Json(DataResponse {
            data: DiaryTimelineData {
                timeline: vec![],
                total_entries: 0,
            },
        }));
    }

    let entries = DiaryRepo::list_entries_all(&state.pool, &filter).await?;
    let total_entries = entries.len() as i64;

    let mut by_day: BTreeMap<NaiveDate, Vec<DiaryEntry>> = BTreeMap::new();
    for entry in entries {
        by_day
            .entry(entry.cleared_at.date_naive())
            .or_default()
            .push(entry);
    }

    // Newest day first.
    let timeline = by_day
        .into_iter()
        .rev()
        .map(|(date, entries)| TimelineDay {
            date,
            total_drops: entries.len() as i64,
            entries,
        })
        .collect();

    Ok(Json(DataResponse {
        data: DiaryTimelineData {
            timeline,
            total_entries,
        },
    }))
}
