//! Integration tests for the drop diary endpoints.

mod common;

use axum::http::StatusCode;
use common::{expect_status, get_auth, post_json, seed_character, seed_user, seeded_weekly_pair};
use serde_json::json;
use sqlx::PgPool;

async fn log_drop(
    pool: &PgPool,
    token: &str,
    character_id: i64,
    boss_id: i64,
    item_id: i64,
    cleared_at: &str,
) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/tracking/runs",
        Some(token),
        json!({
            "boss_id": boss_id,
            "character_id": character_id,
            "cleared_at": cleared_at,
            "drop_item_ids": [item_id],
        }),
    )
    .await;
    expect_status(response, StatusCode::CREATED).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn diary_lists_only_own_drops_with_context(pool: PgPool) {
    let (user_id, token) = seed_user(&pool, "d1").await;
    let character_id = seed_character(&pool, user_id, "DiaryMain").await;
    let (boss_id, item_id) = seeded_weekly_pair(&pool).await;

    log_drop(&pool, &token, character_id, boss_id, item_id, "2024-01-05T10:00:00Z").await;

    // Another user's drop must not appear.
    let (other_id, other_token) = seed_user(&pool, "d1b").await;
    let other_character = seed_character(&pool, other_id, "OtherChar").await;
    log_drop(&pool, &other_token, other_character, boss_id, item_id, "2024-01-05T11:00:00Z").await;

    let response = get_auth(common::build_test_app(pool.clone()), "/api/v1/diary", &token).await;
    let body = expect_status(response, StatusCode::OK).await;
    let entries = body["data"]["entries"].as_array().unwrap();

    assert_eq!(body["data"]["total"], 1);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["item_id"], item_id);
    assert_eq!(entries[0]["character_name"], "DiaryMain");
    assert!(entries[0]["boss_name"].is_string());
    assert!(entries[0]["item_name"].is_string());

    // Filtering by an unowned character matches nothing rather than
    // leaking whether it exists.
    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/diary?character_id={other_character}"),
        &token,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["total"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn diary_stats_and_items_aggregate(pool: PgPool) {
    let (user_id, token) = seed_user(&pool, "d2").await;
    let character_id = seed_character(&pool, user_id, "Aggregator").await;
    let (boss_id, item_id) = seeded_weekly_pair(&pool).await;

    // Same pair in two different weeks.
    log_drop(&pool, &token, character_id, boss_id, item_id, "2024-01-05T10:00:00Z").await;
    log_drop(&pool, &token, character_id, boss_id, item_id, "2024-01-12T10:00:00Z").await;

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/diary/stats",
        &token,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    let data = &body["data"];
    assert_eq!(data["total_drops"], 2);
    assert_eq!(data["unique_items"], 1);
    assert_eq!(data["unique_bosses"], 1);
    assert_eq!(data["total_quantity"], 2);
    assert_eq!(data["drops_by_item"][0]["count"], 2);
    assert_eq!(data["drops_by_boss"][0]["count"], 2);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/diary/items",
        &token,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["drop_count"], 2);
    assert_eq!(items[0]["total_quantity"], 2);

    // Date filter narrows to one drop.
    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/diary/stats?start_date=2024-01-10&end_date=2024-01-14",
        &token,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["total_drops"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn diary_timeline_groups_by_clear_date(pool: PgPool) {
    let (user_id, token) = seed_user(&pool, "d3").await;
    let character_id = seed_character(&pool, user_id, "Timeliner").await;
    let (boss_id, item_id) = seeded_weekly_pair(&pool).await;

    log_drop(&pool, &token, character_id, boss_id, item_id, "2024-01-05T10:00:00Z").await;
    log_drop(&pool, &token, character_id, boss_id, item_id, "2024-01-12T09:00:00Z").await;

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/diary/timeline",
        &token,
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    let data = &body["data"];

    assert_eq!(data["total_entries"], 2);
    let timeline = data["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 2);
    // Newest day first, one entry per day.
    assert_eq!(timeline[0]["date"], "2024-01-12");
    assert_eq!(timeline[0]["total_drops"], 1);
    assert_eq!(timeline[1]["date"], "2024-01-05");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn diary_is_empty_for_users_without_characters(pool: PgPool) {
    let (_, token) = seed_user(&pool, "d4").await;

    for uri in [
        "/api/v1/diary",
        "/api/v1/diary/stats",
        "/api/v1/diary/timeline",
    ] {
        let response = get_auth(common::build_test_app(pool.clone()), uri, &token).await;
        expect_status(response, StatusCode::OK).await;
    }

    let response = get_auth(common::build_test_app(pool), "/api/v1/diary/items", &token).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
