//! Integration tests for the community statistics endpoints.

mod common;

use axum::http::StatusCode;
use common::{expect_status, get, post_json, seed_character, seed_user, seeded_weekly_pair};
use serde_json::json;
use sqlx::PgPool;

async fn log_clear_with_drop(pool: &PgPool, token: &str, character_id: i64) -> (i64, i64) {
    let (boss_id, item_id) = seeded_weekly_pair(pool).await;
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/tracking/runs",
        Some(token),
        json!({
            "boss_id": boss_id,
            "character_id": character_id,
            "drop_item_ids": [item_id],
        }),
    )
    .await;
    expect_status(response, StatusCode::CREATED).await;
    (boss_id, item_id)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn compute_covers_all_pairs_and_is_idempotent(pool: PgPool) {
    let pair_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM boss_drop_table")
        .fetch_one(&pool)
        .await
        .unwrap();

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/stats/compute",
        None,
        json!({}),
    )
    .await;
    let first = expect_status(response, StatusCode::ACCEPTED).await;
    assert_eq!(first["data"]["stats_updated"], pair_count);

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/stats/compute",
        None,
        json!({}),
    )
    .await;
    let second = expect_status(response, StatusCode::ACCEPTED).await;
    assert_eq!(second["data"]["stats_updated"], pair_count);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM drop_rate_stats")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, pair_count, "exactly one stats row per pair");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn min_sample_size_suppresses_low_confidence_rows(pool: PgPool) {
    let (user_id, token) = seed_user(&pool, "s1").await;
    let character_id = seed_character(&pool, user_id, "StatChar").await;
    let (boss_id, item_id) = log_clear_with_drop(&pool, &token, character_id).await;

    post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/stats/compute",
        None,
        json!({}),
    )
    .await;

    // sample_size is 1. A floor of 50 must return an empty list, not the
    // low-confidence row.
    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/stats/boss/{boss_id}?min_sample_size=50"),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["drops"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["total_runs"], 1);

    // The default floor of 10 also hides it.
    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/stats/boss/{boss_id}"),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["drops"].as_array().unwrap().len(), 0);

    // An explicit floor of 1 reveals it, with the percent projection.
    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/stats/boss/{boss_id}?min_sample_size=1"),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    let drops = body["data"]["drops"].as_array().unwrap();
    let row = drops.iter().find(|r| r["item_id"] == item_id).unwrap();
    assert_eq!(row["drop_rate"], 1.0);
    assert_eq!(row["drop_rate_percent"], 100.0);

    // The item-centric view applies the same floor.
    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/stats/item/{item_id}?min_sample_size=1"),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    let sources = body["data"]["sources"].as_array().unwrap();
    assert!(sources.iter().any(|r| r["boss_id"] == boss_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_boss_and_item_are_404(pool: PgPool) {
    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/stats/boss/999999",
    )
    .await;
    expect_status(response, StatusCode::NOT_FOUND).await;

    let response = get(common::build_test_app(pool), "/api/v1/stats/item/999999").await;
    expect_status(response, StatusCode::NOT_FOUND).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn leaderboard_validates_parameters(pool: PgPool) {
    // min_sample_size below the floor of 10.
    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/stats/leaderboard/rare?min_sample_size=5",
    )
    .await;
    expect_status(response, StatusCode::BAD_REQUEST).await;

    // limit outside 1-100.
    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/stats/leaderboard/rare?limit=0",
    )
    .await;
    expect_status(response, StatusCode::BAD_REQUEST).await;

    // Valid request on an empty ledger: 200 with no entries.
    let response = get(
        common::build_test_app(pool),
        "/api/v1/stats/leaderboard/rare",
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["entries"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn overview_reflects_logged_activity(pool: PgPool) {
    let (user_id, token) = seed_user(&pool, "s2").await;
    let character_id = seed_character(&pool, user_id, "OverviewChar").await;
    log_clear_with_drop(&pool, &token, character_id).await;

    let response = get(common::build_test_app(pool), "/api/v1/stats/overview").await;
    let body = expect_status(response, StatusCode::OK).await;
    let data = &body["data"];

    assert_eq!(data["total_runs_logged"], 1);
    assert_eq!(data["total_drops_logged"], 1);
    assert_eq!(data["unique_contributors"], 1);
    assert!(data["most_tracked_boss"].is_string());
    assert!(data["most_dropped_item"].is_string());
}
