//! Shared harness for API integration tests: router construction that
//! mirrors production, JWT and seed helpers, request/response utilities.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use bosstrack_api::auth::jwt::{generate_access_token, JwtConfig};
use bosstrack_api::config::ServerConfig;
use bosstrack_api::router::build_app_router;
use bosstrack_api::state::AppState;
use bosstrack_core::types::DbId;
use bosstrack_core::xp_table::XpTable;
use bosstrack_db::models::character::CreateCharacter;
use bosstrack_db::models::user::CreateUser;
use bosstrack_db::repositories::{CharacterRepo, UserRepo};

/// Known levels for XP tests: 250 requires exactly 500e9, 260 exactly 1e12.
/// Level 260 also has an epic dungeon bonus entry; 250 does not.
const TEST_XP_TABLE: &str = "\
Level,XP Required (Actual),XP Required (Billions),XP Required (Trillions)
250,500000000000,500.00,0.500000
255,750000000000,750.00,0.750000
260,1000000000000,1000.00,1.000000
";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        xp_table_path: "unused-in-tests".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool and the test XP table.
///
/// This goes through the same [`build_app_router`] as `main.rs`, so
/// integration tests exercise the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app(pool, Some(Arc::new(XpTable::parse(TEST_XP_TABLE).unwrap())))
}

/// Same as [`build_test_app`] but with no XP table loaded, for testing
/// degraded behaviour.
pub fn build_test_app_without_xp_table(pool: PgPool) -> Router {
    build_app(pool, None)
}

fn build_app(pool: PgPool, xp_table: Option<Arc<XpTable>>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        xp_table,
    };
    build_app_router(state, &config)
}

/// Create a user and mint a valid access token for it.
pub async fn seed_user(pool: &PgPool, tag: &str) -> (DbId, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            external_id: format!("ext-{tag}"),
            username: Some(format!("user-{tag}")),
            avatar_url: None,
        },
    )
    .await
    .expect("user seed failed");
    let token = generate_access_token(user.id, &user.role, &test_config().jwt)
        .expect("token generation failed");
    (user.id, token)
}

/// Create a character owned by the given user.
pub async fn seed_character(pool: &PgPool, user_id: DbId, name: &str) -> DbId {
    CharacterRepo::create(
        pool,
        &CreateCharacter {
            user_id,
            name: name.to_string(),
            world: "Scania".to_string(),
            job: Some("Hero".to_string()),
            level: Some(260),
            is_main: false,
            icon_url: None,
        },
    )
    .await
    .expect("character seed failed")
    .id
}

/// A seeded weekly boss id and an item id from its drop table.
pub async fn seeded_weekly_pair(pool: &PgPool) -> (DbId, DbId) {
    sqlx::query_as(
        "SELECT t.boss_id, t.item_id FROM boss_drop_table t
         JOIN bosses b ON b.id = t.boss_id
         WHERE b.reset_type = 'weekly'
         ORDER BY t.id LIMIT 1",
    )
    .fetch_one(pool)
    .await
    .expect("seeded weekly drop-table pair missing")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(request("GET", uri, None, None)).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(request("GET", uri, Some(token), None))
        .await
        .unwrap()
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(request("POST", uri, token, Some(body)))
        .await
        .unwrap()
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    app.oneshot(request("PUT", uri, Some(token), Some(body)))
        .await
        .unwrap()
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    app.oneshot(request("DELETE", uri, Some(token), None))
        .await
        .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

/// Assert a status and return the parsed body for further checks.
pub async fn expect_status(
    response: Response<Body>,
    expected: StatusCode,
) -> serde_json::Value {
    let status = response.status();
    let body = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {body}");
    body
}
