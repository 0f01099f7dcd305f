//! Integration tests for the boss-run ledger: week_start derivation, the
//! once-per-week clear guard, the lossy drop policy, and cascade deletes.

use chrono::{NaiveDate, TimeZone, Utc};
use sqlx::PgPool;

use bosstrack_core::reset;
use bosstrack_core::types::{DbId, Timestamp};
use bosstrack_db::models::boss::Boss;
use bosstrack_db::models::boss_run::{BossRunFilter, CreateBossRun};
use bosstrack_db::models::character::CreateCharacter;
use bosstrack_db::models::user::CreateUser;
use bosstrack_db::repositories::{
    BossRepo, BossRunRepo, CharacterRepo, CreateRunOutcome, UserRepo,
};

async fn seed_character(pool: &PgPool, tag: &str) -> (DbId, DbId) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            external_id: format!("ext-{tag}"),
            username: None,
            avatar_url: None,
        },
    )
    .await
    .unwrap();
    let character = CharacterRepo::create(
        pool,
        &CreateCharacter {
            user_id: user.id,
            name: format!("Char{tag}"),
            world: "Scania".into(),
            job: None,
            level: None,
            is_main: false,
            icon_url: None,
        },
    )
    .await
    .unwrap();
    (user.id, character.id)
}

async fn seeded_boss(pool: &PgPool, reset_type: &str) -> Boss {
    let id: DbId =
        sqlx::query_scalar("SELECT id FROM bosses WHERE reset_type = $1 ORDER BY id LIMIT 1")
            .bind(reset_type)
            .fetch_one(pool)
            .await
            .unwrap();
    BossRepo::find_by_id(pool, id).await.unwrap().unwrap()
}

fn run_input(character_id: DbId, boss_id: DbId, is_clear: bool) -> CreateBossRun {
    CreateBossRun {
        character_id,
        boss_id,
        party_size: 1,
        notes: None,
        is_clear,
        drop_item_ids: vec![],
    }
}

async fn create_run(
    pool: &PgPool,
    input: &CreateBossRun,
    boss: &Boss,
    cleared_at: Timestamp,
) -> CreateRunOutcome {
    let week_start = reset::week_start_for_datetime(cleared_at);
    BossRunRepo::create(pool, input, boss, cleared_at, week_start)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn week_start_is_the_reset_thursday(pool: PgPool) {
    let (_, character_id) = seed_character(&pool, "w1").await;
    let boss = seeded_boss(&pool, "weekly").await;

    // 2024-01-06 is the Saturday after the 2024-01-04 Thursday reset.
    let cleared_at = Utc.with_ymd_and_hms(2024, 1, 6, 12, 30, 0).unwrap();
    let outcome = create_run(&pool, &run_input(character_id, boss.id, true), &boss, cleared_at).await;

    let run = match outcome {
        CreateRunOutcome::Created(run) => run,
        other => panic!("expected created run, got {other:?}"),
    };
    assert_eq!(run.week_start, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    assert_eq!(run.cleared_at, cleared_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_weekly_clear_same_week_is_a_duplicate(pool: PgPool) {
    let (_, character_id) = seed_character(&pool, "w2").await;
    let boss = seeded_boss(&pool, "weekly").await;

    let thursday = Utc.with_ymd_and_hms(2024, 1, 4, 1, 0, 0).unwrap();
    let wednesday = Utc.with_ymd_and_hms(2024, 1, 10, 23, 0, 0).unwrap();

    let first = create_run(&pool, &run_input(character_id, boss.id, true), &boss, thursday).await;
    assert!(matches!(first, CreateRunOutcome::Created(_)));

    // Same reset window, different day and time of day.
    let second =
        create_run(&pool, &run_input(character_id, boss.id, true), &boss, wednesday).await;
    assert!(matches!(second, CreateRunOutcome::DuplicateWeeklyClear));

    // The next window opens on the following Thursday.
    let next_thursday = Utc.with_ymd_and_hms(2024, 1, 11, 0, 30, 0).unwrap();
    let third =
        create_run(&pool, &run_input(character_id, boss.id, true), &boss, next_thursday).await;
    assert!(matches!(third, CreateRunOutcome::Created(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_attempts_are_never_deduplicated(pool: PgPool) {
    let (_, character_id) = seed_character(&pool, "w3").await;
    let boss = seeded_boss(&pool, "weekly").await;

    let cleared_at = Utc.with_ymd_and_hms(2024, 1, 5, 20, 0, 0).unwrap();
    let clear = create_run(&pool, &run_input(character_id, boss.id, true), &boss, cleared_at).await;
    assert!(matches!(clear, CreateRunOutcome::Created(_)));

    // Attempts after a successful clear still record.
    for _ in 0..2 {
        let attempt =
            create_run(&pool, &run_input(character_id, boss.id, false), &boss, cleared_at).await;
        assert!(matches!(attempt, CreateRunOutcome::Created(_)));
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn daily_bosses_allow_repeat_clears_in_one_week(pool: PgPool) {
    let (_, character_id) = seed_character(&pool, "w4").await;
    let boss = seeded_boss(&pool, "daily").await;

    let friday = Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();
    let saturday = Utc.with_ymd_and_hms(2024, 1, 6, 9, 0, 0).unwrap();

    let first = create_run(&pool, &run_input(character_id, boss.id, true), &boss, friday).await;
    let second = create_run(&pool, &run_input(character_id, boss.id, true), &boss, saturday).await;
    assert!(matches!(first, CreateRunOutcome::Created(_)));
    assert!(matches!(second, CreateRunOutcome::Created(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_drop_item_ids_are_silently_skipped(pool: PgPool) {
    let (_, character_id) = seed_character(&pool, "w5").await;
    let boss = seeded_boss(&pool, "weekly").await;
    let item_id: DbId = sqlx::query_scalar("SELECT id FROM items ORDER BY id LIMIT 1")
        .fetch_one(&pool)
        .await
        .unwrap();

    let mut input = run_input(character_id, boss.id, true);
    input.drop_item_ids = vec![item_id, 9_999_999];

    let cleared_at = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
    let outcome = create_run(&pool, &input, &boss, cleared_at).await;
    let run = match outcome {
        CreateRunOutcome::Created(run) => run,
        other => panic!("expected created run, got {other:?}"),
    };

    let drops = BossRunRepo::drops_for_run(&pool, run.id).await.unwrap();
    assert_eq!(drops.len(), 1, "only the valid item id should be recorded");
    assert_eq!(drops[0].item_id, item_id);
    assert_eq!(drops[0].quantity, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_run_cascades_to_its_drops(pool: PgPool) {
    let (user_id, character_id) = seed_character(&pool, "w6").await;
    let boss = seeded_boss(&pool, "weekly").await;
    let item_id: DbId = sqlx::query_scalar("SELECT id FROM items ORDER BY id LIMIT 1")
        .fetch_one(&pool)
        .await
        .unwrap();

    let mut input = run_input(character_id, boss.id, true);
    input.drop_item_ids = vec![item_id];
    let cleared_at = Utc.with_ymd_and_hms(2024, 1, 5, 11, 0, 0).unwrap();
    let run = match create_run(&pool, &input, &boss, cleared_at).await {
        CreateRunOutcome::Created(run) => run,
        other => panic!("expected created run, got {other:?}"),
    };

    let owner = BossRunRepo::find_owner(&pool, run.id).await.unwrap();
    assert_eq!(owner, Some(user_id));

    assert!(BossRunRepo::delete(&pool, run.id).await.unwrap());

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM boss_run_drops WHERE boss_run_id = $1")
            .bind(run.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_filters_by_week_and_boss(pool: PgPool) {
    let (_, character_id) = seed_character(&pool, "w7").await;
    let boss = seeded_boss(&pool, "weekly").await;

    let week_one = Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap();
    let week_two = Utc.with_ymd_and_hms(2024, 1, 12, 8, 0, 0).unwrap();
    create_run(&pool, &run_input(character_id, boss.id, true), &boss, week_one).await;
    create_run(&pool, &run_input(character_id, boss.id, true), &boss, week_two).await;

    let filter = BossRunFilter {
        character_ids: vec![character_id],
        boss_id: Some(boss.id),
        week_start: Some(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()),
        ..Default::default()
    };
    let runs = BossRunRepo::list_detailed(&pool, &filter, 20, 0).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].boss_name, boss.name);
    assert_eq!(BossRunRepo::count(&pool, &filter).await.unwrap(), 1);

    // No week filter: both runs, newest clear first.
    let filter_all = BossRunFilter {
        character_ids: vec![character_id],
        ..Default::default()
    };
    let all = BossRunRepo::list_detailed(&pool, &filter_all, 20, 0).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].cleared_at > all[1].cleared_at);
}
