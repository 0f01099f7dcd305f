use sqlx::PgPool;

use bosstrack_db::models::character::CreateCharacter;
use bosstrack_db::models::user::CreateUser;
use bosstrack_db::repositories::{CharacterRepo, UserRepo};

/// Full bootstrap test: connect, migrate, verify seeded reference data.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    bosstrack_db::health_check(&pool).await.unwrap();

    // Reference tables must carry seed data.
    for table in ["bosses", "items", "boss_drop_table"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert!(count.0 > 0, "{table} should have seed data, got 0 rows");
    }

    // At least one boss per reset cadence in the seed.
    for reset_type in ["daily", "weekly", "monthly"] {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM bosses WHERE reset_type = $1")
                .bind(reset_type)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(count.0 > 0, "no seeded {reset_type} bosses");
    }
}

/// Users and characters round-trip through their repositories, and the
/// ownership-scoped lookup hides other users' characters.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_and_character_creation(pool: PgPool) {
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            external_id: "ext-1001".into(),
            username: Some("daggerknight".into()),
            avatar_url: None,
        },
    )
    .await
    .unwrap();

    let found = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(found.external_id, "ext-1001");
    assert_eq!(found.role, "user");

    let character = CharacterRepo::create(
        &pool,
        &CreateCharacter {
            user_id: user.id,
            name: "DaggerKnight".into(),
            world: "Scania".into(),
            job: Some("Dual Blade".into()),
            level: Some(282),
            is_main: true,
            icon_url: None,
        },
    )
    .await
    .unwrap();

    let owned = CharacterRepo::find_owned(&pool, character.id, user.id)
        .await
        .unwrap();
    assert!(owned.is_some());

    // A different user must not see it.
    let not_owned = CharacterRepo::find_owned(&pool, character.id, user.id + 1)
        .await
        .unwrap();
    assert!(not_owned.is_none());

    let ids = CharacterRepo::ids_for_user(&pool, user.id).await.unwrap();
    assert_eq!(ids, vec![character.id]);
}

/// The (user, name, world) uniqueness constraint rejects duplicates.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_character_rejected(pool: PgPool) {
    let user = UserRepo::create(
        &pool,
        &CreateUser {
            external_id: "ext-1002".into(),
            username: None,
            avatar_url: None,
        },
    )
    .await
    .unwrap();

    let input = CreateCharacter {
        user_id: user.id,
        name: "Mirror".into(),
        world: "Bera".into(),
        job: None,
        level: None,
        is_main: false,
        icon_url: None,
    };

    CharacterRepo::create(&pool, &input).await.unwrap();
    let err = CharacterRepo::create(&pool, &input).await.unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}
