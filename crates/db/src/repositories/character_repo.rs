//! Repository for the `characters` table.

use sqlx::PgPool;

use bosstrack_core::types::DbId;

use crate::models::character::{Character, CreateCharacter};

const COLUMNS: &str =
    "id, user_id, name, world, job, level, is_main, icon_url, created_at, updated_at";

pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a new character, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCharacter) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters (user_id, name, world, job, level, is_main, icon_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(&input.world)
            .bind(&input.job)
            .bind(input.level)
            .bind(input.is_main)
            .bind(&input.icon_url)
            .fetch_one(pool)
            .await
    }

    /// Find a character by ID only when it belongs to the given user.
    ///
    /// Ownership checks use this so an unowned character is
    /// indistinguishable from a missing one.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's characters, main character first, then by name.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE user_id = $1
             ORDER BY is_main DESC, name ASC"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// IDs of every character owned by the user.
    pub async fn ids_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM characters WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
