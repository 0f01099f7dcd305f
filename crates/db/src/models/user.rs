//! User entity model.
//!
//! Account identity comes from the delegated OAuth provider; this service
//! only stores the stable external id plus display fields.

use bosstrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub external_id: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub external_id: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}
