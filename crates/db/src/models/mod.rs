//! Entity models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the create/update DTOs and joined projection rows
//! its repository returns.

pub mod boss;
pub mod boss_run;
pub mod character;
pub mod drop_rate_stats;
pub mod drop_table;
pub mod item;
pub mod user;
pub mod xp_entry;
pub mod xp_snapshot;
