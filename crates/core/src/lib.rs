//! Pure domain logic for the bosstrack backend.
//!
//! Everything in this crate is I/O-free: the weekly-reset calendar math,
//! the experience-table arithmetic, the epic dungeon bonus table, and the
//! drop-rate helpers. The `db` and `api` crates depend on this one, never
//! the other way around.

pub mod drop_rate;
pub mod epic_dungeon;
pub mod error;
pub mod reset;
pub mod types;
pub mod xp_table;
