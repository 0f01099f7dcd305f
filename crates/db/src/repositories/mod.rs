//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod boss_repo;
pub mod boss_run_repo;
pub mod character_repo;
pub mod diary_repo;
pub mod drop_rate_stats_repo;
pub mod drop_table_repo;
pub mod item_repo;
pub mod user_repo;
pub mod xp_entry_repo;
pub mod xp_snapshot_repo;

pub use boss_repo::BossRepo;
pub use boss_run_repo::{BossRunRepo, CreateRunOutcome};
pub use character_repo::CharacterRepo;
pub use diary_repo::DiaryRepo;
pub use drop_rate_stats_repo::DropRateStatsRepo;
pub use drop_table_repo::DropTableRepo;
pub use item_repo::ItemRepo;
pub use user_repo::UserRepo;
pub use xp_entry_repo::XpEntryRepo;
pub use xp_snapshot_repo::XpSnapshotRepo;
