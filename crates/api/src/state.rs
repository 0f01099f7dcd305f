use std::sync::Arc;

use bosstrack_core::xp_table::XpTable;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). Everything here
/// is constructed once at startup and read-only afterwards -- there are no
/// lazily-initialized process globals.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bosstrack_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The per-level XP requirement table, loaded once at startup.
    /// `None` when the table file is absent; XP features then degrade.
    pub xp_table: Option<Arc<XpTable>>,
}
