use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference counted and the config sits behind `Arc`.
/// Handlers receive it per request; nothing in it is mutable.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: triage_db::DbPool,
    /// Server configuration (JWT secret is read by the auth extractor).
    pub config: Arc<ServerConfig>,
}
