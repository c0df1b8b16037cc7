use std::sync::Arc;

use projman_core::lifecycle::{ProjectLifecycle, TaskLifecycle};
use projman_core::users::UserDirectory;
use projman_db::PgStore;

use crate::auth::password::Argon2Hasher;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything inside is an `Arc` or a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: projman_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Store adapter shared by the services below.
    pub store: Arc<PgStore>,
    pub projects: ProjectLifecycle<PgStore>,
    pub tasks: TaskLifecycle<PgStore>,
    pub users: UserDirectory<PgStore>,
}

impl AppState {
    /// Wire the services onto one [`PgStore`] over `pool`.
    pub fn new(pool: projman_db::DbPool, config: ServerConfig) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        Self {
            pool,
            config: Arc::new(config),
            projects: ProjectLifecycle::new(Arc::clone(&store)),
            tasks: TaskLifecycle::new(Arc::clone(&store)),
            users: UserDirectory::new(Arc::clone(&store), Arc::new(Argon2Hasher)),
            store,
        }
    }
}
