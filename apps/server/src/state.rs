//! Shared application state.

use tiffin_db::Database;

use crate::auth::JwtManager;
use crate::bus::KdsBus;
use crate::config::ServerConfig;

/// Everything handlers need, behind one `Arc`.
///
/// The bus and the JWT manager are constructed at startup and injected here,
/// so tests can assemble a state around an in-memory database and their own
/// bus instance.
pub struct AppState {
    pub db: Database,
    pub bus: KdsBus,
    pub jwt: JwtManager,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(db: Database, bus: KdsBus, jwt: JwtManager, config: ServerConfig) -> Self {
        AppState {
            db,
            bus,
            jwt,
            config,
        }
    }
}
