//! Shared application state.

use storehouse_db::Database;

/// State handed to every handler.
///
/// `Database` is a pool handle, so cloning per request is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}
