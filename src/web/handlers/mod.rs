//! HTTP handlers.

pub mod account;
pub mod library;
pub mod upload;

pub use account::*;
pub use library::*;
pub use upload::*;

use crate::auth::SessionManager;
use crate::config::Config;
use crate::library::{BlobStore, UploadService};
use crate::Database;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database pool.
    pub db: Database,
    /// Upload workflow, which also owns the blob store.
    pub uploads: UploadService,
    /// Session token issuer.
    pub sessions: SessionManager,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, storage: BlobStore, config: &Config) -> Self {
        let uploads = UploadService::new(
            db.clone(),
            storage,
            config.storage.on_collision,
            config.storage.max_upload_bytes(),
        );

        Self {
            db,
            uploads,
            sessions: SessionManager::new(&config.auth.jwt_secret, config.auth.session_ttl_secs),
            cookie_name: config.auth.cookie_name.clone(),
        }
    }

    /// Blob store.
    pub fn storage(&self) -> &BlobStore {
        self.uploads.storage()
    }
}
