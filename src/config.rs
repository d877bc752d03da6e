//! Engine configuration - the three collection files plus the admin user.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::basket::BasketEngine;
use crate::catalog::CatalogStore;
use crate::error::StorageError;
use crate::storage::JsonFileStorage;
use crate::users::UserStore;

fn default_admin() -> String {
    "admin".to_string()
}

/// File-backed deployment wiring: one JSON array per collection.
#[derive(Clone, Debug, Deserialize)]
pub struct EngineConfig {
    /// The `available` pet collection.
    pub pets_file: PathBuf,
    /// The `master` pet collection.
    pub pet_list_file: PathBuf,
    /// The user collection.
    pub users_file: PathBuf,
    /// Recipient of adoption notifications.
    #[serde(default = "default_admin")]
    pub admin_username: String,
}

impl EngineConfig {
    pub fn new(
        pets_file: impl Into<PathBuf>,
        pet_list_file: impl Into<PathBuf>,
        users_file: impl Into<PathBuf>,
    ) -> Self {
        EngineConfig {
            pets_file: pets_file.into(),
            pet_list_file: pet_list_file.into(),
            users_file: users_file.into(),
            admin_username: default_admin(),
        }
    }

    /// Read a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|err| StorageError::Io(format!("{}: {}", path.display(), err)))?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Load both stores from their files and assemble the engine.
    pub fn open(self) -> Result<BasketEngine, StorageError> {
        let catalog = CatalogStore::open(
            JsonFileStorage::new(self.pets_file),
            JsonFileStorage::new(self.pet_list_file),
        )?;
        let users = UserStore::open(JsonFileStorage::new(self.users_file))?;
        Ok(BasketEngine::new(Arc::new(catalog), Arc::new(users)).with_admin(self.admin_username))
    }
}
