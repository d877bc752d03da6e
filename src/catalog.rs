//! CatalogStore - the shared pet catalog plus the immutable master record.
//!
//! Two collections keyed by pet id: `available` (currently reservable) and
//! `master` (every pet ever created, retained forever so adopted pets keep
//! their display attributes). Both persist as JSON arrays, one file each.

use std::collections::BTreeMap;
use std::sync::Mutex;

use log::{debug, warn};

use crate::error::StorageError;
use crate::pet::Pet;
use crate::storage::Storage;

struct CatalogState {
    available: BTreeMap<u32, Pet>,
    master: BTreeMap<u32, Pet>,
    // Owned by this store instance, seeded to 1 + max persisted id at load,
    // incremented on every create, never reused after deletes.
    next_id: u32,
}

/// Owns the full pet catalog. One coarse lock guards both collections and
/// the id counter, giving at-most-one concurrent mutator per store.
pub struct CatalogStore {
    state: Mutex<CatalogState>,
    available_storage: Box<dyn Storage<Pet>>,
    master_storage: Box<dyn Storage<Pet>>,
}

impl CatalogStore {
    /// Load both collections from storage and seed the id counter.
    pub fn open(
        available_storage: impl Storage<Pet> + 'static,
        master_storage: impl Storage<Pet> + 'static,
    ) -> Result<Self, StorageError> {
        let mut available = BTreeMap::new();
        let mut master = BTreeMap::new();

        for pet in available_storage.load()? {
            available.insert(pet.id, pet);
        }
        for pet in master_storage.load()? {
            master.insert(pet.id, pet);
        }

        let max_id = available
            .keys()
            .chain(master.keys())
            .max()
            .copied()
            .unwrap_or(0);
        debug!(
            "catalog loaded: {} available, {} master, next id {}",
            available.len(),
            master.len(),
            max_id + 1
        );

        Ok(CatalogStore {
            state: Mutex::new(CatalogState {
                available,
                master,
                next_id: max_id + 1,
            }),
            available_storage: Box::new(available_storage),
            master_storage: Box::new(master_storage),
        })
    }

    fn persist(&self, state: &CatalogState) -> Result<(), StorageError> {
        let available: Vec<Pet> = state.available.values().cloned().collect();
        let master: Vec<Pet> = state.master.values().cloned().collect();
        self.available_storage.save(&available)?;
        self.master_storage.save(&master)?;
        Ok(())
    }

    /// All currently reservable pets, in id order.
    pub fn list_available(&self) -> Result<Vec<Pet>, StorageError> {
        let state = self
            .state
            .lock()
            .map_err(|_| StorageError::LockPoisoned("catalog list_available"))?;
        Ok(state.available.values().cloned().collect())
    }

    /// Every pet ever created, in id order.
    pub fn list_master(&self) -> Result<Vec<Pet>, StorageError> {
        let state = self
            .state
            .lock()
            .map_err(|_| StorageError::LockPoisoned("catalog list_master"))?;
        Ok(state.master.values().cloned().collect())
    }

    /// Resolve an id against `available` only.
    pub fn get(&self, id: u32) -> Result<Option<Pet>, StorageError> {
        let state = self
            .state
            .lock()
            .map_err(|_| StorageError::LockPoisoned("catalog get"))?;
        Ok(state.available.get(&id).cloned())
    }

    /// Resolve an id against `master`, so adopted or deleted pets still
    /// yield their display attributes.
    pub fn get_any_known(&self, id: u32) -> Result<Option<Pet>, StorageError> {
        let state = self
            .state
            .lock()
            .map_err(|_| StorageError::LockPoisoned("catalog get_any_known"))?;
        Ok(state.master.get(&id).cloned())
    }

    /// Create a pet with the next id and insert it into both collections.
    ///
    /// Any caller-supplied id is ignored, so the arguments are just the
    /// attributes. If persisting fails, the in-memory insert is rolled back
    /// and the counter is left untouched.
    pub fn create(
        &self,
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Pet, StorageError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StorageError::LockPoisoned("catalog create"))?;

        let id = state.next_id;
        let pet = Pet::new(id, category, name);
        state.available.insert(id, pet.clone());
        state.master.insert(id, pet.clone());

        if let Err(err) = self.persist(&state) {
            state.available.remove(&id);
            state.master.remove(&id);
            warn!("create of pet {} rolled back: {}", id, err);
            return Err(err);
        }

        state.next_id += 1;
        Ok(pet)
    }

    /// Replace a pet by id in both collections. Returns `None` without
    /// mutating anything if the id is not currently available.
    pub fn update(&self, pet: Pet) -> Result<Option<Pet>, StorageError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StorageError::LockPoisoned("catalog update"))?;

        if !state.available.contains_key(&pet.id) {
            return Ok(None);
        }

        state.available.insert(pet.id, pet.clone());
        state.master.insert(pet.id, pet.clone());
        self.persist(&state)?;
        Ok(Some(pet))
    }

    /// Remove a pet from `available` only; `master` keeps the record
    /// forever. Returns `false` if the id was not available.
    pub fn delete(&self, id: u32) -> Result<bool, StorageError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StorageError::LockPoisoned("catalog delete"))?;

        if state.available.remove(&id).is_none() {
            return Ok(false);
        }
        self.persist(&state)?;
        Ok(true)
    }

    /// Available pets whose name starts with `text`, case-insensitively.
    pub fn find_by_name_prefix(&self, text: &str) -> Result<Vec<Pet>, StorageError> {
        self.find_available(text, pet_name)
    }

    /// Available pets whose category starts with `text`, case-insensitively.
    pub fn find_by_type_prefix(&self, text: &str) -> Result<Vec<Pet>, StorageError> {
        self.find_available(text, pet_category)
    }

    fn find_available(
        &self,
        text: &str,
        field: fn(&Pet) -> &str,
    ) -> Result<Vec<Pet>, StorageError> {
        let needle = text.to_lowercase();
        let state = self
            .state
            .lock()
            .map_err(|_| StorageError::LockPoisoned("catalog find"))?;
        Ok(state
            .available
            .values()
            .filter(|pet| field(pet).to_lowercase().starts_with(&needle))
            .cloned()
            .collect())
    }
}

fn pet_name(pet: &Pet) -> &str {
    &pet.name
}

fn pet_category(pet: &Pet) -> &str {
    &pet.category
}
