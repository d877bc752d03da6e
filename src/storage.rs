//! Collection storage — one serialized JSON array per logical file.
//!
//! Stores persist their entire collection on every mutation, so the
//! interface is deliberately whole-collection: `load` everything, `save`
//! everything. `JsonFileStorage` is the production implementation;
//! `InMemoryStorage` backs tests and development and can simulate write
//! failures.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// Abstract whole-collection storage for one record type.
pub trait Storage<T>: Send + Sync {
    /// Read and deserialize the full collection.
    fn load(&self) -> Result<Vec<T>, StorageError>;

    /// Serialize and write the full collection, replacing what was there.
    fn save(&self, records: &[T]) -> Result<(), StorageError>;
}

/// File-backed storage: the collection is one human-readable JSON array.
pub struct JsonFileStorage<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonFileStorage<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStorage {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl<T> Storage<T> for JsonFileStorage<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Vec<T>, StorageError> {
        let file = File::open(&self.path)
            .map_err(|err| StorageError::Io(format!("{}: {}", self.path.display(), err)))?;
        let records = serde_json::from_reader(BufReader::new(file))?;
        Ok(records)
    }

    fn save(&self, records: &[T]) -> Result<(), StorageError> {
        let file = File::create(&self.path)
            .map_err(|err| StorageError::Io(format!("{}: {}", self.path.display(), err)))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer
            .flush()
            .map_err(|err| StorageError::Io(format!("{}: {}", self.path.display(), err)))?;
        Ok(())
    }
}

/// In-memory storage. Clone-friendly via `Arc`, so tests can keep a handle
/// to a storage that has been moved into a store.
pub struct InMemoryStorage<T> {
    records: Arc<RwLock<Vec<T>>>,
    // -1 = disabled; 0 = fail the next save; n > 0 = fail after n successes.
    fail_countdown: Arc<AtomicI64>,
}

impl<T> Clone for InMemoryStorage<T> {
    fn clone(&self) -> Self {
        InMemoryStorage {
            records: Arc::clone(&self.records),
            fail_countdown: Arc::clone(&self.fail_countdown),
        }
    }
}

impl<T> Default for InMemoryStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InMemoryStorage<T> {
    pub fn new() -> Self {
        InMemoryStorage {
            records: Arc::new(RwLock::new(Vec::new())),
            fail_countdown: Arc::new(AtomicI64::new(-1)),
        }
    }

    /// Pre-populate the storage, as if the records had been persisted.
    pub fn seeded(records: Vec<T>) -> Self {
        let storage = Self::new();
        *storage.records.write().unwrap_or_else(|e| e.into_inner()) = records;
        storage
    }

    /// Make the next `save` fail with an I/O error, then recover.
    pub fn fail_next_save(&self) {
        self.fail_after(0);
    }

    /// Let `successes` more saves succeed, then fail one, then recover.
    pub fn fail_after(&self, successes: i64) {
        self.fail_countdown.store(successes, Ordering::SeqCst);
    }
}

impl<T> Storage<T> for InMemoryStorage<T>
where
    T: Clone + Send + Sync,
{
    fn load(&self) -> Result<Vec<T>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned("in-memory load"))?;
        Ok(records.clone())
    }

    fn save(&self, records: &[T]) -> Result<(), StorageError> {
        let remaining = self.fail_countdown.load(Ordering::SeqCst);
        if remaining == 0 {
            self.fail_countdown.store(-1, Ordering::SeqCst);
            return Err(StorageError::Io("simulated write failure".to_string()));
        }
        if remaining > 0 {
            self.fail_countdown.store(remaining - 1, Ordering::SeqCst);
        }

        let mut stored = self
            .records
            .write()
            .map_err(|_| StorageError::LockPoisoned("in-memory save"))?;
        *stored = records.to_vec();
        Ok(())
    }
}
