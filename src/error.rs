use std::fmt;
use std::io;

/// Failure of a persisted read or write.
///
/// Not-found and conflict are ordinary return values (`Option`, `bool`,
/// [`ReserveOutcome`](crate::ReserveOutcome)), never errors. Stores surface
/// `StorageError` to the caller rather than swallowing it; the basket engine
/// propagates it without catching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// File could not be read or written.
    Io(String),
    /// Persisted content could not be serialized or deserialized.
    Serde(String),
    /// A store lock was poisoned by a panicking holder.
    LockPoisoned(&'static str),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "storage i/o error: {}", msg),
            StorageError::Serde(msg) => write!(f, "storage serialization error: {}", msg),
            StorageError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serde(err.to_string())
    }
}
