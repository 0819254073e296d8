use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize, Serializer};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::app_dirs::AppDirs;

/// Durations the user can aim for, in seconds
pub const TARGET_CHOICES: [u32; 18] = [
    5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 65, 70, 75, 80, 85, 90,
];

pub fn is_valid_target(secs: u32) -> bool {
    TARGET_CHOICES.contains(&secs)
}

/// One completed attempt: the duration aimed for and the duration measured.
///
/// Immutable once created. `target_secs` is `None` only for records loaded
/// from the legacy persisted schema, which stored no target; the unknown is
/// kept explicit rather than guessed.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub id: Uuid,
    pub timestamp: DateTime<Local>,
    pub target_secs: Option<u32>,
    pub actual_secs: f64,
}

impl Attempt {
    fn record(target_secs: u32, actual_secs: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Local::now(),
            target_secs: Some(target_secs),
            // the session clock is monotonic, but the store holds the
            // invariant on its own
            actual_secs: actual_secs.max(0.0),
        }
    }

    /// Seconds stopped too late (positive) or too early (negative).
    /// `None` for legacy records with no known target.
    pub fn signed_error(&self) -> Option<f64> {
        self.target_secs
            .map(|target| self.actual_secs - target as f64)
    }
}

/// Persisted representation. Two schemas exist in the wild: the current one
/// with an explicit target, and a legacy one that only stored the measured
/// time. Legacy records round-trip back out in legacy form so a stored blob
/// is reproduced field for field.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StoredAttempt {
    Current {
        id: Uuid,
        timestamp: DateTime<Local>,
        #[serde(rename = "targetSeconds")]
        target_secs: u32,
        #[serde(rename = "actualSeconds")]
        actual_secs: f64,
    },
    Legacy {
        id: Uuid,
        timestamp: DateTime<Local>,
        time: f64,
    },
}

impl From<StoredAttempt> for Attempt {
    fn from(stored: StoredAttempt) -> Self {
        match stored {
            StoredAttempt::Current {
                id,
                timestamp,
                target_secs,
                actual_secs,
            } => Attempt {
                id,
                timestamp,
                target_secs: Some(target_secs),
                actual_secs,
            },
            StoredAttempt::Legacy {
                id,
                timestamp,
                time,
            } => Attempt {
                id,
                timestamp,
                target_secs: None,
                actual_secs: time,
            },
        }
    }
}

impl From<&Attempt> for StoredAttempt {
    fn from(attempt: &Attempt) -> Self {
        match attempt.target_secs {
            Some(target_secs) => StoredAttempt::Current {
                id: attempt.id,
                timestamp: attempt.timestamp,
                target_secs,
                actual_secs: attempt.actual_secs,
            },
            None => StoredAttempt::Legacy {
                id: attempt.id,
                timestamp: attempt.timestamp,
                time: attempt.actual_secs,
            },
        }
    }
}

impl Serialize for Attempt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StoredAttempt::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Attempt {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StoredAttempt::deserialize(deserializer).map(Attempt::from)
    }
}

/// Durable key-value facility the store persists through: one blob in,
/// one blob out.
pub trait StorageBackend {
    /// Returns `Ok(None)` when nothing has been persisted yet.
    fn read(&self) -> io::Result<Option<Vec<u8>>>;
    fn write(&self, bytes: &[u8]) -> io::Result<()>;
}

/// Production backend: a single JSON file in the app state directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::results_path()
            .unwrap_or_else(|| PathBuf::from("chronosense_results.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, bytes)
    }
}

/// Ordered, append-only record of completed attempts.
///
/// The store is the sole writer of the persisted blob; consumers read a
/// snapshot via [`attempts`](Self::attempts) and poll
/// [`revision`](Self::revision) to notice mutations. Persistence problems
/// never surface as errors: the in-memory collection stays authoritative for
/// the lifetime of the process.
pub struct ResultsStore {
    backend: Box<dyn StorageBackend>,
    attempts: Vec<Attempt>,
    revision: u64,
}

impl ResultsStore {
    /// Open the store at the default location, loading any persisted history
    pub fn open() -> Self {
        Self::with_backend(Box::new(FileBackend::new()))
    }

    pub fn with_backend(backend: Box<dyn StorageBackend>) -> Self {
        let attempts = Self::load(backend.as_ref());
        Self {
            backend,
            attempts,
            revision: 0,
        }
    }

    fn load(backend: &dyn StorageBackend) -> Vec<Attempt> {
        match backend.read() {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(attempts) => attempts,
                Err(err) => {
                    log::warn!("discarding unreadable results blob: {err}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                log::warn!("failed to read results blob: {err}");
                Vec::new()
            }
        }
    }

    /// Record a completed attempt at the end of the history and persist
    pub fn add_result(&mut self, target_secs: u32, actual_secs: f64) {
        self.attempts.push(Attempt::record(target_secs, actual_secs));
        self.revision += 1;
        self.persist();
    }

    /// Clear the entire history. After this returns the exposed collection
    /// is empty, whether or not the empty blob reached disk.
    pub fn reset_all(&mut self) {
        self.attempts.clear();
        self.revision += 1;
        self.persist();
    }

    fn persist(&self) {
        // Whole collection as one blob on every mutation. A failed write is
        // logged and the in-memory state kept, so the just-recorded attempt
        // stays in the visible history even if it won't survive a restart.
        match serde_json::to_vec_pretty(&self.attempts) {
            Ok(bytes) => {
                if let Err(err) = self.backend.write(&bytes) {
                    log::warn!("failed to persist results: {err}");
                }
            }
            Err(err) => log::warn!("failed to serialize results: {err}"),
        }
    }

    /// Snapshot of the history, oldest first
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// Bumped on every mutation; lets the UI poll for changes
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
