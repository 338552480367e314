//! Local persistence.
//!
//! [`KeyValueStore`] mirrors browser local storage: string keys, string
//! values, one writer. [`ProgressStore`] layers the game's keys and JSON
//! shapes on top and turns unreadable data into "no game in progress".

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::report::{ReportId, ReportSnapshot};
use crate::state::GameState;

/// Key holding the live run.
pub const STATE_KEY: &str = "gauntlet_state";

/// Prefix of report snapshot keys.
pub const REPORT_KEY_PREFIX: &str = "gauntlet_report_";

/// String-keyed durable storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value; absent keys are not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store, one `<key>.json` file per key.
///
/// Writes go to a temporary file that is then renamed over the target, so
/// an interrupted write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A report as loaded for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedReport {
    pub state: GameState,
    /// Absent for snapshots written without a timestamp, and for the live fallback
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    /// The snapshot was missing and the live game was shown instead
    pub from_live_game: bool,
}

/// Snapshots written by the browser client are bare game states.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredReport {
    Snapshot(ReportSnapshot),
    Bare(GameState),
}

/// Typed access to the game's keys.
pub struct ProgressStore<S> {
    inner: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Underlying key-value store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Storage key for a report.
    pub fn report_key(id: &ReportId) -> String {
        format!("{}{}", REPORT_KEY_PREFIX, id)
    }

    /// Load the live run. Absent, unreadable or corrupt data all mean
    /// "no game in progress".
    pub fn load_game(&self) -> Option<GameState> {
        self.read_json(STATE_KEY)
    }

    /// Persist the live run.
    pub fn save_game(&self, state: &GameState) -> Result<(), StorageError> {
        let json = serde_json::to_string(state)?;
        self.inner.set(STATE_KEY, &json)
    }

    /// Drop the live run. Reports are untouched.
    pub fn clear_game(&self) -> Result<(), StorageError> {
        self.inner.remove(STATE_KEY)
    }

    /// Persist a report snapshot under its own key.
    pub fn save_report(&self, snapshot: &ReportSnapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string(snapshot)?;
        self.inner.set(&Self::report_key(&snapshot.id), &json)
    }

    /// Load a report, falling back to the live run when the snapshot is
    /// missing or unreadable.
    pub fn load_report(&self, id: &ReportId) -> Option<LoadedReport> {
        let stored = self.read_json::<StoredReport>(&Self::report_key(id));

        match stored {
            Some(StoredReport::Snapshot(snapshot)) => Some(LoadedReport {
                state: snapshot.state,
                created_at: Some(snapshot.created_at),
                from_live_game: false,
            }),
            Some(StoredReport::Bare(state)) => Some(LoadedReport {
                state,
                created_at: None,
                from_live_game: false,
            }),
            None => {
                debug!(report_id = %id, "Report snapshot not found, trying live game");
                self.load_game().map(|state| LoadedReport {
                    state,
                    created_at: None,
                    from_live_game: true,
                })
            }
        }
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let raw = match self.inner.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Unreadable stored value, ignoring");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                let err = StorageError::Corrupt {
                    key: key.to_string(),
                    reason: e.to_string(),
                };
                warn!(error = %err, "Discarding corrupt stored value");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_judge::{Level, Verdict, VerdictKind};
    use tempfile::TempDir;

    use crate::state::LevelState;

    fn sample_state() -> GameState {
        let mut state = GameState::new("Acme", "invoices for freelancers").unwrap();
        state.paid = true;
        state.levels.insert(
            Level::ProblemStatement,
            LevelState {
                passed: true,
                attempts: 3,
                last_input: "Freelancers wait 60 days to get paid.".into(),
                last_result: Some(Verdict {
                    verdict: VerdictKind::Pass,
                    reasons: vec!["specific".into(), "painful".into()],
                    hint: "quantify it".into(),
                }),
            },
        );
        state.levels.insert(
            Level::ValueProposition,
            LevelState {
                passed: false,
                attempts: 1,
                last_input: "We're like Stripe but nicer.".into(),
                last_result: None,
            },
        );
        state
    }

    #[test]
    fn test_memory_store_roundtrip_is_stable() {
        let store = ProgressStore::new(MemoryStore::new());
        let state = sample_state();

        store.save_game(&state).unwrap();
        let first = store.load_game().unwrap();
        store.save_game(&first).unwrap();
        let second = store.load_game().unwrap();

        assert_eq!(first, state);
        assert_eq!(second, state);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = ProgressStore::new(FileStore::open(temp_dir.path().join("saves")).unwrap());
        let state = sample_state();

        assert!(store.load_game().is_none());
        store.save_game(&state).unwrap();
        assert_eq!(store.load_game(), Some(state));

        store.clear_game().unwrap();
        assert!(store.load_game().is_none());
        // Clearing twice is fine
        store.clear_game().unwrap();
    }

    #[test]
    fn test_corrupt_state_means_no_game() {
        let store = ProgressStore::new(MemoryStore::new());

        store.inner().set(STATE_KEY, "{\"ideaName\": \"Ac").unwrap();
        assert!(store.load_game().is_none());

        store.inner().set(STATE_KEY, "[1,2,3]").unwrap();
        assert!(store.load_game().is_none());

        store
            .inner()
            .set(STATE_KEY, r#"{"ideaName":"A","ideaDescription":"d","paid":false,"levels":{"9":{}}}"#)
            .unwrap();
        assert!(store.load_game().is_none());
    }

    #[test]
    fn test_reports_survive_reset() {
        let store = ProgressStore::new(MemoryStore::new());
        let state = sample_state();
        store.save_game(&state).unwrap();

        let snapshot = ReportSnapshot::capture(&state);
        store.save_report(&snapshot).unwrap();
        store.clear_game().unwrap();

        let loaded = store.load_report(&snapshot.id).unwrap();
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.created_at, Some(snapshot.created_at));
        assert!(!loaded.from_live_game);
    }

    #[test]
    fn test_report_falls_back_to_live_game() {
        let store = ProgressStore::new(MemoryStore::new());
        let id = ReportId::parse("missing").unwrap();

        assert!(store.load_report(&id).is_none());

        store.save_game(&sample_state()).unwrap();
        let loaded = store.load_report(&id).unwrap();
        assert!(loaded.from_live_game);
    }

    #[test]
    fn test_reads_bare_browser_snapshot() {
        let store = ProgressStore::new(MemoryStore::new());
        let id = ReportId::parse("QWNtZTE3").unwrap();
        let bare = serde_json::to_string(&sample_state()).unwrap();
        store
            .inner()
            .set(&ProgressStore::<MemoryStore>::report_key(&id), &bare)
            .unwrap();

        let loaded = store.load_report(&id).unwrap();
        assert_eq!(loaded.state.idea_name, "Acme");
        assert!(loaded.created_at.is_none());
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();

        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(store.get("a/b").is_err());
    }
}
