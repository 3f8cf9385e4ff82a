//! Voyage persistence: a keyed store of whole state snapshots.
//!
//! Saves happen only at day and port-phase boundaries, so a stored
//! snapshot is always internally consistent. Loading an unknown id is
//! `Ok(None)`, not an error.

use crate::state::{VoyageId, VoyageState};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored voyage is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait StateStore {
    fn save(&mut self, state: &VoyageState) -> Result<(), StoreError>;
    fn load(&self, id: &str) -> Result<Option<VoyageState>, StoreError>;
    fn remove(&mut self, id: &str) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<VoyageId>, StoreError>;
}

/// A URL-safe random voyage token.
pub fn new_voyage_id() -> VoyageId {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// In-memory store; the default for tests and single runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    voyages: HashMap<VoyageId, VoyageState>,
}

impl StateStore for MemoryStore {
    fn save(&mut self, state: &VoyageState) -> Result<(), StoreError> {
        self.voyages.insert(state.id.clone(), state.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<VoyageState>, StoreError> {
        Ok(self.voyages.get(id).cloned())
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        self.voyages.remove(id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<VoyageId>, StoreError> {
        Ok(self.voyages.keys().cloned().collect())
    }
}

/// One JSON file per voyage under a directory.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        // Ids are alphanumeric tokens; anything else is refused a path.
        let safe: String = id.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl StateStore for JsonFileStore {
    fn save(&mut self, state: &VoyageState) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(state)?;
        // Write whole-file, then rename, so a failed save never leaves a
        // truncated snapshot behind.
        let tmp = self.path_for(&state.id).with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, self.path_for(&state.id))?;
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<VoyageState>, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let path = self.path_for(id);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<VoyageId>, StoreError> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        Ok(ids)
    }
}

/// Which voyages are currently live. Termination removes the entry.
#[derive(Debug, Default)]
pub struct ActiveRegistry {
    active: HashSet<VoyageId>,
}

impl ActiveRegistry {
    pub fn register(&mut self, id: &str) {
        self.active.insert(id.to_string());
    }

    pub fn finish(&mut self, id: &str) {
        self.active.remove(id);
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &VoyageId> {
        self.active.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VoyageStateBuilder;

    #[test]
    fn test_voyage_id_shape() {
        let id = new_voyage_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, new_voyage_id());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::default();
        let state = VoyageStateBuilder::new().id("test-voyage").build();

        assert!(store.load("test-voyage").unwrap().is_none());
        store.save(&state).unwrap();
        let loaded = store.load("test-voyage").unwrap().unwrap();
        assert_eq!(loaded, state);

        store.remove("test-voyage").unwrap();
        assert!(store.load("test-voyage").unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path()).unwrap();
        let state = VoyageStateBuilder::new().id("abc123").build();

        store.save(&state).unwrap();
        let loaded = store.load("abc123").unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(store.list().unwrap(), vec!["abc123".to_string()]);

        store.remove("abc123").unwrap();
        assert!(store.load("abc123").unwrap().is_none());
    }

    #[test]
    fn test_active_registry() {
        let mut registry = ActiveRegistry::default();
        registry.register("v1");
        assert!(registry.is_active("v1"));
        registry.finish("v1");
        assert!(!registry.is_active("v1"));
    }
}
