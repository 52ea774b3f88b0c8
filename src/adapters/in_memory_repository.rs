//! In-memory table repository for testing.
//!
//! This adapter provides a pure in-memory implementation of TableRepository,
//! enabling fast tests without any file system I/O.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{Result, error::Error, ports::TableRepository, q_learning::SavedValueTable};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use castle_warrior::adapters::InMemoryRepository;
/// use castle_warrior::ports::TableRepository;
/// use castle_warrior::q_learning::{QLearningAgent, SavedValueTable};
/// use std::path::Path;
///
/// let repo = InMemoryRepository::new();
/// let agent = QLearningAgent::default();
///
/// repo.save(&SavedValueTable::from_table(agent.q_table()), Path::new("best"))?;
/// let loaded = repo.load(Path::new("best"))?;
/// assert!(loaded.is_empty());
/// # Ok::<(), castle_warrior::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, SavedValueTable>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<String, SavedValueTable>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of tables currently stored.
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Remove all stored tables.
    pub fn clear(&self) {
        self.storage().clear();
    }

    /// Check if a table exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        self.storage().contains_key(&path.to_string_lossy().to_string())
    }
}

impl TableRepository for InMemoryRepository {
    fn save(&self, table: &SavedValueTable, path: &Path) -> Result<()> {
        self.storage()
            .insert(path.to_string_lossy().to_string(), table.clone());
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedValueTable> {
        let key = path.to_string_lossy().to_string();
        self.storage()
            .get(&key)
            .cloned()
            .ok_or(Error::TableNotFound { key })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_save_load_and_share_between_clones() {
        let repo = InMemoryRepository::new();
        let other = repo.clone();
        let table = SavedValueTable {
            version: SavedValueTable::VERSION,
            action_count: 5,
            entries: BTreeMap::from([("T-|G-|W-".to_string(), vec![0.0; 5])]),
        };

        repo.save(&table, Path::new("a")).unwrap();
        assert!(other.contains(Path::new("a")));
        assert_eq!(other.load(Path::new("a")).unwrap(), table);
        assert_eq!(repo.count(), 1);

        other.clear();
        assert!(matches!(
            repo.load(Path::new("a")),
            Err(Error::TableNotFound { .. })
        ));
    }
}
