//! MessagePack implementation of the table repository.
//!
//! This adapter implements the TableRepository port using rmp_serde for
//! compact binary serialization.

use std::{fs::File, io::BufReader, path::Path};

use super::write_atomically;
use crate::{Result, error::Error, ports::TableRepository, q_learning::SavedValueTable};

/// MessagePack-based table repository.
///
/// # Examples
///
/// ```no_run
/// use castle_warrior::adapters::MsgPackRepository;
/// use castle_warrior::ports::TableRepository;
/// use castle_warrior::q_learning::{QLearningAgent, SavedValueTable};
/// use std::path::Path;
///
/// let agent = QLearningAgent::default();
/// let repo = MsgPackRepository::new();
/// repo.save(&SavedValueTable::from_table(agent.q_table()), Path::new("q_table.msgpack"))?;
/// let loaded = repo.load(Path::new("q_table.msgpack"))?;
/// # Ok::<(), castle_warrior::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

impl TableRepository for MsgPackRepository {
    fn save(&self, table: &SavedValueTable, path: &Path) -> Result<()> {
        write_atomically(path, |writer| {
            rmp_serde::encode::write(writer, table).map_err(|e| Error::SerializationContext {
                operation: "serialize value table to MessagePack".to_string(),
                message: e.to_string(),
            })
        })
    }

    fn load(&self, path: &Path) -> Result<SavedValueTable> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        rmp_serde::decode::from_read(BufReader::new(file)).map_err(|e| {
            Error::SerializationContext {
                operation: "deserialize value table from MessagePack".to_string(),
                message: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempfile::TempDir;

    use super::*;

    fn sample() -> SavedValueTable {
        SavedValueTable {
            version: SavedValueTable::VERSION,
            action_count: 5,
            entries: BTreeMap::from([
                ("T0,7|G-|W0,2".to_string(), vec![0.1, 0.2, 0.3, 0.4, 0.5]),
                ("T-|G2,2|W-".to_string(), vec![-1.0, 0.0, 1e6, 0.0, -0.5]),
            ]),
        }
    }

    #[test]
    fn test_msgpack_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("q_table.msgpack");

        let repo = MsgPackRepository::new();
        repo.save(&sample(), &file_path).expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");

        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = MsgPackRepository::new();
        let result = repo.load(&temp_dir.path().join("missing.msgpack"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_save_to_invalid_path_returns_error() {
        let repo = MsgPackRepository::new();
        let result = repo.save(&sample(), Path::new("/invalid_dir_12345/file.msgpack"));
        assert!(result.is_err());
    }
}
