//! JSON implementation of the table repository, for tables meant to be read by people.

use std::{fs::File, io::BufReader, path::Path};

use super::write_atomically;
use crate::{Result, error::Error, ports::TableRepository, q_learning::SavedValueTable};

/// Pretty-printed JSON table repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRepository;

impl JsonRepository {
    pub fn new() -> Self {
        Self
    }
}

impl TableRepository for JsonRepository {
    fn save(&self, table: &SavedValueTable, path: &Path) -> Result<()> {
        write_atomically(path, |writer| {
            serde_json::to_writer_pretty(writer, table)?;
            Ok(())
        })
    }

    fn load(&self, path: &Path) -> Result<SavedValueTable> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::{Rng, SeedableRng, rngs::StdRng};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("q_table.json");
        let table = SavedValueTable {
            version: SavedValueTable::VERSION,
            action_count: 5,
            entries: BTreeMap::from([(
                "T1,0|G-|W-1,-1".to_string(),
                vec![0.5, 0.25, 0.0, -3.0, 2.0],
            )]),
        };

        let repo = JsonRepository::new();
        repo.save(&table, &path).unwrap();
        assert_eq!(repo.load(&path).unwrap(), table);
    }

    #[test]
    fn test_floats_keep_every_bit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("q_table.json");
        let mut rng = StdRng::seed_from_u64(7);
        let mut entries: BTreeMap<String, Vec<f64>> = (0..2000)
            .map(|i| {
                let values = (0..5).map(|_| rng.random_range(-200.0..4800.0)).collect();
                (format!("T{i},{i}|G-|W-"), values)
            })
            .collect();
        entries.insert(
            "T0,0|G-|W-".to_string(),
            vec![447.60121758220396, 0.1, 1e-300, 5000.000000000001, f64::MAX],
        );
        let table = SavedValueTable {
            version: SavedValueTable::VERSION,
            action_count: 5,
            entries,
        };

        let repo = JsonRepository::new();
        repo.save(&table, &path).unwrap();
        let loaded = repo.load(&path).unwrap();
        for (key, values) in &table.entries {
            let bits: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
            let loaded_bits: Vec<u64> = loaded.entries[key].iter().map(|v| v.to_bits()).collect();
            assert_eq!(bits, loaded_bits, "row {key}");
        }
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("q_table.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = JsonRepository::new().load(&path);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
