//! Persisted form of the value table.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    q_learning::{
        q_table::{ActionValues, QTable},
        state_key::StateKey,
    },
    types::ACTION_COUNT,
};

/// Flat key → action-value mapping as written to disk.
///
/// Keys are the canonical string form of [`StateKey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedValueTable {
    pub version: u32,
    pub action_count: usize,
    pub entries: BTreeMap<String, Vec<f64>>,
}

impl SavedValueTable {
    pub const VERSION: u32 = 1;

    pub fn from_table(table: &QTable) -> Self {
        Self {
            version: Self::VERSION,
            action_count: ACTION_COUNT,
            entries: table
                .iter()
                .map(|(key, values)| (key.to_string(), values.to_vec()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate and convert back into table rows.
    pub fn into_rows(self) -> Result<HashMap<StateKey, ActionValues>> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }

        self.entries
            .into_iter()
            .map(|(raw, values)| {
                let values: ActionValues =
                    values
                        .try_into()
                        .map_err(|values: Vec<f64>| Error::ActionRowLength {
                            key: raw.clone(),
                            expected: ACTION_COUNT,
                            got: values.len(),
                        })?;
                let key = raw.parse::<StateKey>()?;
                // Two spellings of one key would collapse into a single row
                if key.to_string() != raw {
                    return Err(Error::InvalidStateKey {
                        reason: format!("not in canonical form, expected {key}"),
                        key: raw,
                    });
                }
                Ok((key, values))
            })
            .collect()
    }
}

/// On-disk encoding of a saved table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    #[default]
    MsgPack,
    Json,
}

impl TableFormat {
    /// `.json` files use JSON, everything else MessagePack.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TableFormat::Json,
            _ => TableFormat::MsgPack,
        }
    }
}

/// Result of trying to restore a saved table.
///
/// Only [`LoadStatus::Loaded`] changes the agent's table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded { entries: usize },
    Missing,
    Corrupt { reason: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Offset};

    #[test]
    fn test_rows_survive_conversion() {
        let mut table = QTable::new(0.2, 0.99);
        let key = StateKey::new(Some(Offset::new(0, 3)), None, vec![Offset::new(1, 0)]);
        table.set(key.clone(), [1.0, -2.5, 0.0, 3.25, 40.0]);
        table.q_learning_update(&key, Action::Up, 1.0, &key, true);

        let saved = SavedValueTable::from_table(&table);
        let bytes = rmp_serde::to_vec(&saved).unwrap();
        let loaded: SavedValueTable = rmp_serde::from_slice(&bytes).unwrap();
        let rows = loaded.into_rows().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows.get(&key), table.get(&key));
    }

    #[test]
    fn test_short_row_rejected() {
        let saved = SavedValueTable {
            version: SavedValueTable::VERSION,
            action_count: ACTION_COUNT,
            entries: BTreeMap::from([("T0,1|G-|W-".to_string(), vec![1.0, 2.0])]),
        };
        assert!(matches!(
            saved.into_rows(),
            Err(Error::ActionRowLength { got: 2, .. })
        ));
    }

    #[test]
    fn test_non_canonical_key_rejected() {
        let saved = SavedValueTable {
            version: SavedValueTable::VERSION,
            action_count: ACTION_COUNT,
            entries: BTreeMap::from([
                ("T0,1|G-|W-1,0;1,0".to_string(), vec![1.0; ACTION_COUNT]),
                ("T0,1|G-|W1,0;-1,0".to_string(), vec![2.0; ACTION_COUNT]),
            ]),
        };
        match saved.into_rows() {
            Err(Error::InvalidStateKey { key, .. }) => assert_eq!(key, "T0,1|G-|W1,0;-1,0"),
            other => panic!("expected InvalidStateKey, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_version_rejected() {
        let saved = SavedValueTable {
            version: 99,
            action_count: ACTION_COUNT,
            entries: BTreeMap::new(),
        };
        assert!(matches!(
            saved.into_rows(),
            Err(Error::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TableFormat::from_path(Path::new("q.json")), TableFormat::Json);
        assert_eq!(TableFormat::from_path(Path::new("q.JSON")), TableFormat::Json);
        assert_eq!(TableFormat::from_path(Path::new("q.msgpack")), TableFormat::MsgPack);
        assert_eq!(TableFormat::from_path(Path::new("q_table")), TableFormat::MsgPack);
    }
}
