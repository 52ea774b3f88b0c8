//! Adapters implementing the table repository port.

pub mod in_memory_repository;
pub mod json_repository;
pub mod msgpack_repository;

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

pub use in_memory_repository::InMemoryRepository;
pub use json_repository::JsonRepository;
pub use msgpack_repository::MsgPackRepository;

use crate::{
    Result,
    error::Error,
    ports::TableRepository,
    q_learning::TableFormat,
};

/// File-backed repository matching the path's extension.
pub fn repository_for(path: &Path) -> Box<dyn TableRepository> {
    match TableFormat::from_path(path) {
        TableFormat::Json => Box::new(JsonRepository::new()),
        TableFormat::MsgPack => Box::new(MsgPackRepository::new()),
    }
}

fn sibling_temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write through a temp file next to `path` and rename it into place, so a
/// failed write never clobbers the existing file.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let temp_path = sibling_temp_path(path);
    let file = File::create(&temp_path).map_err(|source| Error::Io {
        operation: format!("create file {temp_path:?}"),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    let written = write(&mut writer).and_then(|()| {
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush {temp_path:?}"),
            source,
        })
    });
    drop(writer);

    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    fs::rename(&temp_path, path).map_err(|source| Error::Io {
        operation: format!("move {temp_path:?} to {path:?}"),
        source,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("table.json");
        fs::write(&path, "previous").unwrap();

        let result = write_atomically(&path, |_| {
            Err(Error::SerializationContext {
                operation: "write".to_string(),
                message: "boom".to_string(),
            })
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
        assert!(!sibling_temp_path(&path).exists());
    }

    #[test]
    fn test_repository_for_extension() {
        let temp_dir = TempDir::new().unwrap();
        let table = crate::q_learning::SavedValueTable::from_table(
            crate::q_learning::QLearningAgent::default().q_table(),
        );
        for name in ["t.json", "t.msgpack"] {
            let path = temp_dir.path().join(name);
            let repo = repository_for(&path);
            repo.save(&table, &path).unwrap();
            assert_eq!(repo.load(&path).unwrap(), table);
        }
        let json = fs::read_to_string(temp_dir.path().join("t.json")).unwrap();
        assert!(json.contains("\"version\""));
    }
}
