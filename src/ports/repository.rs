//! Repository port for value-table persistence.

use std::path::Path;

use crate::{Result, q_learning::SavedValueTable};

/// Port for persisting and loading value tables.
///
/// Implementations must round-trip exactly: the same keys with the same vectors.
///
/// # Examples
///
/// ```no_run
/// use castle_warrior::{adapters::MsgPackRepository, ports::TableRepository, q_learning::SavedValueTable};
/// use std::path::Path;
///
/// fn copy_table<R: TableRepository>(repo: &R, from: &Path, to: &Path) -> castle_warrior::Result<()> {
///     let table: SavedValueTable = repo.load(from)?;
///     repo.save(&table, to)
/// }
/// ```
pub trait TableRepository {
    /// Save a table. On failure the previously stored table must stay intact.
    fn save(&self, table: &SavedValueTable, path: &Path) -> Result<()>;

    /// Load a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table does not exist or cannot be decoded.
    fn load(&self, path: &Path) -> Result<SavedValueTable>;
}
