use crate::domain::{LoadInfo, TableBatch};
use std::error::Error;

pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Produces the complete, fixed batch of records for one table.
/// Calling `extract` again rebuilds the same batch.
pub trait RecordProvider {
    fn name(&self) -> &str;

    fn extract(&self) -> TableBatch;
}

/// Trait for the storage system receiving loaded tables
/// This is a port (interface) that defines how the core communicates with destination adapters
pub trait Destination: Send + Sync {
    /// Short destination type, e.g. "sqlite"
    fn name(&self) -> &str;

    /// Human readable place where `dataset` is stored
    fn location(&self, dataset: &str) -> String;

    /// Drops whatever `batch.table` held in `dataset` and writes `batch` in its place.
    /// Every row is stamped with `load_id`. Returns the number of rows written.
    fn replace_table(&self, dataset: &str, load_id: &str, batch: &TableBatch) -> Result<usize>;

    /// Appends a completed load to the dataset's load bookkeeping
    fn record_load(&self, dataset: &str, info: &LoadInfo) -> Result<()>;
}
