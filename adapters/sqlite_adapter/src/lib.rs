mod error;

pub use error::DestinationError;

use ingest_core::domain::{DataType, LoadInfo, TableBatch, Value};
use ingest_core::ports::{Destination, Result};
use ingest_core::utils::{format_iso_date, format_timestamp, is_valid_identifier};
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const LOAD_ID_COLUMN: &str = "_load_id";
const LOADS_TABLE: &str = "_loads";
const LOAD_STATUS_LOADED: i64 = 0;

#[derive(Debug, Clone)]
enum Storage {
    Directory(PathBuf),
    Memory,
}

/// SQLite implementation of the Destination trait.
/// Each dataset lives in its own database, `<dir>/<dataset>.sqlite` on disk.
pub struct SqliteDestination {
    storage: Storage,
    connections: Mutex<HashMap<String, Connection>>,
}

impl SqliteDestination {
    /// Creates a new SqliteDestination storing dataset files under `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_storage(Storage::Directory(dir.into()))
    }

    /// Keeps every dataset in a private in-memory database, dropped with the destination
    pub fn in_memory() -> Self {
        Self::with_storage(Storage::Memory)
    }

    fn with_storage(storage: Storage) -> Self {
        Self {
            storage,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Path of the database file holding `dataset`, if stored on disk
    pub fn dataset_path(&self, dataset: &str) -> Option<PathBuf> {
        match &self.storage {
            Storage::Directory(dir) => Some(dataset_file(dir, dataset)),
            Storage::Memory => None,
        }
    }

    /// Number of rows currently stored in `dataset.table`
    pub fn row_count(&self, dataset: &str, table: &str) -> std::result::Result<u64, DestinationError> {
        let table = quote_identifier(table)?;
        let mut connections = self.lock()?;
        let conn = self.connection(&mut connections, dataset)?;
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Names of the tables in `dataset`, sorted
    pub fn table_names(&self, dataset: &str) -> std::result::Result<Vec<String>, DestinationError> {
        let mut connections = self.lock()?;
        let conn = self.connection(&mut connections, dataset)?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, rusqlite::Error>>()?;
        Ok(names)
    }

    fn lock(&self) -> std::result::Result<MutexGuard<'_, HashMap<String, Connection>>, DestinationError> {
        self.connections.lock().map_err(|_| DestinationError::Poisoned)
    }

    /// Returns the open connection for `dataset`, opening it on first use
    fn connection<'a>(
        &self,
        connections: &'a mut HashMap<String, Connection>,
        dataset: &str,
    ) -> std::result::Result<&'a mut Connection, DestinationError> {
        if !is_valid_identifier(dataset) {
            return Err(DestinationError::InvalidIdentifier(dataset.to_string()));
        }
        match connections.entry(dataset.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let conn = self.open(dataset)?;
                Ok(entry.insert(conn))
            }
        }
    }

    fn open(&self, dataset: &str) -> std::result::Result<Connection, DestinationError> {
        match &self.storage {
            Storage::Directory(dir) => {
                fs::create_dir_all(dir)?;
                let path = dataset_file(dir, dataset);
                debug!("Opening dataset {} at {}", dataset, path.display());
                Ok(Connection::open(path)?)
            }
            Storage::Memory => {
                debug!("Opening in-memory dataset {}", dataset);
                Ok(Connection::open_in_memory()?)
            }
        }
    }

    fn write_batch(
        &self,
        dataset: &str,
        load_id: &str,
        batch: &TableBatch,
    ) -> std::result::Result<usize, DestinationError> {
        let table = quote_identifier(&batch.table)?;
        let width = batch.schema.columns.len();
        if let Some(row) = batch.rows.iter().find(|row| row.len() != width) {
            return Err(DestinationError::SchemaMismatch {
                table: batch.table.clone(),
                expected: width,
                found: row.len(),
            });
        }

        let mut column_defs = Vec::with_capacity(width + 1);
        for column in &batch.schema.columns {
            column_defs.push(format!(
                "{} {} NOT NULL",
                quote_identifier(column.name)?,
                sql_type(column.data_type)
            ));
        }
        column_defs.push(format!("{} TEXT NOT NULL", quote_identifier(LOAD_ID_COLUMN)?));

        let mut column_names = Vec::with_capacity(width + 1);
        for name in batch.schema.column_names() {
            column_names.push(quote_identifier(name)?);
        }
        column_names.push(quote_identifier(LOAD_ID_COLUMN)?);

        let placeholders = vec!["?"; width + 1].join(", ");
        let create = format!("CREATE TABLE {} ({})", table, column_defs.join(", "));
        let insert = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            column_names.join(", "),
            placeholders
        );
        debug!("{}", create);

        let mut connections = self.lock()?;
        let conn = self.connection(&mut connections, dataset)?;
        let tx = conn.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
        tx.execute(&create, [])?;
        {
            let mut stmt = tx.prepare(&insert)?;
            for row in &batch.rows {
                let values = row
                    .iter()
                    .map(to_sql_value)
                    .chain(std::iter::once(SqlValue::Text(load_id.to_string())));
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;
        Ok(batch.rows.len())
    }

    fn append_load(&self, dataset: &str, info: &LoadInfo) -> std::result::Result<(), DestinationError> {
        let table = quote_identifier(LOADS_TABLE)?;
        let mut connections = self.lock()?;
        let conn = self.connection(&mut connections, dataset)?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    load_id TEXT NOT NULL,
                    pipeline_name TEXT NOT NULL,
                    status INTEGER NOT NULL,
                    inserted_at TEXT NOT NULL
                )",
                table
            ),
            [],
        )?;
        conn.execute(
            &format!(
                "INSERT INTO {} (load_id, pipeline_name, status, inserted_at) VALUES (?1, ?2, ?3, ?4)",
                table
            ),
            params![
                info.load_id,
                info.pipeline_name,
                LOAD_STATUS_LOADED,
                format_timestamp(info.finished_at)
            ],
        )?;
        Ok(())
    }
}

impl Destination for SqliteDestination {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn location(&self, dataset: &str) -> String {
        match self.dataset_path(dataset) {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        }
    }

    fn replace_table(&self, dataset: &str, load_id: &str, batch: &TableBatch) -> Result<usize> {
        Ok(self.write_batch(dataset, load_id, batch)?)
    }

    fn record_load(&self, dataset: &str, info: &LoadInfo) -> Result<()> {
        Ok(self.append_load(dataset, info)?)
    }
}

fn dataset_file(dir: &Path, dataset: &str) -> PathBuf {
    dir.join(format!("{}.sqlite", dataset))
}

fn quote_identifier(name: &str) -> std::result::Result<String, DestinationError> {
    if is_valid_identifier(name) {
        Ok(format!("\"{}\"", name))
    } else {
        Err(DestinationError::InvalidIdentifier(name.to_string()))
    }
}

fn sql_type(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Text | DataType::Date => "TEXT",
        DataType::Double => "REAL",
        DataType::BigInt => "INTEGER",
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Double(f) => SqlValue::Real(*f),
        Value::BigInt(i) => SqlValue::Integer(*i),
        Value::Date(d) => SqlValue::Text(format_iso_date(*d)),
    }
}
