use thiserror::Error;

#[derive(Error, Debug)]
pub enum DestinationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Row of table {table} has {found} value(s), schema has {expected} column(s)")]
    SchemaMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("Connection lock poisoned")]
    Poisoned,
}
