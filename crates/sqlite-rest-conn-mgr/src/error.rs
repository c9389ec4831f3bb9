//! Error types for sqlite-rest-conn-mgr

use thiserror::Error;

/// Errors that may occur when opening or accessing the managed connection
#[derive(Error, Debug)]
pub enum Error {
   /// No connection is currently held
   #[error("Database is not open")]
   NotOpen,

   /// SQLite refused to open the file. `message` is the engine's diagnostic text.
   #[error("Failed to open database at {path}: {message}")]
   OpenFailed { path: String, message: String },
}

/// Extract the engine's own diagnostic text from a sqlx error.
///
/// Database errors carry SQLite's message verbatim; anything else (I/O,
/// protocol, encoding) falls back to the sqlx display text.
pub fn engine_message(err: &sqlx::Error) -> String {
   match err {
      sqlx::Error::Database(db_err) => db_err.message().to_string(),
      other => other.to_string(),
   }
}
