use serde::{Serialize, Serializer};

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured error response for the transport layer.
#[derive(Serialize)]
struct ErrorResponse {
   code: String,
   message: String,
}

/// Every failure a service operation can report.
///
/// The variants are kept distinct so the transport can map each to its own
/// response status (e.g. `NotOpen` to 503, `InvalidTable` to 404).
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// An operation was attempted with no open database.
   #[error("database not open")]
   NotOpen,

   /// The database file could not be opened.
   #[error("failed to open database at {path}: {message}")]
   OpenFailed { path: String, message: String },

   /// The named table or view does not exist.
   #[error("table {name} does not exist")]
   InvalidTable { name: String },

   /// The row does not exist.
   ///
   /// Not currently raised: update and delete of a missing row report zero
   /// rows affected instead.
   #[error("row {rowid} does not exist in {table}")]
   InvalidRowid { table: String, rowid: i64 },

   /// The statement could not be compiled.
   #[error("failed to prepare `{sql}`: {message}")]
   PrepareFailed { sql: String, message: String },

   /// The statement failed while running.
   #[error("statement failed: {message}")]
   StepFailed { message: String },

   /// A parameter could not be bound.
   #[error("failed to bind parameter: {message}")]
   BindFailed { message: String },

   /// SQLite type that cannot be mapped to a value.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for transport error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::NotOpen => "DB_NOT_OPEN".to_string(),
         Error::OpenFailed { .. } => "OPEN_FAILED".to_string(),
         Error::InvalidTable { .. } => "INVALID_TABLE".to_string(),
         Error::InvalidRowid { .. } => "INVALID_ROWID".to_string(),
         Error::PrepareFailed { .. } => "PREPARE_FAILED".to_string(),
         Error::StepFailed { .. } => "STEP_FAILED".to_string(),
         Error::BindFailed { .. } => "BIND_FAILED".to_string(),
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
      }
   }
}

impl From<sqlite_rest_conn_mgr::Error> for Error {
   fn from(err: sqlite_rest_conn_mgr::Error) -> Self {
      match err {
         sqlite_rest_conn_mgr::Error::NotOpen => Error::NotOpen,
         sqlite_rest_conn_mgr::Error::OpenFailed { path, message } => {
            Error::OpenFailed { path, message }
         }
      }
   }
}

impl From<sqlite_rest_toolkit::Error> for Error {
   fn from(err: sqlite_rest_toolkit::Error) -> Self {
      use sqlite_rest_toolkit::Error as Toolkit;

      match err {
         Toolkit::PrepareFailed { sql, message } => Error::PrepareFailed { sql, message },
         Toolkit::StepFailed { message } => Error::StepFailed { message },
         Toolkit::BindFailed { message } => Error::BindFailed { message },
         Toolkit::UnsupportedDatatype(name) => Error::UnsupportedDatatype(name),
      }
   }
}

impl Serialize for Error {
   fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
   where
      S: Serializer,
   {
      let response = ErrorResponse {
         code: self.error_code(),
         message: self.to_string(),
      };
      response.serialize(serializer)
   }
}
