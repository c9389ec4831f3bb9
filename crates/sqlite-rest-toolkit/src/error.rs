/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while compiling, binding, or running a statement.
///
/// Each variant carries SQLite's own diagnostic text verbatim.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// The statement could not be compiled.
   #[error("failed to prepare `{sql}`: {message}")]
   PrepareFailed { sql: String, message: String },

   /// The statement compiled but failed while running.
   #[error("statement failed: {message}")]
   StepFailed { message: String },

   /// A parameter could not be bound to the statement.
   #[error("failed to bind parameter: {message}")]
   BindFailed { message: String },

   /// SQLite type that cannot be mapped to a [`Value`](crate::Value).
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::PrepareFailed { .. } => "PREPARE_FAILED".to_string(),
         Error::StepFailed { .. } => "STEP_FAILED".to_string(),
         Error::BindFailed { .. } => "BIND_FAILED".to_string(),
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
      }
   }

   /// Classify a failure reported after the statement was prepared.
   pub(crate) fn from_step(err: sqlx::Error) -> Self {
      let message = sqlite_rest_conn_mgr::engine_message(&err);
      match err {
         sqlx::Error::Encode(_) => Error::BindFailed { message },
         _ => Error::StepFailed { message },
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_error_code_prepare_failed() {
      let err = Error::PrepareFailed {
         sql: "SELEC 1".into(),
         message: "near \"SELEC\": syntax error".into(),
      };
      assert_eq!(err.error_code(), "PREPARE_FAILED");
      assert!(err.to_string().contains("SELEC 1"));
      assert!(err.to_string().contains("syntax error"));
   }

   #[test]
   fn test_error_code_step_failed() {
      let err = Error::StepFailed {
         message: "UNIQUE constraint failed: t.id".into(),
      };
      assert_eq!(err.error_code(), "STEP_FAILED");
      assert!(err.to_string().contains("UNIQUE constraint failed"));
   }

   #[test]
   fn test_error_code_bind_failed() {
      let err = Error::BindFailed { message: "bad".into() };
      assert_eq!(err.error_code(), "BIND_FAILED");
   }

   #[test]
   fn test_error_code_unsupported_datatype() {
      let err = Error::UnsupportedDatatype("WEIRD".into());
      assert_eq!(err.error_code(), "UNSUPPORTED_DATATYPE");
   }

   #[test]
   fn test_from_step_non_database() {
      let err = Error::from_step(sqlx::Error::RowNotFound);
      assert!(matches!(err, Error::StepFailed { .. }));
   }

   #[test]
   fn test_from_step_encode() {
      let err = Error::from_step(sqlx::Error::Encode("not encodable".into()));
      assert!(matches!(err, Error::BindFailed { .. }));
   }
}
