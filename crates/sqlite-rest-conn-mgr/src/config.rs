//! Configuration for the managed SQLite connection

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteConnectOptions;

use crate::connection::is_memory_database;

/// Configuration applied every time the [`ConnectionManager`] opens a file
///
/// # Examples
///
/// ```
/// use sqlite_rest_conn_mgr::ConnectionConfig;
///
/// // Use defaults
/// let config = ConnectionConfig::default();
///
/// // Override just one field
/// let config = ConnectionConfig {
///     busy_timeout_secs: 1,
///     ..Default::default()
/// };
/// ```
///
/// [`ConnectionManager`]: crate::ConnectionManager
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
   /// How long SQLite waits on a file locked by another process before
   /// reporting `SQLITE_BUSY` (in seconds)
   ///
   /// Default: 5
   pub busy_timeout_secs: u64,

   /// Maximum number of prepared statements kept cached on the connection
   ///
   /// Default: 100
   pub statement_cache_capacity: usize,
}

impl Default for ConnectionConfig {
   fn default() -> Self {
      Self {
         busy_timeout_secs: 5,
         statement_cache_capacity: 100,
      }
   }
}

impl ConnectionConfig {
   /// Build read-write connect options for `path`, creating the file if absent.
   ///
   /// Anything but `:memory:` is passed through as the filename. SQLite opens
   /// it with URI parsing enabled, so a `file:` URI keeps its parameters.
   pub(crate) fn connect_options(&self, path: &Path) -> Result<SqliteConnectOptions, sqlx::Error> {
      let options = if is_memory_database(path) {
         SqliteConnectOptions::from_str("sqlite::memory:")?
      } else {
         SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
      };

      Ok(options
         .read_only(false)
         .busy_timeout(Duration::from_secs(self.busy_timeout_secs))
         .statement_cache_capacity(self.statement_cache_capacity))
   }
}
