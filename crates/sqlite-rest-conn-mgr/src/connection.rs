//! Single SQLite connection with a strict one-at-a-time access discipline

use crate::Result;
use crate::config::ConnectionConfig;
use crate::error::{Error, engine_message};
use crate::guard::ConnectionGuard;
use sqlx::sqlite::SqliteConnection;
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// The connection currently held by a [`ConnectionManager`].
pub(crate) struct OpenConnection {
   pub(crate) conn: SqliteConnection,
   pub(crate) path: PathBuf,
}

/// Owner of at most one SQLite connection.
///
/// All access goes through a single FIFO async mutex: `open`, `close`,
/// `is_open`, and every guard handed out by `acquire()` are admitted one at a
/// time, so no two units of work ever interleave on the handle. A slow
/// statement therefore blocks every queued caller until it finishes.
///
/// Lifecycle: `new → [open → …acquire… → close]* → drop`. Dropping the
/// manager drops the connection, which closes the native handle.
///
/// # Example
///
/// ```no_run
/// use sqlite_rest_conn_mgr::ConnectionManager;
///
/// # async fn example() -> Result<(), sqlite_rest_conn_mgr::Error> {
/// let manager = ConnectionManager::new(None);
/// manager.open("test.db").await?;
/// assert!(manager.is_open().await);
///
/// // Re-opening replaces the previous connection
/// manager.open("other.db").await?;
///
/// manager.close().await;
/// manager.close().await; // no-op
/// # Ok(())
/// # }
/// ```
pub struct ConnectionManager {
   /// The open connection, if any. Every operation locks this slot.
   slot: Mutex<Option<OpenConnection>>,

   /// Options applied on every open
   config: ConnectionConfig,
}

impl ConnectionManager {
   /// Create a manager with no open connection.
   ///
   /// Pass `None` to use [`ConnectionConfig::default()`].
   pub fn new(custom_config: Option<ConnectionConfig>) -> Self {
      Self {
         slot: Mutex::new(None),
         config: custom_config.unwrap_or_default(),
      }
   }

   /// Open the database at `path` in read-write mode, creating the file if missing.
   ///
   /// Any connection already held is closed first, even if the new open then
   /// fails; after a failed open the manager holds no connection.
   ///
   /// `:memory:` opens a private in-memory database. A `file:` URI is handed
   /// to SQLite untouched, so its query parameters (`mode`, `cache`, ...)
   /// apply.
   pub async fn open(&self, path: impl AsRef<Path>) -> Result<()> {
      let path = path.as_ref();
      let mut slot = self.slot.lock().await;

      if let Some(previous) = slot.take() {
         debug!("Closing {} before re-open", previous.path.display());
         close_connection(previous).await;
      }

      if path.as_os_str().is_empty() {
         return Err(Error::OpenFailed {
            path: String::new(),
            message: "database path cannot be empty".to_string(),
         });
      }

      let open_failed = |err: sqlx::Error| Error::OpenFailed {
         path: path.display().to_string(),
         message: engine_message(&err),
      };

      let conn = self
         .config
         .connect_options(path)
         .map_err(open_failed)?
         .connect()
         .await
         .map_err(open_failed)?;

      let path = resolve_path(path);
      info!("Opened database {}", path.display());

      *slot = Some(OpenConnection { conn, path });
      Ok(())
   }

   /// Close the current connection.
   ///
   /// Idempotent: closing when nothing is open does nothing. A failure reported
   /// by SQLite while closing is logged; the handle is released regardless.
   pub async fn close(&self) {
      let mut slot = self.slot.lock().await;
      if let Some(open) = slot.take() {
         close_connection(open).await;
      }
   }

   /// Whether a connection is currently held.
   pub async fn is_open(&self) -> bool {
      self.slot.lock().await.is_some()
   }

   /// Path of the open database, if any.
   pub async fn path(&self) -> Option<PathBuf> {
      self.slot.lock().await.as_ref().map(|open| open.path.clone())
   }

   /// Acquire exclusive access to the open connection.
   ///
   /// Waits (in arrival order) for any in-flight unit of work to finish.
   /// Returns [`Error::NotOpen`] when no connection is held.
   pub async fn acquire(&self) -> Result<ConnectionGuard<'_>> {
      let slot = self.slot.lock().await;
      let open = MutexGuard::try_map(slot, |slot| slot.as_mut()).map_err(|_| Error::NotOpen)?;
      Ok(ConnectionGuard::new(open))
   }
}

impl std::fmt::Debug for ConnectionManager {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("ConnectionManager")
         .field("config", &self.config)
         .finish_non_exhaustive()
   }
}

/// True for the `:memory:` shorthand, which opens a private in-memory database.
///
/// `file::memory:` and other URIs are not included: they carry their own
/// parameters and are opened as given.
pub fn is_memory_database(path: &Path) -> bool {
   path.as_os_str() == ":memory:"
}

/// True for SQLite URI filenames (`file:...`).
pub(crate) fn is_uri_filename(path: &Path) -> bool {
   path.to_string_lossy().starts_with("file:")
}

async fn close_connection(open: OpenConnection) {
   let OpenConnection { conn, path } = open;
   match conn.close().await {
      Ok(()) => info!("Closed database {}", path.display()),
      Err(e) => warn!("Error closing database {}: {}", path.display(), e),
   }
}

fn resolve_path(path: &Path) -> PathBuf {
   if is_memory_database(path) || is_uri_filename(path) {
      return path.to_path_buf();
   }
   std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_is_memory_database() {
      assert!(is_memory_database(Path::new(":memory:")));
      assert!(!is_memory_database(Path::new("file::memory:?cache=shared")));
      assert!(!is_memory_database(Path::new("memory.db")));
      assert!(!is_memory_database(Path::new("/tmp/:memory:/x.db")));
   }

   #[test]
   fn test_resolve_path_is_absolute() {
      assert!(resolve_path(Path::new("relative.db")).is_absolute());
      assert_eq!(resolve_path(Path::new(":memory:")), Path::new(":memory:"));

      let uri = Path::new("file::memory:?cache=shared");
      assert!(is_uri_filename(uri));
      assert_eq!(resolve_path(uri), uri);
   }

   #[tokio::test]
   async fn test_acquire_before_open() {
      let manager = ConnectionManager::new(None);
      assert!(!manager.is_open().await);
      assert!(matches!(manager.acquire().await.unwrap_err(), Error::NotOpen));
   }

   #[tokio::test]
   async fn test_memory_open_and_close() {
      let manager = ConnectionManager::new(None);
      manager.open(":memory:").await.unwrap();
      assert!(manager.is_open().await);
      assert_eq!(manager.path().await.as_deref(), Some(Path::new(":memory:")));

      manager.close().await;
      assert!(!manager.is_open().await);
      assert_eq!(manager.path().await, None);
   }

   #[tokio::test]
   async fn test_shared_cache_uri_keeps_its_parameters() {
      let uri = "file:shared_uri_test?mode=memory&cache=shared";

      let first = ConnectionManager::new(None);
      first.open(uri).await.unwrap();
      assert_eq!(first.path().await.as_deref(), Some(Path::new(uri)));

      {
         let mut conn = first.acquire().await.unwrap();
         sqlx::query("CREATE TABLE shared_items (x INTEGER)")
            .execute(&mut *conn)
            .await
            .unwrap();
      }

      // A second connection to the same shared-cache URI sees the table,
      // which only holds when `cache=shared` reached SQLite.
      let second = ConnectionManager::new(None);
      second.open(uri).await.unwrap();
      let mut conn = second.acquire().await.unwrap();
      let (count,): (i64,) = sqlx::query_as(
         "SELECT COUNT(*) FROM sqlite_master WHERE name = 'shared_items'",
      )
      .fetch_one(&mut *conn)
      .await
      .unwrap();
      assert_eq!(count, 1);
   }
}
