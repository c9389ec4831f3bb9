//! ConnectionGuard for exclusive access to the open connection

use sqlx::sqlite::SqliteConnection;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use tokio::sync::MappedMutexGuard;

use crate::connection::OpenConnection;

/// RAII guard for exclusive access to the managed connection
///
/// The guard holds the manager's lock for as long as it lives, so every
/// statement run through it belongs to one indivisible unit of work. Other
/// callers (including `open` and `close`) queue until it is dropped.
///
/// The guard derefs to `SqliteConnection` allowing direct use with sqlx queries.
///
/// # Example
///
/// ```no_run
/// use sqlite_rest_conn_mgr::ConnectionManager;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = ConnectionManager::new(None);
/// manager.open("test.db").await?;
///
/// let mut conn = manager.acquire().await?;
/// sqlx::query("INSERT INTO users (name) VALUES (?)")
///     .bind("Alice")
///     .execute(&mut *conn)
///     .await?;
/// // Lock is released when the guard is dropped
/// # Ok(())
/// # }
/// ```
pub struct ConnectionGuard<'a> {
   open: MappedMutexGuard<'a, OpenConnection>,
}

impl<'a> ConnectionGuard<'a> {
   pub(crate) fn new(open: MappedMutexGuard<'a, OpenConnection>) -> Self {
      Self { open }
   }

   /// Path of the database file this connection was opened on
   pub fn path(&self) -> &Path {
      &self.open.path
   }
}

impl Deref for ConnectionGuard<'_> {
   type Target = SqliteConnection;

   fn deref(&self) -> &Self::Target {
      &self.open.conn
   }
}

impl DerefMut for ConnectionGuard<'_> {
   fn deref_mut(&mut self) -> &mut Self::Target {
      &mut self.open.conn
   }
}

impl std::fmt::Debug for ConnectionGuard<'_> {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("ConnectionGuard")
         .field("path", &self.open.path)
         .finish_non_exhaustive()
   }
}
