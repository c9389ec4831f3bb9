//! # sqlite-rest-conn-mgr
//!
//! Owns exactly one SQLite connection and admits work to it one unit at a time.
//!
//! ## Core Types
//!
//! - **[`ConnectionManager`]**: Holds the optional open connection behind a fair async mutex
//! - **[`ConnectionConfig`]**: Connection options applied on every `open`
//! - **[`ConnectionGuard`]**: RAII guard granting exclusive use of the open connection
//! - **[`Error`]**: Error type for open/access failures
//!
//! ## Architecture
//!
//! - **Single handle**: At most one connection exists; `open` closes the previous one first
//! - **Strict serialization**: Reads, writes, `open` and `close` all queue on the same lock
//! - **No hidden globals**: The manager is an ordinary value owned by its caller
//!
//! ## Usage
//!
//! ```no_run
//! use sqlite_rest_conn_mgr::ConnectionManager;
//!
//! #[tokio::main]
//! async fn main() -> sqlite_rest_conn_mgr::Result<()> {
//!     let manager = ConnectionManager::new(None);
//!     manager.open("example.db").await?;
//!
//!     // The guard holds the connection until it is dropped
//!     let mut conn = manager.acquire().await?;
//!     sqlx::query("CREATE TABLE IF NOT EXISTS users (name TEXT)")
//!         .execute(&mut *conn)
//!         .await
//!         .ok();
//!     drop(conn);
//!
//!     manager.close().await;
//!     Ok(())
//! }
//! ```
//!
mod config;
mod connection;
mod error;
mod guard;

// Re-export public types
pub use config::ConnectionConfig;
pub use connection::{ConnectionManager, is_memory_database};
pub use error::{Error, engine_message};
pub use guard::ConnectionGuard;

/// A type alias for Results with our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
