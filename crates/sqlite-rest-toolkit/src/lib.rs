//! Query translation and execution for exposing SQLite tables as REST resources.
//!
//! This crate sits between the connection manager (`sqlite-rest-conn-mgr`)
//! and the database service façade. It provides:
//!
//! - [`Value`]: the SQL/JSON value domain and its coercion rules
//! - [`sanitize`]: the identifier allow-list applied to every table and column name
//! - [`builder`]: parameterized SQL for count/list/insert/update/delete and catalog lookups
//! - [`Pagination`] and [`RowFilter`]: listing parameters
//! - [`executor`]: prepare/bind/step against one connection, decoding rows into [`Value`]s
//!
//! # Example
//!
//! ```no_run
//! use sqlite_rest_toolkit::{ConnectionManager, RowFilter, Pagination, builder, executor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConnectionManager::new(None);
//! manager.open("mydb.db").await?;
//!
//! let mut conn = manager.acquire().await?;
//! let filter = RowFilter::new().eq("name", "Widget");
//! let page = executor::query(
//!    &mut conn,
//!    builder::select_rows("Product", &filter, &Pagination::default()),
//! )
//! .await?;
//!
//! println!("{:?}", page.columns);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod decode;
pub mod error;
pub mod executor;
pub mod identifier;
pub mod pagination;
pub mod value;

pub use builder::{RESERVED_PREFIX, RowFilter, SqlStatement};
pub use error::{Error, Result};
pub use executor::{QueryRows, WriteQueryResult, bind_value};
pub use identifier::sanitize;
pub use pagination::{DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_PER_PAGE, Pagination, SortOrder};
pub use value::{BLOB_PLACEHOLDER, BLOB_PLACEHOLDER_THRESHOLD, FieldMap, Value};

// Re-export commonly used types from dependencies
pub use sqlite_rest_conn_mgr::{ConnectionConfig, ConnectionGuard, ConnectionManager};
