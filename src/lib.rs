//! # sqlite-rest
//!
//! Exposes one SQLite database file as a REST resource collection: tables
//! become endpoints, rows become resources, and raw parameterized SQL is
//! available as an escape hatch.
//!
//! This crate is the layer between an HTTP transport and the database. The
//! transport parses requests and renders responses; [`DatabaseService`]
//! turns the parsed parameters into safe SQL, runs it on the single managed
//! connection, and hands back plain serializable records or an [`Error`]
//! whose [`error_code`](Error::error_code) the transport maps to a status.
//!
//! ## Workspace
//!
//! - `sqlite-rest-conn-mgr`: owns the connection and serializes access to it
//! - `sqlite-rest-toolkit`: identifier sanitizing, SQL builders, execution and value decoding
//! - this crate: the service façade, result records, and query-string decoding

mod error;
mod params;
mod records;
mod service;

pub use error::{Error, Result};
pub use params::RowQuery;
pub use records::{
   ColumnInfo, DatabaseMetadata, DbInfo, RowPage, SqlExecution, SqlResult, TableEntry, TableKind,
   TableSchema,
};
pub use service::DatabaseService;

// Re-export commonly used types from the member crates
pub use sqlite_rest_conn_mgr::ConnectionConfig;
pub use sqlite_rest_toolkit::{
   FieldMap, Pagination, QueryRows, RowFilter, SortOrder, Value, WriteQueryResult, sanitize,
};
