//! Statement execution against a single connection.
//!
//! Each call is one prepare → bind → step(s) → finalize cycle. Compilation
//! happens separately from execution so the two failure modes stay distinct.
//!
//! Only a single statement is ever run. SQL text that carries a second
//! statement after the first is rejected with [`Error::PrepareFailed`]
//! before anything is stepped.

use std::ffi::{c_char, c_int};
use std::ptr;

use libsqlite3_sys::{SQLITE_OK, sqlite3_finalize, sqlite3_prepare_v2, sqlite3_stmt};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{LockedSqliteHandle, SqliteArguments, SqliteConnection};
use sqlx::{Column, Row, Sqlite, Statement};
use tracing::trace;

use crate::Error;
use crate::builder::SqlStatement;
use crate::decode::to_value;
use crate::value::Value;

/// Column names and positionally aligned rows from a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryRows {
   pub columns: Vec<String>,
   pub rows: Vec<Vec<Value>>,
}

/// Result returned from write operations (e.g. INSERT, UPDATE, DELETE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteQueryResult {
   /// The number of rows affected by the write operation.
   pub rows_affected: u64,
   /// The last inserted row ID (SQLite ROWID).
   ///
   /// Only meaningful after an INSERT into a table with a ROWID; otherwise it
   /// reports whatever the connection last inserted.
   pub last_insert_id: i64,
}

/// Run a statement that returns rows.
///
/// Column names come from the compiled statement, so they are reported even
/// when no rows match.
pub async fn query(conn: &mut SqliteConnection, statement: SqlStatement) -> Result<QueryRows, Error> {
   let SqlStatement { sql, params } = statement;
   trace!(sql = %sql, params = params.len(), "query");

   ensure_single_statement(conn, &sql).await?;

   let prepared = sqlx::Executor::prepare(&mut *conn, sql.as_str())
      .await
      .map_err(|e| prepare_failed(&sql, &e))?;

   let columns: Vec<String> = prepared
      .columns()
      .iter()
      .map(|column| column.name().to_string())
      .collect();

   let mut q = prepared.query();
   for value in params {
      q = bind_value(q, value);
   }

   let fetched = q.fetch_all(&mut *conn).await.map_err(Error::from_step)?;

   let mut rows = Vec::with_capacity(fetched.len());
   for row in fetched {
      let mut values = Vec::with_capacity(columns.len());
      for i in 0..row.columns().len() {
         let raw = row.try_get_raw(i).map_err(Error::from_step)?;
         values.push(to_value(raw)?);
      }
      rows.push(values);
   }

   Ok(QueryRows { columns, rows })
}

/// Run a statement for its effect, reporting rows affected and last insert id.
pub async fn execute(
   conn: &mut SqliteConnection,
   statement: SqlStatement,
) -> Result<WriteQueryResult, Error> {
   let SqlStatement { sql, params } = statement;
   trace!(sql = %sql, params = params.len(), "execute");

   ensure_single_statement(conn, &sql).await?;

   let prepared = sqlx::Executor::prepare(&mut *conn, sql.as_str())
      .await
      .map_err(|e| prepare_failed(&sql, &e))?;

   let mut q = prepared.query();
   for value in params {
      q = bind_value(q, value);
   }

   let result = q.execute(&mut *conn).await.map_err(Error::from_step)?;

   Ok(WriteQueryResult {
      rows_affected: result.rows_affected(),
      last_insert_id: result.last_insert_rowid(),
   })
}

/// Bind a [`Value`] to the next positional parameter of a query.
///
/// Each tag maps to the matching native bind. The placeholder token, should a
/// projected value be sent back in, binds as its text.
pub fn bind_value<'a>(
   query: sqlx::query::Query<'a, Sqlite, SqliteArguments<'a>>,
   value: Value,
) -> sqlx::query::Query<'a, Sqlite, SqliteArguments<'a>> {
   match value {
      Value::Null => query.bind(None::<i64>),
      Value::Integer(i) => query.bind(i),
      Value::Real(f) => query.bind(f),
      Value::Text(s) => query.bind(s),
      Value::Blob(b) => query.bind(b),
      Value::BlobPlaceholder => query.bind(crate::value::BLOB_PLACEHOLDER),
   }
}

/// Reject SQL text holding more than one statement.
///
/// sqlx steps every `;`-separated statement it is handed, so the check runs
/// against the raw handle before sqlx sees the text. When the first statement
/// does not compile the check passes and the regular prepare reports the error.
async fn ensure_single_statement(conn: &mut SqliteConnection, sql: &str) -> Result<(), Error> {
   let trailing = {
      let mut handle = conn
         .lock_handle()
         .await
         .map_err(|e| prepare_failed(sql, &e))?;
      has_trailing_statement(&mut handle, sql)
   };

   if trailing {
      return Err(Error::PrepareFailed {
         sql: sql.to_string(),
         message: "only one SQL statement may be executed at a time".to_string(),
      });
   }

   Ok(())
}

/// True when anything other than whitespace, comments, or empty statements
/// follows the first statement in `sql`.
fn has_trailing_statement(handle: &mut LockedSqliteHandle<'_>, sql: &str) -> bool {
   let db = handle.as_raw_handle().as_ptr();
   let bytes = sql.as_bytes();
   let mut offset = 0;
   let mut first = true;

   while offset < bytes.len() {
      let rest = &bytes[offset..];
      let Ok(len) = c_int::try_from(rest.len()) else {
         return !first;
      };

      let mut stmt: *mut sqlite3_stmt = ptr::null_mut();
      let mut tail: *const c_char = ptr::null();

      // SAFETY: `db` stays valid while `handle` holds the connection lock.
      // `rest` is valid for `len` bytes, and an explicit length lets SQLite
      // read text that is not NUL-terminated. The statement is finalized
      // before the next iteration and `sqlite3_finalize` accepts NULL.
      let rc = unsafe {
         let rc = sqlite3_prepare_v2(db, rest.as_ptr().cast(), len, &mut stmt, &mut tail);
         let compiled = !stmt.is_null();
         sqlite3_finalize(stmt);
         if !first && compiled {
            return true;
         }
         rc
      };

      if rc != SQLITE_OK {
         // The first statement's error belongs to the regular prepare. Any
         // later failure is text past the first statement.
         return !first;
      }

      let consumed = (tail as usize).saturating_sub(rest.as_ptr() as usize);
      if tail.is_null() || consumed == 0 {
         break;
      }
      offset += consumed;
      first = false;
   }

   false
}

fn prepare_failed(sql: &str, err: &sqlx::Error) -> Error {
   Error::PrepareFailed {
      sql: sql.to_string(),
      message: sqlite_rest_conn_mgr::engine_message(err),
   }
}
