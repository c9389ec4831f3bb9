use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use sqlite_rest_conn_mgr::{ConnectionConfig, ConnectionGuard, ConnectionManager};
use sqlite_rest_toolkit::{FieldMap, Pagination, RowFilter, SqlStatement, Value, builder, executor};
use tracing::{debug, warn};

use crate::records::{
   ColumnInfo, DatabaseMetadata, DbInfo, RowPage, SqlExecution, SqlResult, TableEntry,
   TableSchema,
};
use crate::{Error, Result};

/// The operations the REST transport calls, over one managed connection.
///
/// Cloning is cheap and every clone shares the same connection. Each method
/// acquires exclusive use of the connection for its whole duration, so
/// concurrent calls from many tasks run strictly one after another.
///
/// # Example
///
/// ```no_run
/// use sqlite_rest::{DatabaseService, FieldMap, Pagination, RowFilter, Value};
///
/// # async fn example() -> sqlite_rest::Result<()> {
/// let db = DatabaseService::new(None);
/// db.open("shop.db").await?;
///
/// let mut fields = FieldMap::new();
/// fields.insert("name".into(), Value::from("Widget"));
/// let rowid = db.create_row("Product", fields).await?;
///
/// let page = db
///    .list_rows("Product", &Pagination::new(1, 10), &RowFilter::new())
///    .await?;
/// assert!(page.rows.iter().any(|row| row[0] == Value::Integer(rowid)));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DatabaseService {
   manager: Arc<ConnectionManager>,
}

impl DatabaseService {
   /// Create a service with no open database.
   pub fn new(custom_config: Option<ConnectionConfig>) -> Self {
      Self {
         manager: Arc::new(ConnectionManager::new(custom_config)),
      }
   }

   /// Open (creating if needed) the database at `path`, closing any previous one.
   pub async fn open(&self, path: impl AsRef<Path>) -> Result<()> {
      Ok(self.manager.open(path).await?)
   }

   /// Close the database. Does nothing when none is open.
   pub async fn close(&self) {
      self.manager.close().await
   }

   pub async fn is_open(&self) -> bool {
      self.manager.is_open().await
   }

   /// Absolute path of the open database, if any.
   pub async fn path(&self) -> Option<PathBuf> {
      self.manager.path().await
   }

   /// File name, path, size, journal mode and integrity verdict.
   ///
   /// Journal mode is omitted when it cannot be read; a failed integrity check
   /// reports `"error"`. Neither fails the call.
   pub async fn get_db_info(&self) -> Result<DbInfo> {
      let mut conn = self.manager.acquire().await?;
      debug!("get_db_info");

      let path = conn.path().to_path_buf();
      let size_bytes = file_size(&path).await;
      let journal_mode = read_pragma(&mut conn, "journal_mode").await;
      let integrity = integrity_check(&mut conn).await;

      Ok(DbInfo {
         filename: file_name(&path),
         path: path.display().to_string(),
         size_bytes,
         journal_mode,
         integrity,
      })
   }

   /// [`get_db_info`](Self::get_db_info) plus page and engine diagnostics.
   ///
   /// Integer pragmas that cannot be read are reported as 0.
   pub async fn get_database_metadata(&self) -> Result<DatabaseMetadata> {
      let mut conn = self.manager.acquire().await?;
      debug!("get_database_metadata");

      let path = conn.path().to_path_buf();
      let size_bytes = file_size(&path).await;

      let page_size = read_pragma_int(&mut conn, "page_size").await;
      let page_count = read_pragma_int(&mut conn, "page_count").await;
      let freelist_count = read_pragma_int(&mut conn, "freelist_count").await;
      let schema_version = read_pragma_int(&mut conn, "schema_version").await;
      let user_version = read_pragma_int(&mut conn, "user_version").await;
      let auto_vacuum = read_pragma_int(&mut conn, "auto_vacuum").await;
      let synchronous = read_pragma_int(&mut conn, "synchronous").await;

      let sqlite_version = first_text(&mut conn, "SELECT sqlite_version()")
         .await
         .unwrap_or_else(|| "unknown".to_string());
      let encoding = read_pragma(&mut conn, "encoding").await;
      let journal_mode = read_pragma(&mut conn, "journal_mode").await;
      let integrity = integrity_check(&mut conn).await;

      Ok(DatabaseMetadata {
         filename: file_name(&path),
         absolute_path: path.display().to_string(),
         size_bytes,
         estimated_size_bytes: page_size.saturating_mul(page_count),
         page_size,
         page_count,
         freelist_count,
         schema_version,
         user_version,
         auto_vacuum,
         synchronous,
         sqlite_version,
         encoding,
         journal_mode,
         integrity,
      })
   }

   /// Run arbitrary parameterized SQL.
   ///
   /// Statements starting with `SELECT` or `WITH` (ignoring leading whitespace
   /// and case) are run as queries and return columns and rows; anything else
   /// returns rows affected and the last insert id.
   pub async fn execute_sql(&self, sql: &str, params: Vec<Value>) -> Result<SqlExecution> {
      let mut conn = self.manager.acquire().await?;
      debug!(params = params.len(), "execute_sql");

      let statement = SqlStatement::new(sql, params);
      let started = Instant::now();

      let result = if is_query(sql) {
         SqlResult::Query(executor::query(&mut conn, statement).await?)
      } else {
         SqlResult::Execute(executor::execute(&mut conn, statement).await?)
      };

      Ok(SqlExecution {
         result,
         execution_time: started.elapsed(),
      })
   }

   /// Every table and view, ordered by catalog type then name.
   pub async fn get_all_tables(&self) -> Result<Vec<TableEntry>> {
      let mut conn = self.manager.acquire().await?;
      debug!("get_all_tables");

      let listing = executor::query(&mut conn, builder::list_tables()).await?;

      Ok(listing
         .rows
         .into_iter()
         .map(|row| {
            let mut cells = row.into_iter();
            let name = cells.next().and_then(into_text).unwrap_or_default();
            let kind = cells.next().and_then(into_text).unwrap_or_default();
            TableEntry::from_catalog(name, &kind)
         })
         .collect())
   }

   /// Definition and columns of one table or view.
   pub async fn get_table_schema(&self, table: &str) -> Result<TableSchema> {
      let mut conn = self.manager.acquire().await?;
      debug!(table, "get_table_schema");

      let (name, sql) = find_table(&mut conn, table).await?;
      let info = executor::query(&mut conn, builder::table_columns(table)).await?;

      Ok(TableSchema {
         name,
         sql,
         columns: info.rows.iter().map(|row| ColumnInfo::from_row(row)).collect(),
      })
   }

   /// One page of rows plus the total matching the filter.
   pub async fn list_rows(
      &self,
      table: &str,
      page: &Pagination,
      filter: &RowFilter,
   ) -> Result<RowPage> {
      let mut conn = self.manager.acquire().await?;
      debug!(table, page = page.page, per_page = page.per_page, "list_rows");

      find_table(&mut conn, table).await?;

      let count = executor::query(&mut conn, builder::count_rows(table, filter)).await?;
      let total_rows = count
         .rows
         .first()
         .and_then(|row| row.first())
         .and_then(Value::as_i64)
         .unwrap_or(0);

      let listing = executor::query(&mut conn, builder::select_rows(table, filter, page)).await?;

      Ok(RowPage {
         columns: listing.columns,
         rows: listing.rows,
         total_rows,
      })
   }

   /// Insert a row and return its `rowid`.
   ///
   /// An empty field map produces invalid SQL and fails with `PrepareFailed`;
   /// callers are expected to reject it before getting here.
   pub async fn create_row(&self, table: &str, fields: FieldMap) -> Result<i64> {
      let mut conn = self.manager.acquire().await?;
      debug!(table, fields = fields.len(), "create_row");

      find_table(&mut conn, table).await?;
      let result = executor::execute(&mut conn, builder::insert_row(table, &fields)).await?;

      Ok(result.last_insert_id)
   }

   /// Update the row with `rowid`, returning rows affected.
   ///
   /// A missing row is not an error: it reports 0. So does an empty field map,
   /// without running any statement.
   pub async fn update_row(&self, table: &str, rowid: i64, fields: FieldMap) -> Result<u64> {
      let mut conn = self.manager.acquire().await?;
      debug!(table, rowid, fields = fields.len(), "update_row");

      find_table(&mut conn, table).await?;

      let Some(statement) = builder::update_row(table, rowid, &fields) else {
         return Ok(0);
      };
      Ok(executor::execute(&mut conn, statement).await?.rows_affected)
   }

   /// Delete the row with `rowid`, returning rows affected (0 if already gone).
   pub async fn delete_row(&self, table: &str, rowid: i64) -> Result<u64> {
      let mut conn = self.manager.acquire().await?;
      debug!(table, rowid, "delete_row");

      find_table(&mut conn, table).await?;
      let result = executor::execute(&mut conn, builder::delete_row(table, rowid)).await?;

      Ok(result.rows_affected)
   }
}

impl std::fmt::Debug for DatabaseService {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("DatabaseService")
         .field("manager", &self.manager)
         .finish()
   }
}

/// True when the statement should be run as a query.
fn is_query(sql: &str) -> bool {
   let head = sql.trim_start().to_ascii_uppercase();
   head.starts_with("SELECT") || head.starts_with("WITH")
}

/// Catalog name and `CREATE` text of `table`, or [`Error::InvalidTable`].
async fn find_table(conn: &mut ConnectionGuard<'_>, table: &str) -> Result<(String, String)> {
   let found = executor::query(conn, builder::find_table(table)).await?;

   let mut cells = found.rows.into_iter().next().unwrap_or_default().into_iter();
   match (cells.next().and_then(into_text), cells.next().and_then(into_text)) {
      (Some(name), Some(sql)) => Ok((name, sql)),
      _ => Err(Error::InvalidTable {
         name: table.to_string(),
      }),
   }
}

/// First column of the first row, as text. `None` on failure or no rows.
async fn first_text(conn: &mut ConnectionGuard<'_>, sql: &str) -> Option<String> {
   match executor::query(conn, SqlStatement::new(sql, vec![])).await {
      Ok(result) => result
         .rows
         .first()
         .and_then(|row| row.first())
         .and_then(Value::to_text),
      Err(e) => {
         warn!("{} failed: {}", sql, e);
         None
      }
   }
}

async fn read_pragma(conn: &mut ConnectionGuard<'_>, name: &str) -> Option<String> {
   first_text(conn, &format!("PRAGMA {}", name)).await
}

async fn read_pragma_int(conn: &mut ConnectionGuard<'_>, name: &str) -> i64 {
   read_pragma(conn, name)
      .await
      .and_then(|value| value.parse().ok())
      .unwrap_or(0)
}

async fn integrity_check(conn: &mut ConnectionGuard<'_>) -> String {
   first_text(conn, "PRAGMA integrity_check")
      .await
      .unwrap_or_else(|| "error".to_string())
}

fn into_text(value: Value) -> Option<String> {
   match value {
      Value::Text(s) => Some(s),
      _ => None,
   }
}

fn file_name(path: &Path) -> String {
   path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| path.display().to_string())
}

async fn file_size(path: &Path) -> u64 {
   tokio::fs::metadata(path)
      .await
      .map(|meta| meta.len())
      .unwrap_or(0)
}
