//! Plain result records returned by [`DatabaseService`](crate::DatabaseService).
//!
//! All of them serialize with camelCase field names, ready for the transport's
//! success envelope.

use std::time::Duration;

use serde::Serialize;
use sqlite_rest_toolkit::{QueryRows, RESERVED_PREFIX, Value, WriteQueryResult};

/// Summary of the open database file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInfo {
   pub filename: String,
   /// Absolute path of the database file, or `:memory:`
   pub path: String,
   /// On-disk size; 0 when the file cannot be inspected
   pub size_bytes: u64,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub journal_mode: Option<String>,
   /// First line of `PRAGMA integrity_check` (`"ok"` when healthy), or `"error"`
   pub integrity: String,
}

/// Everything in [`DbInfo`] plus page-level and engine diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseMetadata {
   pub filename: String,
   pub absolute_path: String,
   pub size_bytes: u64,
   /// `page_size * page_count`
   pub estimated_size_bytes: i64,
   pub page_size: i64,
   pub page_count: i64,
   pub freelist_count: i64,
   pub schema_version: i64,
   pub user_version: i64,
   pub auto_vacuum: i64,
   pub synchronous: i64,
   pub sqlite_version: String,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub encoding: Option<String>,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub journal_mode: Option<String>,
   pub integrity: String,
}

/// Catalog kind reported by [`DatabaseService::get_all_tables`](crate::DatabaseService::get_all_tables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
   Table,
   View,
   /// Any object whose name starts with the reserved `sqlite_` prefix
   System,
}

/// One entry of the table listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
   pub name: String,
   #[serde(rename = "type")]
   pub kind: TableKind,
}

impl TableEntry {
   pub(crate) fn from_catalog(name: String, catalog_type: &str) -> Self {
      let kind = if name.starts_with(RESERVED_PREFIX) {
         TableKind::System
      } else if catalog_type.eq_ignore_ascii_case("view") {
         TableKind::View
      } else {
         TableKind::Table
      };
      Self { name, kind }
   }
}

/// Column description from `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
   /// 0-based column index
   pub position: i64,
   pub name: String,
   /// Declared type as written in the DDL; empty when none was given
   pub declared_type: String,
   pub is_primary_key: bool,
   pub not_null: bool,
}

impl ColumnInfo {
   /// Build from one `table_info` row: `cid, name, type, notnull, dflt_value, pk`.
   pub(crate) fn from_row(row: &[Value]) -> Self {
      let int_at = |i: usize| row.get(i).and_then(Value::as_i64).unwrap_or(0);
      let text_at = |i: usize| {
         row.get(i)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
      };

      Self {
         position: int_at(0),
         name: text_at(1),
         declared_type: text_at(2),
         not_null: int_at(3) != 0,
         // pk is the 1-based position within the primary key, 0 otherwise
         is_primary_key: int_at(5) != 0,
      }
   }
}

/// Definition of a table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
   pub name: String,
   /// The `CREATE` statement stored in the catalog
   pub sql: String,
   pub columns: Vec<ColumnInfo>,
}

/// One page of a row listing. `rowid` is always the first column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowPage {
   pub columns: Vec<String>,
   pub rows: Vec<Vec<Value>>,
   /// Rows matching the filters across all pages
   pub total_rows: i64,
}

/// Outcome of a raw SQL statement, tagged by how it was classified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SqlResult {
   Query(QueryRows),
   Execute(WriteQueryResult),
}

/// A [`SqlResult`] plus how long the statement took.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlExecution {
   #[serde(flatten)]
   pub result: SqlResult,
   /// Wall-clock time spent in the engine, excluding the wait for the connection
   #[serde(serialize_with = "serialize_seconds")]
   pub execution_time: Duration,
}

fn serialize_seconds<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
   S: serde::Serializer,
{
   serializer.serialize_f64(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   #[test]
   fn test_system_prefix_overrides_catalog_type() {
      let entry = TableEntry::from_catalog("sqlite_sequence".into(), "table");
      assert_eq!(entry.kind, TableKind::System);

      let entry = TableEntry::from_catalog("sqlite_stat_view".into(), "view");
      assert_eq!(entry.kind, TableKind::System);

      assert_eq!(
         TableEntry::from_catalog("active".into(), "view").kind,
         TableKind::View
      );
      assert_eq!(
         TableEntry::from_catalog("Product".into(), "table").kind,
         TableKind::Table
      );
   }

   #[test]
   fn test_table_entry_serializes_type() {
      let entry = TableEntry::from_catalog("sqlite_sequence".into(), "table");
      assert_eq!(
         serde_json::to_value(&entry).unwrap(),
         json!({"name": "sqlite_sequence", "type": "system"})
      );
   }

   #[test]
   fn test_column_info_from_row() {
      let row = vec![
         Value::Integer(0),
         Value::Text("id".into()),
         Value::Text("INTEGER".into()),
         Value::Integer(1),
         Value::Null,
         Value::Integer(1),
      ];
      let col = ColumnInfo::from_row(&row);
      assert_eq!(col.position, 0);
      assert_eq!(col.name, "id");
      assert_eq!(col.declared_type, "INTEGER");
      assert!(col.not_null);
      assert!(col.is_primary_key);

      // untyped column, short row
      let col = ColumnInfo::from_row(&[Value::Integer(2), Value::Text("x".into())]);
      assert_eq!(col.declared_type, "");
      assert!(!col.not_null && !col.is_primary_key);
   }

   #[test]
   fn test_sql_execution_serializes_flat() {
      let exec = SqlExecution {
         result: SqlResult::Execute(WriteQueryResult {
            rows_affected: 2,
            last_insert_id: 7,
         }),
         execution_time: Duration::from_millis(1500),
      };
      assert_eq!(
         serde_json::to_value(&exec).unwrap(),
         json!({
            "type": "execute",
            "rowsAffected": 2,
            "lastInsertId": 7,
            "executionTime": 1.5
         })
      );

      let exec = SqlExecution {
         result: SqlResult::Query(QueryRows {
            columns: vec!["1".into()],
            rows: vec![vec![Value::Integer(1)]],
         }),
         execution_time: Duration::ZERO,
      };
      let json = serde_json::to_value(&exec).unwrap();
      assert_eq!(json["type"], "query");
      assert_eq!(json["columns"], json!(["1"]));
      assert_eq!(json["rows"], json!([[1]]));
   }

   #[test]
   fn test_info_omits_missing_journal_mode() {
      let info = DbInfo {
         filename: "app.db".into(),
         path: "/data/app.db".into(),
         size_bytes: 4096,
         journal_mode: None,
         integrity: "ok".into(),
      };
      let json = serde_json::to_value(&info).unwrap();
      assert!(json.get("journalMode").is_none());
      assert_eq!(json["sizeBytes"], 4096);
   }
}
