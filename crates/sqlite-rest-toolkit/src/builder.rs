//! SQL text and parameter lists for the REST operations.
//!
//! Builders are pure: they never touch a connection. Table and column names
//! pass through [`sanitize`] before being written into the SQL text; every
//! data value travels as a bound `?` parameter.

use std::collections::BTreeMap;

use crate::identifier::sanitize;
use crate::pagination::Pagination;
use crate::value::{FieldMap, Value};

/// Name prefix SQLite reserves for its own catalog objects.
pub const RESERVED_PREFIX: &str = "sqlite_";

/// SQL text plus the positional values bound to its `?` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
   pub sql: String,
   pub params: Vec<Value>,
}

impl SqlStatement {
   pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
      Self {
         sql: sql.into(),
         params,
      }
   }
}

/// Row selection for listings: column equality tests plus an optional raw fragment.
///
/// Column filters are kept sorted by name so the generated SQL is the same
/// for the same filters regardless of how they were collected. The raw
/// fragment is appended verbatim as `AND (<fragment>)`; it is the caller's
/// escape hatch and is not sanitized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
   pub columns: BTreeMap<String, String>,
   pub raw: Option<String>,
}

impl RowFilter {
   pub fn new() -> Self {
      Self::default()
   }

   /// Require `column = value`.
   pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
      self.columns.insert(column.into(), value.into());
      self
   }

   /// Append a raw SQL condition.
   pub fn raw(mut self, fragment: impl Into<String>) -> Self {
      self.raw = Some(fragment.into());
      self
   }

   pub fn is_empty(&self) -> bool {
      self.columns.is_empty() && self.raw_fragment().is_none()
   }

   fn raw_fragment(&self) -> Option<&str> {
      self.raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
   }

   /// ` WHERE …` (with leading space) and its parameters, or an empty clause.
   fn where_clause(&self) -> (String, Vec<Value>) {
      let mut parts = Vec::with_capacity(self.columns.len() + 1);
      let mut params = Vec::with_capacity(self.columns.len());

      for (column, value) in &self.columns {
         parts.push(format!("{} = ?", sanitize(column)));
         params.push(Value::Text(value.clone()));
      }

      if let Some(fragment) = self.raw_fragment() {
         parts.push(format!("({})", fragment));
      }

      if parts.is_empty() {
         (String::new(), params)
      } else {
         (format!(" WHERE {}", parts.join(" AND ")), params)
      }
   }
}

/// Every table and view in the catalog, ordered by type then name.
pub fn list_tables() -> SqlStatement {
   SqlStatement::new(
      "SELECT name, type FROM sqlite_master WHERE type IN ('table','view') ORDER BY type, name",
      vec![],
   )
}

/// Exact catalog lookup of a table or view, returning its `name` and `sql`.
pub fn find_table(table: &str) -> SqlStatement {
   SqlStatement::new(
      "SELECT name, sql FROM sqlite_master WHERE type IN ('table','view') AND name = ?",
      vec![Value::Text(sanitize(table))],
   )
}

/// Column metadata: `cid, name, type, notnull, dflt_value, pk` per column.
pub fn table_columns(table: &str) -> SqlStatement {
   SqlStatement::new(format!("PRAGMA table_info({})", sanitize(table)), vec![])
}

/// `SELECT COUNT(*)` over the filtered table.
pub fn count_rows(table: &str, filter: &RowFilter) -> SqlStatement {
   let (where_clause, params) = filter.where_clause();
   SqlStatement::new(
      format!("SELECT COUNT(*) FROM {}{}", sanitize(table), where_clause),
      params,
   )
}

/// One page of the filtered table, `rowid` first.
///
/// The sort column falls back to `rowid` when absent or when it sanitizes to
/// nothing. `LIMIT` and `OFFSET` are bound after the filter values.
pub fn select_rows(table: &str, filter: &RowFilter, page: &Pagination) -> SqlStatement {
   let (where_clause, mut params) = filter.where_clause();

   let sort_column = page
      .sort
      .as_deref()
      .map(sanitize)
      .filter(|column| !column.is_empty())
      .unwrap_or_else(|| "rowid".to_string());

   params.push(Value::Integer(page.limit()));
   params.push(Value::Integer(page.offset()));

   SqlStatement::new(
      format!(
         "SELECT rowid, * FROM {}{} ORDER BY {} {} LIMIT ? OFFSET ?",
         sanitize(table),
         where_clause,
         sort_column,
         page.order.as_sql()
      ),
      params,
   )
}

/// INSERT over the field map's keys, in the map's own order.
pub fn insert_row(table: &str, fields: &FieldMap) -> SqlStatement {
   let columns: Vec<String> = fields.keys().map(|k| sanitize(k)).collect();
   let placeholders = vec!["?"; fields.len()].join(", ");

   SqlStatement::new(
      format!(
         "INSERT INTO {} ({}) VALUES ({})",
         sanitize(table),
         columns.join(", "),
         placeholders
      ),
      fields.values().cloned().collect(),
   )
}

/// UPDATE of one row by `rowid`, with SET columns in sorted order.
///
/// Returns `None` when there is nothing to set.
pub fn update_row(table: &str, rowid: i64, fields: &FieldMap) -> Option<SqlStatement> {
   if fields.is_empty() {
      return None;
   }

   let mut keys: Vec<&String> = fields.keys().collect();
   keys.sort();

   let assignments: Vec<String> = keys.iter().map(|k| format!("{} = ?", sanitize(k))).collect();
   let mut params: Vec<Value> = keys.iter().map(|k| fields[k.as_str()].clone()).collect();
   params.push(Value::Integer(rowid));

   Some(SqlStatement::new(
      format!(
         "UPDATE {} SET {} WHERE rowid = ?",
         sanitize(table),
         assignments.join(", ")
      ),
      params,
   ))
}

/// DELETE of one row by `rowid`.
pub fn delete_row(table: &str, rowid: i64) -> SqlStatement {
   SqlStatement::new(
      format!("DELETE FROM {} WHERE rowid = ?", sanitize(table)),
      vec![Value::Integer(rowid)],
   )
}
