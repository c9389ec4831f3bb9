//! Execution engine tests against an in-memory database.

use sqlite_rest_toolkit::{
   ConnectionManager, Error, FieldMap, Pagination, RowFilter, SqlStatement, Value, builder,
   executor,
};

async fn memory_db() -> ConnectionManager {
   let manager = ConnectionManager::new(None);
   manager
      .open(":memory:")
      .await
      .expect("Failed to open in-memory database");

   let mut conn = manager.acquire().await.unwrap();
   executor::execute(
      &mut conn,
      SqlStatement::new(
         "CREATE TABLE Product (name TEXT, price REAL, qty INTEGER, data BLOB)",
         vec![],
      ),
   )
   .await
   .unwrap();
   drop(conn);

   manager
}

fn stmt(sql: &str, params: Vec<Value>) -> SqlStatement {
   SqlStatement::new(sql, params)
}

#[tokio::test]
async fn test_select_literal() {
   let manager = memory_db().await;
   let mut conn = manager.acquire().await.unwrap();

   let result = executor::query(&mut conn, stmt("SELECT 1", vec![]))
      .await
      .unwrap();

   assert_eq!(result.columns, vec!["1".to_string()]);
   assert_eq!(result.rows, vec![vec![Value::Integer(1)]]);
}

#[tokio::test]
async fn test_columns_reported_for_empty_result() {
   let manager = memory_db().await;
   let mut conn = manager.acquire().await.unwrap();

   let result = executor::query(&mut conn, stmt("SELECT name, price FROM Product", vec![]))
      .await
      .unwrap();

   assert_eq!(result.columns, vec!["name", "price"]);
   assert!(result.rows.is_empty());
}

#[tokio::test]
async fn test_value_fidelity() {
   let manager = memory_db().await;
   let mut conn = manager.acquire().await.unwrap();

   let write = executor::execute(
      &mut conn,
      stmt(
         "INSERT INTO Product (name, price, qty, data) VALUES (?, ?, ?, ?)",
         vec![
            Value::Text("Widget".into()),
            Value::Real(9.99),
            Value::Integer(-3),
            Value::Null,
         ],
      ),
   )
   .await
   .unwrap();

   assert_eq!(write.rows_affected, 1);
   assert_eq!(write.last_insert_id, 1);

   let result = executor::query(
      &mut conn,
      stmt("SELECT name, price, qty, data FROM Product", vec![]),
   )
   .await
   .unwrap();

   assert_eq!(
      result.rows[0],
      vec![
         Value::Text("Widget".into()),
         Value::Real(9.99),
         Value::Integer(-3),
         Value::Null
      ]
   );
}

#[tokio::test]
async fn test_blob_projection() {
   let manager = memory_db().await;
   let mut conn = manager.acquire().await.unwrap();

   let small: Vec<u8> = (0..500).map(|i| (i % 256) as u8).collect();
   let large = vec![0xAB_u8; 2000];

   for blob in [small.clone(), large] {
      executor::execute(
         &mut conn,
         stmt("INSERT INTO Product (data) VALUES (?)", vec![Value::Blob(blob)]),
      )
      .await
      .unwrap();
   }

   let result = executor::query(&mut conn, stmt("SELECT data FROM Product ORDER BY rowid", vec![]))
      .await
      .unwrap();

   assert_eq!(result.rows[0][0], Value::Blob(small));
   assert_eq!(result.rows[1][0], Value::BlobPlaceholder);
}

#[tokio::test]
async fn test_storage_class_wins_over_declared_type() {
   let manager = memory_db().await;
   let mut conn = manager.acquire().await.unwrap();

   // 'abc' cannot be coerced to INTEGER affinity, so it stays text
   executor::execute(
      &mut conn,
      stmt("INSERT INTO Product (qty) VALUES ('abc')", vec![]),
   )
   .await
   .unwrap();

   let result = executor::query(&mut conn, stmt("SELECT qty FROM Product", vec![]))
      .await
      .unwrap();
   assert_eq!(result.rows[0][0], Value::Text("abc".into()));
}

#[tokio::test]
async fn test_prepare_failed_carries_sql_and_message() {
   let manager = memory_db().await;
   let mut conn = manager.acquire().await.unwrap();

   let err = executor::query(&mut conn, stmt("SELECT * FROM nowhere", vec![]))
      .await
      .unwrap_err();

   match err {
      Error::PrepareFailed { sql, message } => {
         assert_eq!(sql, "SELECT * FROM nowhere");
         assert!(message.contains("no such table"), "message was: {message}");
      }
      other => panic!("expected PrepareFailed, got {other:?}"),
   }

   let err = executor::execute(&mut conn, stmt("UPDAT Product SET qty = 1", vec![]))
      .await
      .unwrap_err();
   assert!(matches!(err, Error::PrepareFailed { .. }));
}

#[tokio::test]
async fn test_step_failed_on_constraint() {
   let manager = memory_db().await;
   let mut conn = manager.acquire().await.unwrap();

   executor::execute(
      &mut conn,
      stmt("CREATE TABLE uniq (code TEXT UNIQUE NOT NULL)", vec![]),
   )
   .await
   .unwrap();

   let insert = || stmt("INSERT INTO uniq (code) VALUES (?)", vec![Value::Text("A".into())]);
   executor::execute(&mut conn, insert()).await.unwrap();

   let err = executor::execute(&mut conn, insert()).await.unwrap_err();
   match err {
      Error::StepFailed { message } => {
         assert!(message.contains("UNIQUE constraint failed"), "message was: {message}");
      }
      other => panic!("expected StepFailed, got {other:?}"),
   }

   let err = executor::execute(
      &mut conn,
      stmt("INSERT INTO uniq (code) VALUES (?)", vec![Value::Null]),
   )
   .await
   .unwrap_err();
   assert!(matches!(err, Error::StepFailed { .. }));
}

#[tokio::test]
async fn test_invalid_utf8_text_is_lossy_not_null() {
   let manager = memory_db().await;
   let mut conn = manager.acquire().await.unwrap();

   let result = executor::query(&mut conn, stmt("SELECT CAST(x'ff41' AS TEXT)", vec![]))
      .await
      .unwrap();

   assert_eq!(result.rows[0][0], Value::Text("\u{FFFD}A".into()));
}

#[tokio::test]
async fn test_second_statement_is_rejected_before_running() {
   let manager = memory_db().await;
   let mut conn = manager.acquire().await.unwrap();

   let err = executor::execute(
      &mut conn,
      stmt(
         "INSERT INTO Product (name) VALUES ('a'); INSERT INTO Product (name) VALUES ('b')",
         vec![],
      ),
   )
   .await
   .unwrap_err();
   assert!(matches!(err, Error::PrepareFailed { .. }), "got {err:?}");

   let err = executor::query(
      &mut conn,
      stmt("SELECT 1; DROP TABLE Product", vec![]),
   )
   .await
   .unwrap_err();
   assert!(matches!(err, Error::PrepareFailed { .. }), "got {err:?}");

   let count = executor::query(&mut conn, stmt("SELECT COUNT(*) FROM Product", vec![]))
      .await
      .unwrap();
   assert_eq!(count.rows[0][0], Value::Integer(0));
}

#[tokio::test]
async fn test_trailing_semicolons_and_comments_are_accepted() {
   let manager = memory_db().await;
   let mut conn = manager.acquire().await.unwrap();

   for sql in ["SELECT 1;", "SELECT 1; ;  ", "SELECT 1; -- done", "SELECT 1 /* one */ ; /* end */"] {
      let result = executor::query(&mut conn, stmt(sql, vec![])).await.unwrap();
      assert_eq!(result.rows, vec![vec![Value::Integer(1)]], "sql: {sql}");
   }

   // Semicolons inside a trigger body belong to the one CREATE statement
   executor::execute(
      &mut conn,
      stmt(
         "CREATE TRIGGER zero_qty AFTER INSERT ON Product BEGIN \
          UPDATE Product SET qty = 0 WHERE rowid = new.rowid; END;",
         vec![],
      ),
   )
   .await
   .unwrap();

   executor::execute(
      &mut conn,
      stmt("INSERT INTO Product (name, qty) VALUES ('t', 9)", vec![]),
   )
   .await
   .unwrap();
   let result = executor::query(&mut conn, stmt("SELECT qty FROM Product", vec![]))
      .await
      .unwrap();
   assert_eq!(result.rows[0][0], Value::Integer(0));
}

#[tokio::test]
async fn test_builder_round_trip() {
   let manager = memory_db().await;
   let mut conn = manager.acquire().await.unwrap();

   let mut fields = FieldMap::new();
   fields.insert("name".into(), Value::Text("A".into()));
   fields.insert("qty".into(), Value::Integer(5));

   let inserted = executor::execute(&mut conn, builder::insert_row("Product", &fields))
      .await
      .unwrap();
   let rowid = inserted.last_insert_id;

   let mut update = FieldMap::new();
   update.insert("qty".into(), Value::Integer(6));
   let updated = executor::execute(
      &mut conn,
      builder::update_row("Product", rowid, &update).unwrap(),
   )
   .await
   .unwrap();
   assert_eq!(updated.rows_affected, 1);

   let page = executor::query(
      &mut conn,
      builder::select_rows(
         "Product",
         &RowFilter::new().eq("name", "A"),
         &Pagination::default(),
      ),
   )
   .await
   .unwrap();

   assert_eq!(page.columns[0], "rowid");
   assert_eq!(page.rows.len(), 1);
   assert_eq!(page.rows[0][0], Value::Integer(rowid));
   assert_eq!(page.rows[0][3], Value::Integer(6));

   let deleted = executor::execute(&mut conn, builder::delete_row("Product", rowid))
      .await
      .unwrap();
   assert_eq!(deleted.rows_affected, 1);

   let deleted = executor::execute(&mut conn, builder::delete_row("Product", rowid))
      .await
      .unwrap();
   assert_eq!(deleted.rows_affected, 0);
}
