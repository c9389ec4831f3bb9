use sqlx::sqlite::SqliteValueRef;
use sqlx::{TypeInfo, Value as _, ValueRef};

use crate::Error;
use crate::value::Value;

/// Convert a SQLite column value to a [`Value`].
///
/// Dispatches on the storage class of the value itself, not the declared
/// column type, so a TEXT stored in an INTEGER column stays text.
///
/// BLOB values longer than [`BLOB_PLACEHOLDER_THRESHOLD`] bytes are replaced
/// by [`Value::BlobPlaceholder`] to bound response size.
///
/// A value that cannot be decoded as its storage class is an
/// [`Error::UnsupportedDatatype`], never a silent `Null`.
///
/// [`BLOB_PLACEHOLDER_THRESHOLD`]: crate::BLOB_PLACEHOLDER_THRESHOLD
pub fn to_value(value: SqliteValueRef) -> Result<Value, Error> {
   if value.is_null() {
      return Ok(Value::Null);
   }

   let column_type = value.type_info();
   let type_name = column_type.name();
   let owned = value.to_owned();
   let undecodable =
      |e: sqlx::Error| Error::UnsupportedDatatype(format!("Cannot decode SQLite {type_name}: {e}"));

   let result = match type_name {
      "INTEGER" => Value::Integer(owned.try_decode::<i64>().map_err(undecodable)?),

      "REAL" => Value::Real(owned.try_decode::<f64>().map_err(undecodable)?),

      // SQLite does not validate the encoding of TEXT it is handed, so
      // invalid UTF-8 is kept with replacement characters.
      "TEXT" => match owned.try_decode::<String>() {
         Ok(text) => Value::Text(text),
         Err(_) => {
            let bytes = owned.try_decode::<Vec<u8>>().map_err(undecodable)?;
            Value::Text(String::from_utf8_lossy(&bytes).into_owned())
         }
      },

      "BLOB" => Value::from_blob(owned.try_decode::<Vec<u8>>().map_err(undecodable)?),

      "NULL" => Value::Null,

      other => {
         // Declared-type names (NUMERIC, DATETIME, ...) only show up when the
         // storage class is unknown; fall back through the scalar decoders.
         if let Ok(v) = owned.try_decode::<i64>() {
            Value::Integer(v)
         } else if let Ok(v) = owned.try_decode::<f64>() {
            Value::Real(v)
         } else if let Ok(v) = owned.try_decode::<String>() {
            Value::Text(v)
         } else {
            return Err(Error::UnsupportedDatatype(format!(
               "Unknown SQLite type: {}",
               other
            )));
         }
      }
   };

   Ok(result)
}
