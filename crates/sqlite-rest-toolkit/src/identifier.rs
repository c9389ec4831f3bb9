//! Identifier sanitizing for table and column names.
//!
//! Names cannot be bound as statement parameters, so they are the one piece of
//! caller input interpolated into SQL text. Every name goes through
//! [`sanitize`] first; nothing is quoted or escaped.

/// Keep only ASCII letters, digits and `_`, in their original order.
///
/// Never fails. A name that reduces to the empty string is left for the
/// table-existence check to reject.
///
/// ```
/// use sqlite_rest_toolkit::sanitize;
///
/// assert_eq!(sanitize("Order;DROP"), "OrderDROP");
/// assert_eq!(sanitize("user_2"), "user_2");
/// ```
pub fn sanitize(name: &str) -> String {
   name
      .chars()
      .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
      .collect()
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_strips_injection_characters() {
      assert_eq!(sanitize("Order;DROP"), "OrderDROP");
      assert_eq!(sanitize("t; DROP TABLE users; --"), "tDROPTABLEusers");
      assert_eq!(sanitize("\"quoted\""), "quoted");
      assert_eq!(sanitize("a.b"), "ab");
   }

   #[test]
   fn test_keeps_allowed_characters_in_order() {
      assert_eq!(sanitize("Product_Items_2024"), "Product_Items_2024");
      assert_eq!(sanitize("_x9"), "_x9");
   }

   #[test]
   fn test_non_ascii_removed() {
      assert_eq!(sanitize("prodüct"), "prodct");
      assert_eq!(sanitize("表"), "");
   }

   #[test]
   fn test_empty_and_fully_stripped() {
      assert_eq!(sanitize(""), "");
      assert_eq!(sanitize("'; --"), "");
   }
}
