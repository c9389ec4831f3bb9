//! Decoding of list-rows query-string parameters.
//!
//! The transport hands over the already-split `key=value` pairs; this module
//! turns them into a [`Pagination`] and a [`RowFilter`]. Keys starting with
//! `_` are control parameters, every other key is a column equality filter.

use sqlite_rest_toolkit::{DEFAULT_PAGE, DEFAULT_PER_PAGE, Pagination, RowFilter, SortOrder};

/// Listing parameters decoded from a query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowQuery {
   pub pagination: Pagination,
   pub filter: RowFilter,
}

impl RowQuery {
   /// Decode `_page`, `_per_page`, `_sort`, `_order`, `_filter` and column filters.
   ///
   /// Integers that fail to parse fall back to their defaults rather than
   /// erroring. Unknown `_`-prefixed keys are ignored. When a key repeats,
   /// the last occurrence wins.
   ///
   /// ```
   /// use sqlite_rest::RowQuery;
   ///
   /// let q = RowQuery::from_pairs([("_page", "2"), ("_per_page", "x"), ("name", "Widget")]);
   /// assert_eq!(q.pagination.page, 2);
   /// assert_eq!(q.pagination.per_page, 50);
   /// assert_eq!(q.filter.columns["name"], "Widget");
   /// ```
   pub fn from_pairs<I, K, V>(pairs: I) -> Self
   where
      I: IntoIterator<Item = (K, V)>,
      K: AsRef<str>,
      V: AsRef<str>,
   {
      let mut pagination = Pagination::default();
      let mut filter = RowFilter::new();

      for (key, value) in pairs {
         let (key, value) = (key.as_ref(), value.as_ref());
         match key {
            "_page" => pagination.page = value.trim().parse().unwrap_or(DEFAULT_PAGE),
            "_per_page" => {
               pagination.per_page = value.trim().parse().unwrap_or(DEFAULT_PER_PAGE)
            }
            "_sort" => pagination.sort = Some(value.to_string()),
            "_order" => pagination.order = SortOrder::parse(value),
            "_filter" => filter.raw = Some(value.to_string()),
            _ if key.starts_with('_') => {}
            _ => filter = filter.eq(key, value),
         }
      }

      Self { pagination, filter }
   }
}
