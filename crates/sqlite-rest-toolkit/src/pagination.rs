//! Page, sort and order parameters for row listings.

/// Page number used when the caller does not supply one.
pub const DEFAULT_PAGE: i64 = 1;

/// Rows per page used when the caller does not supply a value.
pub const DEFAULT_PER_PAGE: i64 = 50;

/// Upper bound on rows returned by a single listing.
pub const MAX_PER_PAGE: i64 = 1000;

/// Sort direction of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
   #[default]
   Asc,
   Desc,
}

impl SortOrder {
   /// `"desc"` in any letter case selects descending; everything else is ascending.
   pub fn parse(order: &str) -> Self {
      if order.trim().eq_ignore_ascii_case("desc") {
         SortOrder::Desc
      } else {
         SortOrder::Asc
      }
   }

   pub fn as_sql(&self) -> &'static str {
      match self {
         SortOrder::Asc => "ASC",
         SortOrder::Desc => "DESC",
      }
   }
}

/// Which slice of a table to return, and in what order.
///
/// Values are taken as supplied and normalized on use: [`offset`](Self::offset)
/// and [`limit`](Self::limit) never go out of range, whatever `page` and
/// `per_page` hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
   /// 1-based page number
   pub page: i64,
   /// Requested rows per page, clamped to `1..=1000` when used as a limit
   pub per_page: i64,
   /// Sort column; `None` sorts by `rowid`
   pub sort: Option<String>,
   pub order: SortOrder,
}

impl Default for Pagination {
   fn default() -> Self {
      Self {
         page: DEFAULT_PAGE,
         per_page: DEFAULT_PER_PAGE,
         sort: None,
         order: SortOrder::Asc,
      }
   }
}

impl Pagination {
   pub fn new(page: i64, per_page: i64) -> Self {
      Self {
         page,
         per_page,
         ..Default::default()
      }
   }

   /// Sort by `column` in the given direction.
   pub fn sorted_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
      self.sort = Some(column.into());
      self.order = order;
      self
   }

   /// `max(0, page - 1) * max(1, per_page)`
   pub fn offset(&self) -> i64 {
      self.page.saturating_sub(1).max(0).saturating_mul(self.per_page.max(1))
   }

   /// `clamp(per_page, 1, 1000)`
   pub fn limit(&self) -> i64 {
      self.per_page.clamp(1, MAX_PER_PAGE)
   }
}
