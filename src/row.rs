//! # Rows
//!
//! A [`Row`] is one parsed record: an ordered list of column names paired with
//! an equally long list of string values. Column names are shared between all
//! rows of the same shape through an `Arc<[String]>`, so a source only
//! allocates its header once.
//!
//! Rows are immutable once built. Stages pass them around as [`RowRef`]
//! handles; a pass-through stage forwards the very same handle, while a
//! reshaping stage (column selection) builds a new row.
//!
//! ```rust
//! use rowweave::Row;
//!
//! let row = Row::from_pairs([("a", "1"), ("b", "2")]);
//! assert_eq!(row.get("b"), Some("2"));
//! assert_eq!(row.position("a"), Some(0));
//! ```

use crate::error::RowError;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a [`Row`], the unit carried by every pending queue.
pub type RowRef = Arc<Row>;

/// One record: column names and their values, in matching order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
  column_names: Arc<[String]>,
  values: Vec<String>,
}

impl Row {
  /// Builds a row, checking that there is exactly one value per column.
  ///
  /// # Errors
  ///
  /// Returns [`RowError::LengthMismatch`] when the two sequences differ in length.
  pub fn new(column_names: Arc<[String]>, values: Vec<String>) -> Result<Self, RowError> {
    if column_names.len() != values.len() {
      return Err(RowError::LengthMismatch {
        columns: column_names.len(),
        values: values.len(),
      });
    }
    Ok(Self {
      column_names,
      values,
    })
  }

  /// Builds a row from `(name, value)` pairs. Handy for tests and literals.
  pub fn from_pairs<I, K, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    let (names, values): (Vec<String>, Vec<String>) = pairs
      .into_iter()
      .map(|(k, v)| (k.into(), v.into()))
      .unzip();
    Self {
      column_names: names.into(),
      values,
    }
  }

  /// Builds a row whose lengths are known to match, as produced by a
  /// projection over `names.len()` positions.
  pub(crate) fn projected(column_names: Arc<[String]>, values: Vec<String>) -> Self {
    debug_assert_eq!(column_names.len(), values.len());
    Self {
      column_names,
      values,
    }
  }

  /// The column names, shared with every other row of the same shape.
  #[must_use]
  pub fn column_names(&self) -> &Arc<[String]> {
    &self.column_names
  }

  /// Values in column order.
  #[must_use]
  pub fn values(&self) -> &[String] {
    &self.values
  }

  /// Number of columns.
  #[must_use]
  pub fn len(&self) -> usize {
    self.values.len()
  }

  /// Whether the row has no columns.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Index of the first column called `name`, if any.
  #[must_use]
  pub fn position(&self, name: &str) -> Option<usize> {
    self.column_names.iter().position(|c| c == name)
  }

  /// Value of the first column called `name`, if any.
  #[must_use]
  pub fn get(&self, name: &str) -> Option<&str> {
    self.position(name).map(|idx| self.values[idx].as_str())
  }

  /// Value at position `idx`, if in range.
  #[must_use]
  pub fn value(&self, idx: usize) -> Option<&str> {
    self.values.get(idx).map(String::as_str)
  }
}

impl fmt::Display for Row {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.values.join(","))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_rejects_length_mismatch() {
    let names: Arc<[String]> = vec!["a".to_string(), "b".to_string()].into();
    let err = Row::new(names, vec!["1".to_string()]).unwrap_err();
    assert_eq!(
      err,
      RowError::LengthMismatch {
        columns: 2,
        values: 1
      }
    );
  }

  #[test]
  fn test_rows_share_column_names() {
    let names: Arc<[String]> = vec!["a".to_string()].into();
    let r1 = Row::new(names.clone(), vec!["1".to_string()]).unwrap();
    let r2 = Row::new(names, vec!["2".to_string()]).unwrap();
    assert!(Arc::ptr_eq(r1.column_names(), r2.column_names()));
  }

  #[test]
  fn test_lookup_by_name_uses_first_match() {
    let row = Row::from_pairs([("a", "1"), ("b", "2"), ("a", "3")]);
    assert_eq!(row.position("a"), Some(0));
    assert_eq!(row.get("a"), Some("1"));
    assert_eq!(row.get("missing"), None);
    assert_eq!(row.value(2), Some("3"));
    assert_eq!(row.value(3), None);
  }

  #[test]
  fn test_display_joins_values() {
    let row = Row::from_pairs([("a", "1"), ("b", "2")]);
    assert_eq!(row.to_string(), "1,2");
    assert_eq!(row.len(), 2);
    assert!(!row.is_empty());
  }
}
