//! Stock transformers.
//!
//! Every stage here preserves arrival order and closes its output when its
//! input closes (or earlier, for [`RowLimiter`]).

/// Column projection by position and by name.
pub mod column_select_transformer;
/// Pass-through stage.
pub mod identity_transformer;
/// Truncation after `n` rows.
pub mod limit_transformer;
/// Row filtering on `column = value` predicates.
pub mod predicate_transformer;
/// Skipping the first `n` rows.
pub mod skip_transformer;

pub use column_select_transformer::{ColumnIntSelector, ColumnStringSelector};
pub use identity_transformer::IdentityTransformer;
pub use limit_transformer::RowLimiter;
pub use predicate_transformer::{Filter, Predicate, Predicator};
pub use skip_transformer::RowSkipper;
