//! Row filtering.
//!
//! A [`Predicate`] is the parsed form of `"<column> = <value>"`: the text is
//! split on the first `=` and both sides are trimmed. A row satisfies it when
//! its `<column>` holds exactly `<value>`. A row without that column is a
//! schema error, not a mismatch.
//!
//! [`Predicator`] forwards the rows accepted by a [`Filter`], preserving order.
//!
//! ```rust
//! use rowweave::{Predicate, Predicator, Row};
//!
//! let predicate: Predicate = "city = Paris".parse().unwrap();
//! let row = Row::from_pairs([("city", "Paris")]);
//! assert!(predicate.evaluate(&row).unwrap());
//!
//! let stage = Predicator::new("city = Paris").unwrap();
//! ```

use crate::error::ConfigError;
use crate::row::Row;
use crate::transformer::{RowReceiver, RowSender, Transformer, TransformerConfig};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};

/// Per-row test deciding whether a row is kept.
pub type Filter = Arc<dyn Fn(&Row) -> Result<bool, ConfigError> + Send + Sync>;

/// Equality test of one column against a literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
  /// Column looked up in each row.
  pub column: String,
  /// Expected value.
  pub value: String,
}

impl Predicate {
  /// Tests `row`.
  ///
  /// # Errors
  ///
  /// [`ConfigError::UnknownColumn`] when the row has no such column.
  pub fn evaluate(&self, row: &Row) -> Result<bool, ConfigError> {
    row
      .get(&self.column)
      .map(|value| value == self.value)
      .ok_or_else(|| ConfigError::UnknownColumn {
        column: self.column.clone(),
      })
  }
}

impl FromStr for Predicate {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (column, value) = s.split_once('=').ok_or_else(|| ConfigError::PredicateParse {
      predicate: s.to_string(),
    })?;
    Ok(Self {
      column: column.trim().to_string(),
      value: value.trim().to_string(),
    })
  }
}

impl fmt::Display for Predicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} = {}", self.column, self.value)
  }
}

/// A transformer that keeps only the rows accepted by a filter.
#[derive(Clone)]
pub struct Predicator {
  filter: Filter,
  /// Configuration for the transformer.
  pub config: TransformerConfig,
}

impl Predicator {
  /// Parses `predicate` eagerly and builds the stage.
  ///
  /// # Errors
  ///
  /// [`ConfigError::PredicateParse`] when the text contains no `=`.
  pub fn new(predicate: &str) -> Result<Self, ConfigError> {
    let predicate = predicate.parse::<Predicate>()?;
    Ok(Self::from_predicate(predicate))
  }

  /// Keeps the rows `predicate` accepts.
  pub fn from_predicate(predicate: Predicate) -> Self {
    Self::from_filter(move |row: &Row| predicate.evaluate(row))
  }

  /// Builds the stage from an arbitrary filter.
  pub fn from_filter<F>(filter: F) -> Self
  where
    F: Fn(&Row) -> Result<bool, ConfigError> + Send + Sync + 'static,
  {
    Self {
      filter: Arc::new(filter),
      config: TransformerConfig::default(),
    }
  }
}

impl fmt::Debug for Predicator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Predicator")
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}

#[async_trait]
impl Transformer for Predicator {
  async fn transform(
    &mut self,
    mut input: RowReceiver,
    output: RowSender,
  ) -> Result<(), ConfigError> {
    let mut kept = 0usize;
    let mut dropped = 0usize;
    while let Some(row) = input.recv().await {
      let keep = (self.filter)(row.as_ref()).inspect_err(|e| {
        error!(stage = %self.component_info().name, error = %e, "filter failed");
      })?;
      if !keep {
        dropped += 1;
        continue;
      }
      if output.send(row).await.is_err() {
        debug!(stage = %self.component_info().name, "downstream closed, stopping");
        break;
      }
      kept += 1;
    }
    debug!(stage = %self.component_info().name, kept, dropped, "filter finished");
    Ok(())
  }

  fn set_config_impl(&mut self, config: TransformerConfig) {
    self.config = config;
  }

  fn get_config_impl(&self) -> &TransformerConfig {
    &self.config
  }

  fn get_config_mut_impl(&mut self) -> &mut TransformerConfig {
    &mut self.config
  }
}
