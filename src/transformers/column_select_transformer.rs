//! Column projection transformers.
//!
//! [`ColumnIntSelector`] keeps columns by position and [`ColumnStringSelector`]
//! keeps them by name. Both build a new [`Row`] per input row whose columns
//! follow the requested order; a column may be requested more than once.
//!
//! The output schema is computed from the first row only and shared by every
//! projected row after it.
//!
//! ```rust
//! use rowweave::{ColumnIntSelector, ColumnStringSelector};
//!
//! // columns a,b,c -> c,a,a
//! let by_index = ColumnIntSelector::new(vec![2, 0, 0]);
//! // columns a,b -> b,a
//! let by_name = ColumnStringSelector::new(vec!["b".to_string(), "a".to_string()]);
//! ```

use crate::config::{PipelineConfig, DEFAULT_BUFFER_SIZE};
use crate::error::ConfigError;
use crate::row::Row;
use crate::transformer::{pending_queue, RowReceiver, RowSender, Transformer, TransformerConfig};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// Keeps a subset of columns, chosen by position.
#[derive(Debug, Clone)]
pub struct ColumnIntSelector {
  /// Source column positions, in output order.
  pub indices: Vec<usize>,
  /// Configuration for the transformer.
  pub config: TransformerConfig,
}

impl ColumnIntSelector {
  /// Creates a selector keeping the columns at `indices`, in that order.
  pub fn new(indices: Vec<usize>) -> Self {
    Self {
      indices,
      config: TransformerConfig::default(),
    }
  }

  fn project_names(&self, row: &Row) -> Result<Arc<[String]>, ConfigError> {
    let names = row.column_names();
    self
      .indices
      .iter()
      .map(|&index| {
        names
          .get(index)
          .cloned()
          .ok_or(ConfigError::IndexOutOfRange {
            index,
            len: names.len(),
          })
      })
      .collect()
  }

  fn project_values(&self, row: &Row) -> Result<Vec<String>, ConfigError> {
    self
      .indices
      .iter()
      .map(|&index| {
        row
          .value(index)
          .map(str::to_string)
          .ok_or(ConfigError::IndexOutOfRange {
            index,
            len: row.len(),
          })
      })
      .collect()
  }
}

#[async_trait]
impl Transformer for ColumnIntSelector {
  async fn transform(
    &mut self,
    mut input: RowReceiver,
    output: RowSender,
  ) -> Result<(), ConfigError> {
    let mut schema: Option<Arc<[String]>> = None;
    while let Some(row) = input.recv().await {
      let names = match schema.clone() {
        Some(names) => names,
        None => {
          let names = self.project_names(&row).inspect_err(|e| {
            error!(stage = %self.component_info().name, error = %e, "cannot build output schema");
          })?;
          schema = Some(Arc::clone(&names));
          names
        }
      };
      let values = self.project_values(&row)?;
      if output.send(Arc::new(Row::projected(names, values))).await.is_err() {
        debug!(stage = %self.component_info().name, "downstream closed, stopping");
        break;
      }
    }
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

/// Keeps a subset of columns, chosen by name.
///
/// The first row is used to resolve each name to a position; the rest of the
/// stream, first row included, is then projected by an inner
/// [`ColumnIntSelector`] fed through its own queue. An empty input closes the
/// output without error.
///
/// Inside a [`Pipeline`](crate::pipeline::Pipeline) the inner queue takes the
/// pipeline's buffer size, like every other queue of the run.
#[derive(Debug, Clone)]
pub struct ColumnStringSelector {
  /// Column names, in output order.
  pub columns: Vec<String>,
  /// Capacity of the queue feeding the inner positional projector.
  /// Overwritten by [`Transformer::configure`].
  pub buffer_size: usize,
  /// Configuration for the transformer.
  pub config: TransformerConfig,
}

impl ColumnStringSelector {
  /// Creates a selector keeping the columns called `columns`, in that order.
  pub fn new(columns: Vec<String>) -> Self {
    Self {
      columns,
      buffer_size: DEFAULT_BUFFER_SIZE,
      config: TransformerConfig::default(),
    }
  }

  /// Sets the capacity of the inner queue when run outside a pipeline.
  #[must_use]
  pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
    self.buffer_size = buffer_size.max(1);
    self
  }

  /// Resolves every requested name against `row`, first match wins.
  pub fn resolve(&self, row: &Row) -> Result<Vec<usize>, ConfigError> {
    self
      .columns
      .iter()
      .map(|column| {
        row
          .position(column)
          .ok_or_else(|| ConfigError::UnknownColumn {
            column: column.clone(),
          })
      })
      .collect()
  }
}

#[async_trait]
impl Transformer for ColumnStringSelector {
  async fn transform(
    &mut self,
    mut input: RowReceiver,
    output: RowSender,
  ) -> Result<(), ConfigError> {
    let Some(first) = input.recv().await else {
      debug!(stage = %self.component_info().name, "empty input");
      return Ok(());
    };

    let indices = self.resolve(&first).inspect_err(|e| {
      error!(stage = %self.component_info().name, error = %e, "cannot resolve columns");
    })?;
    debug!(stage = %self.component_info().name, ?indices, "resolved columns");

    let mut projector =
      ColumnIntSelector::new(indices).with_name(format!("{}/indices", self.component_info().name));
    let (feed_tx, feed_rx) = pending_queue(self.buffer_size);

    let feed = async move {
      if feed_tx.send(first).await.is_err() {
        return;
      }
      while let Some(row) = input.recv().await {
        if feed_tx.send(row).await.is_err() {
          break;
        }
      }
    };

    let ((), result) = tokio::join!(feed, projector.transform(feed_rx, output));
    result
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

  fn configure(&mut self, pipeline: &PipelineConfig) {
    self.buffer_size = pipeline.buffer_size.max(1);
  }
}
