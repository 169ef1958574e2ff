//! Limit transformer.
//!
//! [`RowLimiter`] forwards at most `n` rows and then returns without waiting
//! for its input to close. Returning drops the input receiver, which is what
//! tells the upstream stage to stop producing (see
//! [`crate::transformer`] for the cancellation model).
//!
//! `RowLimiter::new(0)` closes its output immediately, before reading any row.

use crate::error::ConfigError;
use crate::transformer::{RowReceiver, RowSender, Transformer, TransformerConfig};
use async_trait::async_trait;
use tracing::debug;

/// A transformer that truncates a stream after a fixed number of rows.
#[derive(Debug, Clone)]
pub struct RowLimiter {
  /// The maximum number of rows to allow through.
  pub limit: usize,
  /// Configuration for the transformer.
  pub config: TransformerConfig,
}

impl RowLimiter {
  /// Creates a new `RowLimiter` with the given limit.
  pub fn new(limit: usize) -> Self {
    Self {
      limit,
      config: TransformerConfig::default(),
    }
  }
}

#[async_trait]
impl Transformer for RowLimiter {
  async fn transform(
    &mut self,
    mut input: RowReceiver,
    output: RowSender,
  ) -> Result<(), ConfigError> {
    let mut forwarded = 0usize;
    while forwarded < self.limit {
      let Some(row) = input.recv().await else {
        break;
      };
      if output.send(row).await.is_err() {
        debug!(stage = %self.component_info().name, "downstream closed, stopping");
        break;
      }
      forwarded += 1;
    }
    debug!(
      stage = %self.component_info().name,
      forwarded,
      limit = self.limit,
      "limit finished"
    );
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
