//! Skip transformer.
//!
//! [`RowSkipper`] discards the first `n` rows it sees and forwards the rest
//! unchanged. The count restarts at zero on every call to
//! [`Transformer::transform`], so one instance can be reused across runs.
//!
//! ```rust
//! use rowweave::RowSkipper;
//!
//! // Input:  r0 r1 r2 r3
//! // Output:       r2 r3
//! let skipper = RowSkipper::new(2);
//! ```

use crate::error::ConfigError;
use crate::transformer::{RowReceiver, RowSender, Transformer, TransformerConfig};
use async_trait::async_trait;
use tracing::debug;

/// A transformer that skips a fixed number of rows from the beginning of a stream.
#[derive(Debug, Clone)]
pub struct RowSkipper {
  /// The number of rows to discard.
  pub skip: usize,
  /// Configuration for the transformer.
  pub config: TransformerConfig,
}

impl RowSkipper {
  /// Creates a new `RowSkipper`. `skip == 0` forwards everything.
  pub fn new(skip: usize) -> Self {
    Self {
      skip,
      config: TransformerConfig::default(),
    }
  }
}

#[async_trait]
impl Transformer for RowSkipper {
  async fn transform(
    &mut self,
    mut input: RowReceiver,
    output: RowSender,
  ) -> Result<(), ConfigError> {
    let mut seen = 0usize;
    let mut forwarded = 0usize;
    while let Some(row) = input.recv().await {
      if seen < self.skip {
        seen += 1;
        continue;
      }
      if output.send(row).await.is_err() {
        debug!(stage = %self.component_info().name, "downstream closed, stopping");
        break;
      }
      forwarded += 1;
    }
    debug!(
      stage = %self.component_info().name,
      skipped = seen,
      forwarded,
      "skip finished"
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
