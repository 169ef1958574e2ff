//! # Transformer Trait
//!
//! This module defines the [`Transformer`] trait for stages that turn one row
//! stream into another. A transformer is handed the read end of its input
//! queue and the write end of its output queue, and owns both for the rest of
//! its run.
//!
//! ## Contract
//!
//! A transformer must:
//!
//! - read rows from `input` until it returns `None` (the upstream closed), or
//!   until the transformer decides it needs no more rows;
//! - write zero or more rows to `output`, in whatever order it defines (every
//!   stock transformer preserves arrival order);
//! - close `output` when it is done, on every path.
//!
//! Closing is dropping: `output` is moved into [`Transformer::transform`], so
//! it is released exactly once when the call returns, whether it returns `Ok`
//! or `Err`. Nothing else holds that sender, so a queue cannot be closed twice.
//!
//! ## Early exit and cancellation
//!
//! When a transformer stops early it drops `input`, which makes the upstream
//! stage's next `send` fail. Every stage treats a failed `send` as "downstream
//! is gone" and stops reading too, so stopping at the end of a pipeline
//! releases every stage and the source behind it.
//!
//! ## Example
//!
//! ```rust
//! use rowweave::{pending_queue, Row, RowLimiter, Transformer};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (in_tx, in_rx) = pending_queue(8);
//! let (out_tx, mut out_rx) = pending_queue(8);
//!
//! for i in 0..5 {
//!   in_tx.send(Arc::new(Row::from_pairs([("n", i.to_string())]))).await?;
//! }
//! drop(in_tx);
//!
//! RowLimiter::new(2).transform(in_rx, out_tx).await?;
//! assert_eq!(out_rx.recv().await.unwrap().get("n"), Some("0"));
//! assert_eq!(out_rx.recv().await.unwrap().get("n"), Some("1"));
//! assert!(out_rx.recv().await.is_none());
//! # Ok(())
//! # }
//! ```

use crate::config::PipelineConfig;
use crate::error::{ComponentInfo, ConfigError};
use crate::row::RowRef;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Write end of a pending queue.
pub type RowSender = mpsc::Sender<RowRef>;

/// Read end of a pending queue.
pub type RowReceiver = mpsc::Receiver<RowRef>;

/// Creates a bounded pending queue holding at most `capacity` rows.
///
/// A capacity of zero is bumped to one.
#[must_use]
pub fn pending_queue(capacity: usize) -> (RowSender, RowReceiver) {
  mpsc::channel(capacity.max(1))
}

/// Configuration shared by all transformers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformerConfig {
  /// Optional name for identifying this transformer in logs and errors.
  pub name: Option<String>,
}

impl TransformerConfig {
  /// Sets the name for this transformer configuration.
  #[must_use]
  pub fn with_name(mut self, name: String) -> Self {
    self.name = Some(name);
    self
  }

  /// Returns the current name, if set.
  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }
}

/// A streaming stage mapping a row stream to a row stream.
///
/// See the [module documentation](self) for the contract every
/// implementation must honor.
#[async_trait]
pub trait Transformer: Send {
  /// Consumes `input` and writes the transformed rows to `output`.
  ///
  /// # Errors
  ///
  /// Returns a [`ConfigError`] when a row does not fit the stage's
  /// configuration (unknown column, out-of-range index). The stage stops at
  /// the first such row; rows already written stay written.
  async fn transform(&mut self, input: RowReceiver, output: RowSender) -> Result<(), ConfigError>;

  /// Replaces the configuration.
  fn set_config_impl(&mut self, config: TransformerConfig);

  /// Returns the configuration.
  fn get_config_impl(&self) -> &TransformerConfig;

  /// Returns the configuration mutably.
  fn get_config_mut_impl(&mut self) -> &mut TransformerConfig;

  /// Adopts pipeline-wide settings. Called by [`Pipeline::spawn`] before the
  /// stage runs; stages that create queues of their own size them here.
  ///
  /// [`Pipeline::spawn`]: crate::pipeline::Pipeline::spawn
  fn configure(&mut self, _pipeline: &PipelineConfig) {}

  /// Returns a reference to the transformer's configuration.
  fn config(&self) -> &TransformerConfig {
    self.get_config_impl()
  }

  /// Sets the name for this transformer.
  #[must_use]
  fn with_name(mut self, name: String) -> Self
  where
    Self: Sized,
  {
    self.get_config_mut_impl().name = Some(name);
    self
  }

  /// Returns information about the component for logging and error reporting.
  fn component_info(&self) -> ComponentInfo {
    ComponentInfo {
      name: self
        .config()
        .name
        .clone()
        .unwrap_or_else(|| "transformer".to_string()),
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }
}

#[async_trait]
impl Transformer for Box<dyn Transformer> {
  async fn transform(&mut self, input: RowReceiver, output: RowSender) -> Result<(), ConfigError> {
    (**self).transform(input, output).await
  }

  fn set_config_impl(&mut self, config: TransformerConfig) {
    (**self).set_config_impl(config);
  }

  fn get_config_impl(&self) -> &TransformerConfig {
    (**self).get_config_impl()
  }

  fn get_config_mut_impl(&mut self) -> &mut TransformerConfig {
    (**self).get_config_mut_impl()
  }

  fn configure(&mut self, pipeline: &PipelineConfig) {
    (**self).configure(pipeline);
  }

  fn component_info(&self) -> ComponentInfo {
    (**self).component_info()
  }
}
