//! # Consumer Trait
//!
//! A [`Consumer`] is the terminal end of a run. It drains the last pending
//! queue until it closes and writes each row somewhere: a CSV sink, a
//! collection, a socket.
//!
//! A consumer that returns early (for instance on a write error) drops the
//! receiver, which releases every stage upstream of it.

use crate::error::{ComponentInfo, SinkError};
use crate::transformer::RowReceiver;
use async_trait::async_trait;

/// Configuration shared by all consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerConfig {
  /// Optional name for identifying this consumer in logs and errors.
  pub name: Option<String>,
}

/// The sink of a row stream.
#[async_trait]
pub trait Consumer: Send {
  /// Drains `input` until it closes.
  ///
  /// # Errors
  ///
  /// Returns a [`SinkError`] when a row cannot be written.
  async fn consume(&mut self, input: RowReceiver) -> Result<(), SinkError>;

  /// Returns the configuration.
  fn config(&self) -> &ConsumerConfig;

  /// Returns the configuration mutably.
  fn config_mut(&mut self) -> &mut ConsumerConfig;

  /// Sets the name for this consumer.
  #[must_use]
  fn with_name(mut self, name: String) -> Self
  where
    Self: Sized,
  {
    self.config_mut().name = Some(name);
    self
  }

  /// Returns information about the component for logging and error reporting.
  fn component_info(&self) -> ComponentInfo {
    ComponentInfo {
      name: self
        .config()
        .name
        .clone()
        .unwrap_or_else(|| "consumer".to_string()),
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }
}
