//! # Producer Trait
//!
//! A [`Producer`] is the source end of a run: it fills the first pending
//! queue with rows and closes it (drops its sender) when the source is
//! exhausted.
//!
//! ## Start-up signal
//!
//! A producer reports at most one start-up failure through its
//! [`StartupSignal`]. Callers wait on the signal before reading the queue:
//!
//! - [`StartupSignal::fail`] delivers the error and the caller aborts;
//! - [`StartupSignal::ready`], or dropping the signal, means the producer has
//!   started and the queue should be drained.
//!
//! A producer must settle the signal before its first blocking `send`,
//! otherwise a caller waiting on the signal never reaches the queue.
//!
//! Failures after start-up are returned from [`Producer::produce`].

use crate::error::{ComponentInfo, SourceError};
use crate::transformer::RowSender;
use async_trait::async_trait;
use tokio::sync::oneshot;

/// One-shot start-up report from a producer to whoever launched it.
#[derive(Debug)]
pub struct StartupSignal {
  sender: oneshot::Sender<SourceError>,
}

/// Receiving side of a [`StartupSignal`].
///
/// Resolves to `Some(error)` when the producer failed to start and to `None`
/// once it has started.
#[derive(Debug)]
pub struct StartupWatch {
  receiver: oneshot::Receiver<SourceError>,
}

impl StartupSignal {
  /// Creates a linked signal / watch pair.
  #[must_use]
  pub fn channel() -> (StartupSignal, StartupWatch) {
    let (sender, receiver) = oneshot::channel();
    (StartupSignal { sender }, StartupWatch { receiver })
  }

  /// Reports that the producer could not start.
  pub fn fail(self, error: SourceError) {
    // The watcher may have given up already; nothing left to tell.
    let _ = self.sender.send(error);
  }

  /// Reports that the producer started.
  pub fn ready(self) {}
}

impl StartupWatch {
  /// Waits for the producer to settle its start-up signal.
  pub async fn wait(self) -> Option<SourceError> {
    self.receiver.await.ok()
  }
}

/// Configuration shared by all producers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerConfig {
  /// Optional name for identifying this producer in logs and errors.
  pub name: Option<String>,
}

/// The source of a row stream.
#[async_trait]
pub trait Producer: Send {
  /// Writes every row of the source to `pending`, then returns (dropping
  /// `pending` closes the queue).
  ///
  /// Stops early, without error, when the queue's reader has gone away.
  ///
  /// # Errors
  ///
  /// A failure after the start-up signal was settled is returned here, so
  /// the caller can tell a broken source from an exhausted one. A start-up
  /// failure goes through [`StartupSignal::fail`] instead.
  async fn produce(
    &mut self,
    pending: RowSender,
    startup: StartupSignal,
  ) -> Result<(), SourceError>;

  /// Returns the configuration.
  fn config(&self) -> &ProducerConfig;

  /// Returns the configuration mutably.
  fn config_mut(&mut self) -> &mut ProducerConfig;

  /// Sets the name for this producer.
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
        .unwrap_or_else(|| "producer".to_string()),
      type_name: std::any::type_name::<Self>().to_string(),
    }
  }
}
