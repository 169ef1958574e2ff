//! Vector producer.
//!
//! [`VecProducer`] replays an in-memory list of rows, in order. The rows are
//! kept, so the same producer can feed several runs.

use crate::error::SourceError;
use crate::producer::{Producer, ProducerConfig, StartupSignal};
use crate::row::{Row, RowRef};
use crate::transformer::RowSender;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// A producer that yields rows from a `Vec`.
#[derive(Debug, Clone, Default)]
pub struct VecProducer {
  /// The rows to produce.
  pub rows: Vec<RowRef>,
  /// Configuration for the producer.
  pub config: ProducerConfig,
}

impl VecProducer {
  /// Creates a producer replaying `rows`.
  pub fn new(rows: Vec<Row>) -> Self {
    Self {
      rows: rows.into_iter().map(Arc::new).collect(),
      config: ProducerConfig::default(),
    }
  }
}

#[async_trait]
impl Producer for VecProducer {
  async fn produce(
    &mut self,
    pending: RowSender,
    startup: StartupSignal,
  ) -> Result<(), SourceError> {
    startup.ready();
    let mut produced = 0usize;
    for row in &self.rows {
      if pending.send(Arc::clone(row)).await.is_err() {
        debug!(producer = %self.component_info().name, produced, "reader closed, stopping");
        return Ok(());
      }
      produced += 1;
    }
    debug!(producer = %self.component_info().name, produced, "exhausted");
    Ok(())
  }

  fn config(&self) -> &ProducerConfig {
    &self.config
  }

  fn config_mut(&mut self) -> &mut ProducerConfig {
    &mut self.config
  }
}
