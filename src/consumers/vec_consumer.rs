use crate::consumer::{Consumer, ConsumerConfig};
use crate::error::SinkError;
use crate::row::RowRef;
use crate::transformer::RowReceiver;
use async_trait::async_trait;

/// A consumer that collects every row handle it receives.
#[derive(Debug, Clone, Default)]
pub struct VecConsumer {
  /// Rows received so far, in arrival order.
  pub rows: Vec<RowRef>,
  /// Configuration for the consumer.
  pub config: ConsumerConfig,
}

impl VecConsumer {
  /// Creates an empty collector.
  pub fn new() -> Self {
    Self::default()
  }

  /// The collected rows' values, handy for assertions.
  pub fn values(&self) -> Vec<Vec<String>> {
    self.rows.iter().map(|row| row.values().to_vec()).collect()
  }

  /// Gives up the collected rows.
  pub fn into_rows(self) -> Vec<RowRef> {
    self.rows
  }
}

#[async_trait]
impl Consumer for VecConsumer {
  async fn consume(&mut self, mut input: RowReceiver) -> Result<(), SinkError> {
    while let Some(row) = input.recv().await {
      self.rows.push(row);
    }
    Ok(())
  }

  fn config(&self) -> &ConsumerConfig {
    &self.config
  }

  fn config_mut(&mut self) -> &mut ConsumerConfig {
    &mut self.config
  }
}
