use crate::error::ConfigError;
use crate::transformer::{RowReceiver, RowSender, Transformer, TransformerConfig};
use async_trait::async_trait;
use tracing::debug;

/// Forwards every row unchanged. Used as a no-op stage.
#[derive(Debug, Clone, Default)]
pub struct IdentityTransformer {
  /// Configuration for the transformer.
  pub config: TransformerConfig,
}

impl IdentityTransformer {
  /// Creates a pass-through stage.
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Transformer for IdentityTransformer {
  async fn transform(
    &mut self,
    mut input: RowReceiver,
    output: RowSender,
  ) -> Result<(), ConfigError> {
    while let Some(row) = input.recv().await {
      if output.send(row).await.is_err() {
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
