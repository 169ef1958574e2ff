//! Pipeline-wide settings.
//!
//! The only tunable today is the capacity of the bounded queues that connect
//! a source, each transformer stage and the final consumer. A smaller buffer
//! tightens backpressure; a larger one lets fast stages run further ahead.

use tracing::warn;

/// Capacity of every pending queue unless configured otherwise.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Environment variable consulted by [`PipelineConfig::from_env`].
pub const BUFFER_SIZE_ENV: &str = "ROWWEAVE_BUFFER_SIZE";

/// Settings shared by every queue created while wiring a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
  /// Capacity of each bounded queue. Always at least 1.
  pub buffer_size: usize,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      buffer_size: DEFAULT_BUFFER_SIZE,
    }
  }
}

impl PipelineConfig {
  /// Sets the queue capacity. Zero is bumped to 1, since tokio channels
  /// cannot be unbuffered.
  #[must_use]
  pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
    self.buffer_size = buffer_size.max(1);
    self
  }

  /// Defaults, overridden by `ROWWEAVE_BUFFER_SIZE` when it holds a positive
  /// integer.
  #[must_use]
  pub fn from_env() -> Self {
    Self::from_env_value(std::env::var(BUFFER_SIZE_ENV).ok().as_deref())
  }

  fn from_env_value(value: Option<&str>) -> Self {
    let config = Self::default();
    let Some(raw) = value else {
      return config;
    };
    match raw.trim().parse::<usize>() {
      Ok(size) if size > 0 => config.with_buffer_size(size),
      _ => {
        warn!(
          value = raw,
          "ignoring invalid {}, using {}", BUFFER_SIZE_ENV, DEFAULT_BUFFER_SIZE
        );
        config
      }
    }
  }
}
