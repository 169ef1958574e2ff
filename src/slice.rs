//! # Slice
//!
//! Windowed read over a live row stream: skip the first `from` rows, then
//! forward the rows up to (not including) `to`, without ever holding more
//! than one queue's worth of rows in memory.
//!
//! ```rust
//! use rowweave::{slice, PipelineConfig, Row, VecConsumer, VecProducer};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rows = (0..10).map(|i| Row::from_pairs([("n", i.to_string())])).collect();
//! let mut consumer = VecConsumer::new();
//!
//! slice(VecProducer::new(rows), 3, 6, &mut consumer, &PipelineConfig::default()).await?;
//! assert_eq!(consumer.values(), vec![vec!["3"], vec!["4"], vec!["5"]]);
//! # Ok(())
//! # }
//! ```
//!
//! Stopping at `to` drops the pending queue, which stops the producer even if
//! it still has rows to give.

use crate::config::PipelineConfig;
use crate::consumer::Consumer;
use crate::error::{ComponentInfo, PipelineError, SliceError, SourceError, UsageError};
use crate::producer::{Producer, StartupSignal};
use crate::transformer::{pending_queue, Transformer};
use crate::transformers::RowLimiter;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

/// `to` value meaning "until the end of the stream".
pub const UNBOUNDED: i64 = -1;

/// A validated `[from, to)` row range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
  /// Rows to discard before the window starts.
  pub from: u64,
  /// First row past the window, or `None` for an open window.
  pub to: Option<u64>,
}

impl Window {
  /// Validates a window given as signed offsets, with `to == -1` meaning
  /// unbounded.
  ///
  /// # Errors
  ///
  /// [`UsageError::InvalidRange`] when a bounded `to` is not greater than
  /// `from`, else [`UsageError::NegativeFrom`] when `from < 0`.
  pub fn new(from: i64, to: i64) -> Result<Self, UsageError> {
    if to != UNBOUNDED && to <= from {
      return Err(UsageError::InvalidRange { from, to });
    }
    let from = u64::try_from(from).map_err(|_| UsageError::NegativeFrom { from })?;
    let to = if to == UNBOUNDED {
      None
    } else {
      // to > from >= 0 here.
      Some(to.unsigned_abs())
    };
    Ok(Self { from, to })
  }

  /// Number of rows in the window, `None` when unbounded.
  pub fn len(&self) -> Option<u64> {
    self.to.map(|to| to - self.from)
  }

  /// Whether the window ends before the stream does.
  pub fn is_bounded(&self) -> bool {
    self.to.is_some()
  }
}

/// Writes rows `[from, to)` of `producer` to `consumer`.
///
/// The window is validated before the producer is started. Reaching the end
/// of the stream inside the window is not an error; reaching it before
/// `from` is.
///
/// # Errors
///
/// - [`SliceError::Usage`] for an invalid window;
/// - [`SliceError::Startup`] when the producer fails to start;
/// - [`SliceError::Source`] when the producer fails after starting, even if
///   part of the window was already written;
/// - [`SliceError::BeginningNotReached`] when the stream holds fewer than
///   `from` rows;
/// - [`SliceError::Sink`] when the consumer fails.
pub async fn slice<P, C>(
  mut producer: P,
  from: i64,
  to: i64,
  consumer: &mut C,
  config: &PipelineConfig,
) -> Result<(), SliceError>
where
  P: Producer + 'static,
  C: Consumer + ?Sized,
{
  let window = Window::new(from, to).inspect_err(|e| error!(error = %e, "invalid window"))?;
  debug!(from = window.from, to = ?window.to, "slicing");

  let (pending, mut pending_rx) = pending_queue(config.buffer_size);
  let (startup, watch) = StartupSignal::channel();
  let source_info = producer.component_info();
  let source = tokio::spawn(async move { producer.produce(pending, startup).await });

  if let Some(e) = watch.wait().await {
    error!(producer = %source_info.name, error = %e, "source failed to start");
    return Err(SliceError::Startup(e));
  }

  let mut read = 0u64;
  while read < window.from {
    if pending_rx.recv().await.is_none() {
      // A failing source also ends the stream early.
      drop(pending_rx);
      finish_source(source, source_info).await?;
      debug!(from = window.from, read, "stream ended before window");
      return Err(SliceError::BeginningNotReached {
        from: window.from,
        read,
      });
    }
    trace!(row = read, "discarded");
    read += 1;
  }

  match window.len() {
    None => consumer.consume(pending_rx).await?,
    Some(len) => {
      let limit = usize::try_from(len).unwrap_or(usize::MAX);
      let mut limiter = RowLimiter::new(limit).with_name("slice".to_string());
      let (window_tx, window_rx) = pending_queue(config.buffer_size);
      let (limited, consumed) = tokio::join!(
        limiter.transform(pending_rx, window_tx),
        consumer.consume(window_rx)
      );
      limited.map_err(|source| PipelineError::Stage {
        component: limiter.component_info(),
        source,
      })?;
      consumed?;
    }
  }

  finish_source(source, source_info).await
}

async fn finish_source(
  source: JoinHandle<Result<(), SourceError>>,
  source_info: ComponentInfo,
) -> Result<(), SliceError> {
  match source.await {
    Ok(Ok(())) => Ok(()),
    Ok(Err(e)) => {
      error!(producer = %source_info.name, error = %e, "source failed");
      Err(SliceError::Source(e))
    }
    Err(_) => {
      error!(producer = %source_info.name, "source task did not complete");
      Err(
        PipelineError::Panicked {
          component: source_info,
        }
        .into(),
      )
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_window_bounded() {
    let w = Window::new(3, 6).unwrap();
    assert_eq!(w, Window { from: 3, to: Some(6) });
    assert_eq!(w.len(), Some(3));
    assert!(w.is_bounded());
  }

  #[test]
  fn test_window_unbounded() {
    let w = Window::new(0, UNBOUNDED).unwrap();
    assert_eq!(w.to, None);
    assert_eq!(w.len(), None);
  }

  #[test]
  fn test_window_to_not_after_from() {
    assert_eq!(
      Window::new(5, 3),
      Err(UsageError::InvalidRange { from: 5, to: 3 })
    );
    assert_eq!(
      Window::new(4, 4),
      Err(UsageError::InvalidRange { from: 4, to: 4 })
    );
    assert_eq!(
      Window::new(0, -2),
      Err(UsageError::InvalidRange { from: 0, to: -2 })
    );
  }

  #[test]
  fn test_window_negative_from() {
    assert_eq!(
      Window::new(-1, UNBOUNDED),
      Err(UsageError::NegativeFrom { from: -1 })
    );
    assert_eq!(
      Window::new(-3, 2),
      Err(UsageError::NegativeFrom { from: -3 })
    );
  }
}
