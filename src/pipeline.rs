//! # Pipeline Composition
//!
//! A [`Pipeline`] is an ordered list of transformers. Running it spawns one
//! tokio task per stage and connects neighbouring stages with a bounded
//! pending queue of [`PipelineConfig::buffer_size`] rows:
//!
//! ```text
//! producer -> [queue] -> stage 1 -> [queue] -> stage 2 -> [queue] -> consumer
//! ```
//!
//! Each queue has one writer and one reader. A full queue parks its writer, so
//! a slow consumer throttles the whole chain. Stages only share the queues.
//!
//! When a stage fails it drops both its queues: downstream stages see an
//! early end of stream and upstream stages see their sends fail, so the whole
//! run winds down. [`PipelineHandle::join`] then reports the failure.
//!
//! ## Example
//!
//! ```rust
//! use rowweave::{Pipeline, PipelineConfig, Row, RowSkipper, RowLimiter, VecConsumer, VecProducer};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rows = (0..10).map(|i| Row::from_pairs([("n", i.to_string())])).collect();
//! let mut consumer = VecConsumer::new();
//!
//! Pipeline::new(PipelineConfig::default())
//!   .transformer(RowSkipper::new(2))
//!   .transformer(RowLimiter::new(3))
//!   .execute(VecProducer::new(rows), &mut consumer)
//!   .await?;
//!
//! assert_eq!(consumer.values(), vec![vec!["2"], vec!["3"], vec!["4"]]);
//! # Ok(())
//! # }
//! ```

use crate::config::PipelineConfig;
use crate::consumer::Consumer;
use crate::error::{ComponentInfo, ConfigError, PipelineError};
use crate::producer::{Producer, StartupSignal};
use crate::row::RowRef;
use crate::transformer::{pending_queue, RowReceiver, Transformer};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

/// An ordered chain of transformers, not yet running.
pub struct Pipeline {
  config: PipelineConfig,
  stages: Vec<Box<dyn Transformer>>,
}

impl Default for Pipeline {
  fn default() -> Self {
    Self::new(PipelineConfig::default())
  }
}

impl Pipeline {
  /// Creates an empty pipeline whose queues hold `config.buffer_size` rows.
  pub fn new(config: PipelineConfig) -> Self {
    Self {
      config,
      stages: Vec::new(),
    }
  }

  /// Appends a stage.
  #[must_use]
  pub fn transformer<T>(self, transformer: T) -> Self
  where
    T: Transformer + 'static,
  {
    self.boxed_transformer(Box::new(transformer))
  }

  /// Appends an already boxed stage.
  #[must_use]
  pub fn boxed_transformer(mut self, transformer: Box<dyn Transformer>) -> Self {
    self.stages.push(transformer);
    self
  }

  /// The settings every stage is configured with.
  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  /// Number of stages.
  pub fn len(&self) -> usize {
    self.stages.len()
  }

  /// Whether no stage was added.
  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }

  /// Spawns every stage, reading from `input`.
  ///
  /// Must be called from within a tokio runtime. Each stage is handed the
  /// pipeline config through [`Transformer::configure`] before it starts.
  /// With no stages the input queue is handed back as the output.
  pub fn spawn(self, input: RowReceiver) -> RunningPipeline {
    let mut upstream = input;
    let mut stages = Vec::with_capacity(self.stages.len());

    for (position, mut stage) in self.stages.into_iter().enumerate() {
      stage.configure(&self.config);
      let (output, downstream) = pending_queue(self.config.buffer_size);
      let component = stage.component_info();
      debug!(stage = %component.name, position, "spawning stage");

      let name = component.name.clone();
      let task = tokio::spawn(async move {
        let result = stage.transform(upstream, output).await;
        match &result {
          Ok(()) => debug!(stage = %name, "stage finished"),
          Err(e) => error!(stage = %name, error = %e, "stage failed"),
        }
        result
      });

      stages.push(StageTask { component, task });
      upstream = downstream;
    }

    RunningPipeline {
      output: upstream,
      handle: PipelineHandle { stages },
    }
  }

  /// Runs `producer` through every stage into `consumer`.
  ///
  /// A producer start-up failure is returned before any stage is spawned.
  ///
  /// # Errors
  ///
  /// A source failure wins, since it is what cut the stream short. Then the
  /// first failing stage in pipeline order, then the consumer. A consumer
  /// failure makes upstream stages stop without error.
  pub async fn execute<P, C>(self, mut producer: P, consumer: &mut C) -> Result<(), PipelineError>
  where
    P: Producer + 'static,
    C: Consumer + ?Sized,
  {
    let (pending, pending_rx) = pending_queue(self.config.buffer_size);
    let (startup, watch) = StartupSignal::channel();
    let source_info = producer.component_info();
    let source = tokio::spawn(async move { producer.produce(pending, startup).await });

    if let Some(e) = watch.wait().await {
      error!(producer = %source_info.name, error = %e, "source failed to start");
      return Err(PipelineError::Startup(e));
    }

    let (output, handle) = self.spawn(pending_rx).into_parts();
    let (consumed, joined) = tokio::join!(consumer.consume(output), handle.join());

    match source.await {
      Ok(Ok(())) => {}
      Ok(Err(e)) => {
        error!(producer = %source_info.name, error = %e, "source failed");
        return Err(PipelineError::Source(e));
      }
      Err(_) => {
        error!(producer = %source_info.name, "source task did not complete");
        return Err(PipelineError::Panicked {
          component: source_info,
        });
      }
    }
    joined?;
    consumed?;
    Ok(())
  }
}

struct StageTask {
  component: ComponentInfo,
  task: JoinHandle<Result<(), ConfigError>>,
}

/// A spawned pipeline: its final queue plus a handle on its stage tasks.
pub struct RunningPipeline {
  /// Read end of the last stage's output queue.
  pub output: RowReceiver,
  /// Handle used to wait for the stages.
  pub handle: PipelineHandle,
}

impl RunningPipeline {
  /// Splits into the final queue and the stage handle.
  pub fn into_parts(self) -> (RowReceiver, PipelineHandle) {
    (self.output, self.handle)
  }

  /// Exposes the final queue as a [`futures::Stream`].
  pub fn into_stream(self) -> (ReceiverStream<RowRef>, PipelineHandle) {
    (ReceiverStream::new(self.output), self.handle)
  }

  /// Drains the final queue, then waits for every stage.
  ///
  /// # Errors
  ///
  /// The first stage failure, even if rows were already collected.
  pub async fn collect(self) -> Result<Vec<RowRef>, PipelineError> {
    let (mut output, handle) = self.into_parts();
    let mut rows = Vec::new();
    while let Some(row) = output.recv().await {
      rows.push(row);
    }
    handle.join().await?;
    Ok(rows)
  }
}

/// Waits on the tasks of a spawned pipeline.
pub struct PipelineHandle {
  stages: Vec<StageTask>,
}

impl PipelineHandle {
  /// Names of the running stages, in pipeline order.
  pub fn components(&self) -> impl Iterator<Item = &ComponentInfo> {
    self.stages.iter().map(|s| &s.component)
  }

  /// Waits for every stage to finish.
  ///
  /// The final queue must be drained or dropped concurrently, otherwise the
  /// last stage can block on a full queue forever.
  ///
  /// # Errors
  ///
  /// The failure of the earliest failing stage.
  pub async fn join(self) -> Result<(), PipelineError> {
    let (components, tasks): (Vec<_>, Vec<_>) = self
      .stages
      .into_iter()
      .map(|s| (s.component, s.task))
      .unzip();
    let results = futures::future::join_all(tasks).await;

    for (component, result) in components.into_iter().zip(results) {
      match result {
        Ok(Ok(())) => {}
        Ok(Err(source)) => return Err(PipelineError::Stage { component, source }),
        Err(e) => {
          error!(stage = %component.name, error = %e, "stage task did not complete");
          return Err(PipelineError::Panicked { component });
        }
      }
    }
    Ok(())
  }
}
