//! # RowWeave
//!
//! Streaming, composable transformations over CSV-shaped rows.
//!
//! A run moves [`Row`]s from a [`Producer`] through zero or more
//! [`Transformer`] stages into a [`Consumer`]. Every hop is a bounded tokio
//! queue, so memory stays flat whatever the input size and a slow sink
//! throttles the whole chain.
//!
//! ## Key Features
//!
//! - **Streaming**: rows are handled one at a time, never collected
//! - **Backpressure**: bounded queues between every pair of stages
//! - **Early exit**: a stage that has seen enough rows releases everything
//!   upstream of it
//! - **Stock stages**: skip, limit, column selection by index or name,
//!   `column = value` filtering, identity
//!
//! ## Quick Start
//!
//! ```rust
//! use rowweave::{ColumnStringSelector, CsvConsumer, CsvProducer, Pipeline, PipelineConfig, Predicator};
//! use std::io::Cursor;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = "city,name\nParis,ana\nLyon,bo\nParis,cy\n";
//! let mut out = CsvConsumer::new(Vec::new());
//!
//! Pipeline::new(PipelineConfig::from_env())
//!   .transformer(Predicator::new("city = Paris")?)
//!   .transformer(ColumnStringSelector::new(vec!["name".to_string()]))
//!   .execute(CsvProducer::from_reader(Cursor::new(input)), &mut out)
//!   .await?;
//!
//! assert_eq!(String::from_utf8(out.into_inner()?)?, "name\nana\ncy\n");
//! # Ok(())
//! # }
//! ```
//!
//! For a `[from, to)` window over a stream, see [`slice()`].

#![warn(missing_docs)]

/// Pipeline-wide settings.
pub mod config;
/// The sink trait.
pub mod consumer;
/// Stock consumers.
pub mod consumers;
/// Error types and exit codes.
pub mod error;
/// Chaining transformers over bounded queues.
pub mod pipeline;
/// The source trait and start-up signalling.
pub mod producer;
/// Stock producers.
pub mod producers;
/// The row value type.
pub mod row;
/// Windowed reads over a row stream.
pub mod slice;
/// The stage trait and pending queues.
pub mod transformer;
/// Stock transformers.
pub mod transformers;

#[cfg(test)]
mod transformer_test;

pub use config::{PipelineConfig, BUFFER_SIZE_ENV, DEFAULT_BUFFER_SIZE};
pub use consumer::{Consumer, ConsumerConfig};
pub use consumers::{CsvConsumer, CsvWriteConfig, VecConsumer};
pub use error::{
  ComponentInfo, ConfigError, PipelineError, RowError, SinkError, SliceError, SourceError,
  UsageError, FAILURE_EXIT_CODE, USAGE_EXIT_CODE,
};
pub use pipeline::{Pipeline, PipelineHandle, RunningPipeline};
pub use producer::{Producer, ProducerConfig, StartupSignal, StartupWatch};
pub use producers::{CsvInput, CsvProducer, CsvReadConfig, VecProducer};
pub use row::{Row, RowRef};
pub use slice::{slice, Window, UNBOUNDED};
pub use transformer::{pending_queue, RowReceiver, RowSender, Transformer, TransformerConfig};
pub use transformers::{
  ColumnIntSelector, ColumnStringSelector, Filter, IdentityTransformer, Predicate, Predicator,
  RowLimiter, RowSkipper,
};
