//! # Error Handling
//!
//! Error types for rows, stages, sources, sinks and the operations that tie
//! them together.
//!
//! ## Taxonomy
//!
//! - **[`UsageError`]**: the caller asked for an impossible window. Detected
//!   before any row is read.
//! - **[`SourceError`]**: a producer failed. When it happens before any row is
//!   produced it is reported through the start-up signal and aborts the run.
//!   Later failures are returned by the producer and fail the run too: a
//!   truncated stream is never reported as success.
//! - **[`ConfigError`]**: an unknown column, an out-of-range column index or a
//!   predicate that does not parse. Raised at construction time when the
//!   problem is static, and from the first offending row otherwise.
//! - **[`SliceError::BeginningNotReached`]**: the stream ended before the
//!   window began. This depends on the data, not on the arguments.
//!
//! Nothing is retried: a run is a single pass over its input. Errors are
//! returned to the nearest caller, and [`SliceError::exit_code`] /
//! [`PipelineError::exit_code`] map them to process exit statuses (2 for
//! usage errors, 1 for everything else).

use std::fmt;
use thiserror::Error;

/// Exit status for invalid arguments.
pub const USAGE_EXIT_CODE: i32 = 2;

/// Exit status for every other failure.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Identifies a pipeline component in logs and errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
  /// The configured name, or a default derived from the component kind.
  pub name: String,
  /// The Rust type name of the component.
  pub type_name: String,
}

impl ComponentInfo {
  /// Creates a new `ComponentInfo` with the given name and type name.
  pub fn new(name: String, type_name: String) -> Self {
    Self { name, type_name }
  }
}

impl fmt::Display for ComponentInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.name, self.type_name)
  }
}

/// A row was built with a different number of values than columns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
  /// Names and values differ in length.
  #[error("row has {columns} columns but {values} values")]
  LengthMismatch {
    /// Number of column names.
    columns: usize,
    /// Number of values.
    values: usize,
  },
}

/// Fatal configuration or schema error raised by a transformer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
  /// A column was requested by name but the row has no such column.
  #[error("column {column:?} not found")]
  UnknownColumn {
    /// The requested column name.
    column: String,
  },
  /// A column was requested by position past the end of the row.
  #[error("index {index} exceeds row length ({len})")]
  IndexOutOfRange {
    /// The requested position.
    index: usize,
    /// Number of columns in the row.
    len: usize,
  },
  /// A predicate is not of the form `column = value`.
  #[error("predicate parsing error: {predicate:?} is not of the form \"column = value\"")]
  PredicateParse {
    /// The rejected predicate text.
    predicate: String,
  },
}

/// The caller supplied an invalid window.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
  /// A bounded `to` must be strictly greater than `from`.
  #[error("--to ({to}) must be greater than --from ({from})")]
  InvalidRange {
    /// Window start.
    from: i64,
    /// Window end.
    to: i64,
  },
  /// `from` must not be negative.
  #[error("--from ({from}) must be greater than or equal to 0")]
  NegativeFrom {
    /// Window start.
    from: i64,
  },
}

/// Failure reading rows from a source.
#[derive(Error, Debug)]
pub enum SourceError {
  /// Underlying I/O failure.
  #[error("failed to read input: {0}")]
  Io(#[from] std::io::Error),
  /// Malformed CSV.
  #[error("failed to parse input: {0}")]
  Csv(#[from] csv::Error),
  /// A record could not become a row.
  #[error(transparent)]
  Row(#[from] RowError),
}

/// Failure writing rows to a sink.
#[derive(Error, Debug)]
pub enum SinkError {
  /// Underlying I/O failure.
  #[error("failed to write output: {0}")]
  Io(#[from] std::io::Error),
  /// CSV encoding failure.
  #[error("failed to encode output: {0}")]
  Csv(#[from] csv::Error),
  /// A row's column names differ from the header already written.
  #[error("row columns {found:?} do not match header {expected:?}")]
  HeaderMismatch {
    /// The header written for the first row.
    expected: Vec<String>,
    /// The offending row's column names.
    found: Vec<String>,
  },
}

/// Failure of a composed pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
  /// The source could not start.
  #[error("source failed to start: {0}")]
  Startup(#[source] SourceError),
  /// The source failed after rows had started flowing.
  #[error("source failed: {0}")]
  Source(#[source] SourceError),
  /// A stage hit a configuration or schema error.
  #[error("stage {component} failed: {source}")]
  Stage {
    /// The failing stage.
    component: ComponentInfo,
    /// What went wrong.
    #[source]
    source: ConfigError,
  },
  /// A stage task panicked or was aborted.
  #[error("stage {component} did not complete")]
  Panicked {
    /// The failing stage.
    component: ComponentInfo,
  },
  /// The consumer failed.
  #[error(transparent)]
  Sink(#[from] SinkError),
}

impl PipelineError {
  /// Process exit status for this error.
  #[must_use]
  pub fn exit_code(&self) -> i32 {
    FAILURE_EXIT_CODE
  }
}

/// Failure of the [`slice`](crate::slice::slice) operation.
#[derive(Error, Debug)]
pub enum SliceError {
  /// The window is invalid. Reported before any row is read.
  #[error(transparent)]
  Usage(#[from] UsageError),
  /// The source could not start.
  #[error("source failed to start: {0}")]
  Startup(#[source] SourceError),
  /// The source failed after rows had started flowing.
  #[error("source failed: {0}")]
  Source(#[source] SourceError),
  /// The stream ended before `from` rows were discarded.
  #[error("slice beginning not reached: wanted to skip {from} rows, input had {read}")]
  BeginningNotReached {
    /// Requested window start.
    from: u64,
    /// Rows available before end of stream.
    read: u64,
  },
  /// Writing the window failed.
  #[error(transparent)]
  Sink(#[from] SinkError),
  /// The stage bounding the window failed.
  #[error(transparent)]
  Pipeline(#[from] PipelineError),
}

impl SliceError {
  /// Process exit status for this error: 2 for usage errors, 1 otherwise.
  #[must_use]
  pub fn exit_code(&self) -> i32 {
    match self {
      SliceError::Usage(_) => USAGE_EXIT_CODE,
      _ => FAILURE_EXIT_CODE,
    }
  }
}
