//! CSV consumer.
//!
//! [`CsvConsumer`] writes the column names of the first row it receives as a
//! header line, then one record per row. The writer is flushed when the input
//! closes.
//!
//! Every later row must carry the same column names, otherwise its values
//! would land under the wrong header. A row that does not is rejected with
//! [`SinkError::HeaderMismatch`]. Without a header line only the number of
//! values has to stay the same.

use crate::consumer::{Consumer, ConsumerConfig};
use crate::error::SinkError;
use crate::transformer::RowReceiver;
use async_trait::async_trait;
use csv::WriterBuilder;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, error};

/// Configuration for CSV writing behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvWriteConfig {
  /// Whether to write a header row.
  pub write_headers: bool,
  /// The delimiter character (default: comma).
  pub delimiter: u8,
  /// Whether to flush after each record.
  pub flush_on_write: bool,
}

impl Default for CsvWriteConfig {
  fn default() -> Self {
    Self {
      write_headers: true,
      delimiter: b',',
      flush_on_write: false,
    }
  }
}

impl CsvWriteConfig {
  /// Sets whether to write a header row.
  #[must_use]
  pub fn with_headers(mut self, write_headers: bool) -> Self {
    self.write_headers = write_headers;
    self
  }

  /// Sets the delimiter character.
  #[must_use]
  pub fn with_delimiter(mut self, delimiter: u8) -> Self {
    self.delimiter = delimiter;
    self
  }

  /// Sets whether to flush after each record.
  #[must_use]
  pub fn with_flush_on_write(mut self, flush: bool) -> Self {
    self.flush_on_write = flush;
    self
  }
}

/// A consumer that encodes rows as CSV into any writer.
pub struct CsvConsumer<W: Write + Send> {
  writer: csv::Writer<W>,
  csv_config: CsvWriteConfig,
  header: Option<Arc<[String]>>,
  /// Configuration for the consumer.
  pub config: ConsumerConfig,
}

impl<W: Write + Send> CsvConsumer<W> {
  /// Creates a comma-separated writer with a header line.
  pub fn new(writer: W) -> Self {
    Self::with_csv_config(writer, CsvWriteConfig::default())
  }

  /// Creates a writer with the given CSV settings.
  pub fn with_csv_config(writer: W, csv_config: CsvWriteConfig) -> Self {
    let writer = WriterBuilder::new()
      .has_headers(false)
      .delimiter(csv_config.delimiter)
      .from_writer(writer);
    Self {
      writer,
      csv_config,
      header: None,
      config: ConsumerConfig::default(),
    }
  }

  /// Flushes and returns the underlying writer.
  ///
  /// # Errors
  ///
  /// Returns the flush failure, if any.
  pub fn into_inner(self) -> Result<W, SinkError> {
    self
      .writer
      .into_inner()
      .map_err(|e| SinkError::Io(e.into_error()))
  }
}

#[async_trait]
impl<W: Write + Send> Consumer for CsvConsumer<W> {
  async fn consume(&mut self, mut input: RowReceiver) -> Result<(), SinkError> {
    let mut written = 0usize;
    while let Some(row) = input.recv().await {
      if self.csv_config.write_headers {
        let names = row.column_names();
        if let Some(header) = &self.header {
          // Rows from one input share their names, so the pointer check
          // usually settles it.
          if !Arc::ptr_eq(header, names) && **header != **names {
            let err = SinkError::HeaderMismatch {
              expected: header.to_vec(),
              found: names.to_vec(),
            };
            error!(consumer = %self.component_info().name, written, error = %err, "row rejected");
            return Err(err);
          }
        } else {
          self.writer.write_record(names.iter())?;
          self.header = Some(Arc::clone(names));
        }
      }
      if let Err(e) = self.writer.write_record(row.values()) {
        error!(consumer = %self.component_info().name, written, error = %e, "write failed");
        return Err(e.into());
      }
      if self.csv_config.flush_on_write {
        self.writer.flush()?;
      }
      written += 1;
    }
    self.writer.flush()?;
    debug!(consumer = %self.component_info().name, written, "output flushed");
    Ok(())
  }

  fn config(&self) -> &ConsumerConfig {
    &self.config
  }

  fn config_mut(&mut self) -> &mut ConsumerConfig {
    &mut self.config
  }
}
