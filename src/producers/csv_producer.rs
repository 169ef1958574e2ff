//! CSV producer.
//!
//! [`CsvProducer`] reads one or more CSV inputs, one after the other, and
//! turns every record into a [`Row`]. The first record of each input is its
//! header; every row from that input shares the header's column names.
//!
//! Parsing runs on a blocking thread with the `csv` crate and hands rows to
//! the async side with `blocking_send`, so a full queue parks the reader
//! thread and a dropped queue stops it.
//!
//! Failing to read the first input's header is a start-up error. Once rows
//! are flowing, a read or parse failure (including a later input's header)
//! stops the stream and is returned from [`Producer::produce`]. Empty inputs
//! contribute no rows.

use crate::error::SourceError;
use crate::producer::{Producer, ProducerConfig, StartupSignal};
use crate::row::Row;
use crate::transformer::RowSender;
use async_trait::async_trait;
use csv::{StringRecord, Trim};
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, error};

/// Configuration for CSV reading behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvReadConfig {
  /// The delimiter character (default: comma).
  pub delimiter: u8,
  /// The quote character (default: double quote).
  pub quote: u8,
  /// Whether to allow records whose length differs from the header's.
  /// Such records are still rejected when they become rows.
  pub flexible: bool,
  /// Whether to trim whitespace from fields.
  pub trim: bool,
}

impl Default for CsvReadConfig {
  fn default() -> Self {
    Self {
      delimiter: b',',
      quote: b'"',
      flexible: false,
      trim: false,
    }
  }
}

impl CsvReadConfig {
  /// Sets the delimiter character.
  #[must_use]
  pub fn with_delimiter(mut self, delimiter: u8) -> Self {
    self.delimiter = delimiter;
    self
  }

  /// Sets whether to trim whitespace from fields.
  #[must_use]
  pub fn with_trim(mut self, trim: bool) -> Self {
    self.trim = trim;
    self
  }

  /// Sets whether to allow flexible column counts.
  #[must_use]
  pub fn with_flexible(mut self, flexible: bool) -> Self {
    self.flexible = flexible;
    self
  }

  fn reader<R: Read>(&self, input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
      .has_headers(false)
      .delimiter(self.delimiter)
      .quote(self.quote)
      .flexible(self.flexible)
      .trim(if self.trim { Trim::All } else { Trim::None })
      .from_reader(input)
  }
}

/// Boxed byte source accepted by [`CsvProducer`].
pub type CsvInput = Box<dyn Read + Send>;

/// A producer that parses rows from CSV byte streams.
///
/// Inputs are consumed by the first run; producing again yields no rows.
pub struct CsvProducer {
  inputs: Vec<CsvInput>,
  /// CSV-specific configuration.
  pub csv_config: CsvReadConfig,
  /// Configuration for the producer.
  pub config: ProducerConfig,
}

impl CsvProducer {
  /// Creates a producer reading `inputs` one after the other.
  pub fn new(inputs: Vec<CsvInput>) -> Self {
    Self {
      inputs,
      csv_config: CsvReadConfig::default(),
      config: ProducerConfig::default(),
    }
  }

  /// Convenience constructor for a single input.
  pub fn from_reader<R: Read + Send + 'static>(input: R) -> Self {
    Self::new(vec![Box::new(input)])
  }

  /// Sets the CSV-specific configuration.
  #[must_use]
  pub fn with_csv_config(mut self, csv_config: CsvReadConfig) -> Self {
    self.csv_config = csv_config;
    self
  }
}

impl std::fmt::Debug for CsvProducer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CsvProducer")
      .field("inputs", &self.inputs.len())
      .field("csv_config", &self.csv_config)
      .field("config", &self.config)
      .finish()
  }
}

#[async_trait]
impl Producer for CsvProducer {
  async fn produce(
    &mut self,
    pending: RowSender,
    startup: StartupSignal,
  ) -> Result<(), SourceError> {
    let inputs = std::mem::take(&mut self.inputs);
    let csv_config = self.csv_config.clone();
    let name = self.component_info().name;

    let handle = tokio::task::spawn_blocking({
      let name = name.clone();
      move || read_inputs(inputs, &csv_config, &pending, startup, &name)
    });
    match handle.await {
      Ok(result) => result,
      Err(e) => {
        error!(producer = %name, error = %e, "CSV reader thread failed");
        Err(SourceError::Io(std::io::Error::other(e)))
      }
    }
  }

  fn config(&self) -> &ProducerConfig {
    &self.config
  }

  fn config_mut(&mut self) -> &mut ProducerConfig {
    &mut self.config
  }
}

/// Why an input stopped early.
enum Halt {
  /// The queue's reader is gone.
  Closed,
  /// The input could not be read.
  Failed(SourceError),
}

fn read_inputs(
  inputs: Vec<CsvInput>,
  csv_config: &CsvReadConfig,
  pending: &RowSender,
  startup: StartupSignal,
  name: &str,
) -> Result<(), SourceError> {
  let mut startup = Some(startup);
  let mut produced = 0usize;

  for (index, input) in inputs.into_iter().enumerate() {
    let mut reader = csv_config.reader(input);
    let header = match read_header(&mut reader) {
      Ok(header) => header,
      Err(e) => {
        return match startup.take() {
          Some(signal) => {
            signal.fail(e);
            Ok(())
          }
          None => {
            error!(producer = %name, input = index, produced, error = %e, "cannot read header");
            Err(e)
          }
        };
      }
    };
    if let Some(signal) = startup.take() {
      signal.ready();
    }
    let Some(names) = header else {
      debug!(producer = %name, input = index, "empty input");
      continue;
    };

    match send_records(&mut reader, &names, pending, &mut produced) {
      Ok(()) => {}
      Err(Halt::Closed) => {
        debug!(producer = %name, produced, "reader closed, stopping");
        return Ok(());
      }
      Err(Halt::Failed(e)) => {
        error!(producer = %name, input = index, produced, error = %e, "input failed");
        return Err(e);
      }
    }
  }
  debug!(producer = %name, produced, "exhausted");
  Ok(())
}

/// Reads the header record. `Ok(None)` means the input is empty.
fn read_header<R: Read>(reader: &mut csv::Reader<R>) -> Result<Option<Arc<[String]>>, SourceError> {
  let mut record = StringRecord::new();
  if !reader.read_record(&mut record)? {
    return Ok(None);
  }
  Ok(Some(record.iter().map(str::to_string).collect()))
}

fn send_records<R: Read>(
  reader: &mut csv::Reader<R>,
  names: &Arc<[String]>,
  pending: &RowSender,
  produced: &mut usize,
) -> Result<(), Halt> {
  let mut record = StringRecord::new();
  loop {
    match reader.read_record(&mut record) {
      Ok(true) => {}
      Ok(false) => return Ok(()),
      Err(e) => return Err(Halt::Failed(e.into())),
    }
    let values = record.iter().map(str::to_string).collect();
    let row = Row::new(Arc::clone(names), values).map_err(|e| Halt::Failed(e.into()))?;
    pending
      .blocking_send(Arc::new(row))
      .map_err(|_| Halt::Closed)?;
    *produced += 1;
  }
}
