//! Stock producers.

/// CSV inputs.
pub mod csv_producer;
/// In-memory rows.
pub mod vec_producer;

pub use csv_producer::{CsvInput, CsvProducer, CsvReadConfig};
pub use vec_producer::VecProducer;
