//! Stock consumers.

/// CSV output.
pub mod csv_consumer;
/// In-memory collection.
pub mod vec_consumer;

pub use csv_consumer::{CsvConsumer, CsvWriteConfig};
pub use vec_consumer::VecConsumer;
