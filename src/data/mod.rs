//! Tabular data handling: in-memory frames and dataset providers.

pub mod frame;
pub mod provider;

pub use frame::DataFrame;
pub use provider::{CsvFileProvider, DatasetProvider, InMemoryProvider, ProviderInfo};
