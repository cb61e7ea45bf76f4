//! Loading, validating and caching the raw transaction table.

pub mod cache;
pub mod dates;
pub mod loader;
pub mod options;
pub mod record;

pub use cache::DatasetCache;
pub use loader::{load_dataset, load_from_reader, LoadOptions, LoadedDataset};
pub use options::{filter_options, FilterOptions};
pub use record::{EventType, SalesTable, TransactionRecord, REQUIRED_COLUMNS};
