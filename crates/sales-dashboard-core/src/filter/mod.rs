//! Turning user-selected criteria into the working and purchase subsets.

pub mod criteria;
pub mod engine;

pub use criteria::FilterCriteria;
pub use engine::{apply_filters, is_successful_purchase, validate_criteria, Subsets};
