pub mod common;
pub mod dashboard;
pub mod export;
pub mod options;
pub mod session;
