pub mod aggregator;
pub mod cache;
pub mod cleaner;
pub mod datasets;
pub mod error;
pub mod parser;
pub mod storage;
