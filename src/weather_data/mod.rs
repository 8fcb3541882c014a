pub mod aggregator;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod stats;
