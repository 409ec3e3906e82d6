//! Corpus statistics
//!
//! Aggregates labeled feature records into the count and IDF tables the
//! classifier is built from.

pub mod aggregator;
pub mod stats;

pub use aggregator::CorpusAggregator;
pub use stats::CorpusStatistics;
