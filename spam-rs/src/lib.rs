//! spam-rs: Naive Bayes spam filter
//!
//! Classifies raw RFC 822 style messages as ham or spam from corpus
//! statistics built over a labeled training set.
//!
//! # Features
//!
//! - **Parsing**: body tokenization with URL/email/symbol normalization,
//!   relay IP and send hour extraction from headers
//! - **Training**: parallel, mergeable corpus aggregation with IDF
//! - **Selection**: top-N TF-IDF tokens per message
//! - **Scoring**: smoothed log-space Naive Bayes over token, IP and hour
//!   channels
//!
//! # Example
//!
//! ```no_run
//! use spam_rs::config::ClassifierConfig;
//! use spam_rs::{CorpusAggregator, EmailParser, Label, NaiveBayesModel};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let parser = EmailParser::new()?;
//!     let training = vec![
//!         parser.parse(b"Subject: hi\n\nlunch tomorrow?").with_label(Label::Ham),
//!         parser.parse(b"Subject: $$$\n\nwin cash now").with_label(Label::Spam),
//!     ];
//!
//!     let stats = CorpusAggregator::aggregate(&training)?;
//!     let model = NaiveBayesModel::new(stats, ClassifierConfig::default())?;
//!
//!     let label = model.classify(&parser.parse(b"\n\ncash now"));
//!     println!("{}", label);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`message`]: Message parsing into feature records
//! - [`corpus`]: Corpus statistics and aggregation
//! - [`classifier`]: Feature selection and the Naive Bayes model
//! - [`dataset`]: Index files, train/dev split, record loading
//! - [`eval`]: Confusion matrix and scores
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod counts;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod label;
pub mod message;

pub use classifier::{FeatureSelector, NaiveBayesModel, Posterior};
pub use config::Config;
pub use corpus::{CorpusAggregator, CorpusStatistics};
pub use error::{Result, SpamError};
pub use label::Label;
pub use message::{EmailParser, FeatureRecord};
