//! Naive Bayes classification
//!
//! Scores emails with a multinomial Naive Bayes model over body tokens,
//! optionally combined with relay IP and send hour evidence.
//!
//! - [`selector`]: TF-IDF ranking that keeps the most informative tokens
//! - [`model`]: smoothed log-posterior scoring and arg-max decision

pub mod model;
pub mod selector;

pub use model::{NaiveBayesModel, Posterior, Precomputed};
pub use selector::FeatureSelector;
