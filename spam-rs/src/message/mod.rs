//! Raw email parsing into classifier features
//!
//! This module turns a raw message into a [`FeatureRecord`]: the token
//! multiset of its body, the first relay IP, and the hour it was sent.

pub mod parser;
pub mod types;

pub use parser::EmailParser;
pub use types::FeatureRecord;
