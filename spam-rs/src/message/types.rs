use crate::counts::TokenCounts;
use crate::label::Label;

/// Features extracted from one email
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    /// Body token multiset
    pub tokens: TokenCounts,
    /// First dotted-quad found on a `Received: from` header
    pub ip: Option<String>,
    /// Hour component of the `Date:` header (e.g. "14")
    pub hour: Option<String>,
    /// Ground truth, present only for training and evaluation records
    pub label: Option<Label>,
}

impl FeatureRecord {
    pub fn new(tokens: TokenCounts) -> Self {
        FeatureRecord {
            tokens,
            ..Default::default()
        }
    }

    /// Build a record straight from a token list
    pub fn from_tokens<S: AsRef<str>>(tokens: impl IntoIterator<Item = S>) -> Self {
        Self::new(tokens.into_iter().collect())
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_hour(mut self, hour: impl Into<String>) -> Self {
        self.hour = Some(hour.into());
        self
    }

    pub fn is_labeled(&self) -> bool {
        self.label.is_some()
    }
}
