use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SpamError};

/// Class of a message.
///
/// The set is closed and its iteration order is fixed: `Ham` first, then
/// `Spam`. Arg-max ties during classification resolve in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Ham = 0,
    Spam = 1,
}

impl Label {
    /// Every label, in tie-break order
    pub const ALL: [Label; 2] = [Label::Ham, Label::Spam];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Ham => "ham",
            Label::Spam => "spam",
        }
    }

    pub fn is_spam(self) -> bool {
        self == Label::Spam
    }
}

impl TryFrom<u8> for Label {
    type Error = SpamError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Label::Ham),
            1 => Ok(Label::Spam),
            other => Err(SpamError::InvalidLabel(other.to_string())),
        }
    }
}

impl FromStr for Label {
    type Err = SpamError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ham" | "0" => Ok(Label::Ham),
            "spam" | "1" => Ok(Label::Spam),
            _ => Err(SpamError::InvalidLabel(s.to_string())),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
