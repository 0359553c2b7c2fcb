// ── Record identity ──
//
// Server-assigned, opaque, immutable. The backend may emit numbers or
// strings; both are preserved verbatim so URLs round-trip exactly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical identifier for a persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Whether `raw` names this id, regardless of its JSON representation.
    ///
    /// `"7"` matches both `Number(7)` and `Text("7")`. Surrounding
    /// whitespace is ignored; otherwise the text must equal the id's
    /// display form exactly, so `"07"` and `"+7"` match neither.
    pub fn matches(&self, raw: &str) -> bool {
        let raw = raw.trim();
        match self {
            Self::Number(n) => raw == n.to_string(),
            Self::Text(s) => raw == s,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<String> for RecordId {
    /// Only the canonical decimal form becomes a number, so `"07"`
    /// stays text and still addresses `/07` on the server.
    fn from(s: String) -> Self {
        match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => Self::Number(n),
            _ => Self::Text(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}
