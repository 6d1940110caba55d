use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Prefix of designators generated for instances of autogenerated templates.
pub const HIDDEN_PREFIX: &str = "__";

/// Component designator (X1, W2, F10) with natural ordering, so that
/// X2 sorts before X10 inside BTreeSet/BTreeMap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Designator(String);

impl Designator {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Autogenerated instances carry a hidden designator that is never shown
    /// in diagrams.
    pub fn is_hidden(&self) -> bool {
        self.0.starts_with(HIDDEN_PREFIX)
    }
}

impl From<String> for Designator {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Designator {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Designator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Designator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialOrd for Designator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Designator {
    // natord ignores whitespace, so equal natural order falls back to bytes
    fn cmp(&self, other: &Self) -> Ordering {
        natord::compare(&self.0, &other.0).then_with(|| self.0.cmp(&other.0))
    }
}
