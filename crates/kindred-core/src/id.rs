//! Person identifiers and the generators that hand them out

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a person
///
/// The registry only relies on identifiers being unique and stable for its
/// lifetime; the textual format belongs to the [`IdGenerator`] in use.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PersonId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PersonId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for PersonId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Source of fresh person identifiers, owned by a single registry
pub trait IdGenerator: Send + Sync + std::fmt::Debug {
    /// Produce the next identifier
    fn next_id(&mut self) -> PersonId;
}

/// Prefix plus a zero-padded counter: `P001`, `P002`, ...
///
/// The counter starts at 1 and lives as long as the generator, so every
/// registry numbers its persons independently.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::with_prefix("P")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> PersonId {
        let id = PersonId(format!("{}{:03}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

/// One ULID per person
#[derive(Debug, Clone, Default)]
pub struct UlidIds;

impl IdGenerator for UlidIds {
    fn next_id(&mut self) -> PersonId {
        PersonId(Ulid::new().to_string())
    }
}
