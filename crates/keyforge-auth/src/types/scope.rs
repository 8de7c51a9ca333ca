//! Ordered scope sets.
//!
//! Scopes travel as space-delimited strings at the wire and storage
//! boundaries but are handled internally as an ordered, deduplicated set.
//! First occurrence wins on duplicates and insertion order is preserved,
//! so the string form round-trips deterministically.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An ordered, deduplicated set of OAuth scope identifiers.
///
/// An empty set is valid and means "no scopes granted".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSet(IndexSet<String>);

impl ScopeSet {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a space-delimited scope string.
    ///
    /// Empty tokens are skipped and duplicates are collapsed to their
    /// first occurrence, so any whitespace-separated input is accepted.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self(input.split_whitespace().map(ToOwned::to_owned).collect())
    }

    /// Returns `true` if the set contains no scopes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of scopes in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set contains the given scope.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.0.contains(scope)
    }

    /// Iterates over the scopes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for scope in &self.0 {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{scope}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromIterator<String> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for ScopeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ScopeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
