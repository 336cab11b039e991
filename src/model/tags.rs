//! Set of string-valued device/network labels
//!
//! Grounded on the teacher's custom serde helper pattern in `scanners.rs`
//! (`serialize_to_string`/`deserialize_from_str`), adapted here to produce
//! a JSON array (or the `"{}"` empty sentinel inherited from the upstream
//! wire format) rather than a single string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

/// A well-known tag indicating the device's MAC address appears to be
/// randomized by the OS's privacy features.
pub const RANDOMIZED_MAC_ADDRESS: &str = "RandomizedMacAddress";

/// A set of string-valued labels. Serialized as a JSON array, or the
/// literal string `"{}"` when empty (spec §3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(BTreeSet<String>);

impl Tags {
    /// An empty tag set
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Inserts a tag, returning true if newly inserted
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.0.insert(tag.into())
    }

    /// Returns true if the tag is present
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Returns true if there are no tags
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates tags in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl FromIterator<String> for Tags {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Tags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.0.is_empty() {
            serializer.serialize_str("{}")
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Empty(String),
            List(BTreeSet<String>),
        }

        match Shape::deserialize(deserializer)? {
            Shape::Empty(s) if s == "{}" => Ok(Tags::new()),
            Shape::Empty(s) => Ok(Tags(BTreeSet::from([s]))),
            Shape::List(set) => Ok(Tags(set)),
        }
    }
}

#[cfg(test)]
#[path = "./tags_tests.rs"]
mod tests;
