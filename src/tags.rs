// Copyright 2025 Cowboy AI, LLC.

//! Tag metadata attached to resource descriptors
//!
//! A [`TagSet`] is an immutable mapping of tag key to tag value. Merging two
//! tag sets is total and right-biased: the override's value wins on key
//! collision, and neither input is mutated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Immutable set of string tags
///
/// Backed by an ordered map so serialized manifests are deterministic.
///
/// # Examples
///
/// ```rust
/// use infra_topology::tags::TagSet;
///
/// let base = TagSet::from_pairs([("Env", "Dev"), ("Owner", "SRE")]);
/// let merged = base.merge(&TagSet::from_pairs([("Name", "infra-web")]));
/// assert_eq!(merged.get("Env"), Some("Dev"));
/// assert_eq!(merged.get("Name"), Some("infra-web"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    /// Create an empty tag set
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Create a tag set from key/value pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Return a new tag set with one additional tag
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut tags = self.0.clone();
        tags.insert(key.into(), value.into());
        Self(tags)
    }

    /// Merge with an override set, producing a new tag set
    ///
    /// Right-biased: where a key exists in both, the override's value is
    /// taken. Both inputs are left untouched.
    pub fn merge(&self, overrides: &TagSet) -> Self {
        let mut tags = self.0.clone();
        for (key, value) in &overrides.0 {
            tags.insert(key.clone(), value.clone());
        }
        Self(tags)
    }

    /// Get a tag value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over key/value pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}
