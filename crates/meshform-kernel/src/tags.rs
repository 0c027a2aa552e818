//! Key/value tags and the filters applied before tags reach state.

use crate::appmesh::Tag;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Prefix reserved for tags managed by the platform itself.
pub const AWS_TAG_PREFIX: &str = "aws:";

/// Caller-configured tag keys to suppress everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreTagsConfig {
    /// Exact keys to drop.
    #[serde(default)]
    pub keys: BTreeSet<String>,
    /// Drop any key starting with one of these.
    #[serde(default)]
    pub key_prefixes: BTreeSet<String>,
}

impl IgnoreTagsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into());
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefixes.insert(prefix.into());
        self
    }

    pub fn ignores(&self, key: &str) -> bool {
        self.keys.contains(key) || self.key_prefixes.iter().any(|p| key.starts_with(p.as_str()))
    }
}

/// An ordered set of tags with chainable filters.
///
/// ```rust
/// use meshform_kernel::tags::{IgnoreTagsConfig, KeyValueTags};
///
/// let tags = KeyValueTags::from_iter([("env", "prod"), ("aws:internal", "x"), ("team", "a")]);
/// let ignore = IgnoreTagsConfig::new().with_key("team");
///
/// let kept = tags.ignore_aws().ignore_config(&ignore).map();
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept["env"], "prod");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueTags(BTreeMap<String, String>);

impl KeyValueTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop platform-managed (`aws:`) keys.
    pub fn ignore_aws(self) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|(k, _)| !k.starts_with(AWS_TAG_PREFIX))
                .collect(),
        )
    }

    /// Drop keys suppressed by the caller's configuration.
    pub fn ignore_config(self, config: &IgnoreTagsConfig) -> Self {
        Self(self.0.into_iter().filter(|(k, _)| !config.ignores(k)).collect())
    }

    pub fn map(self) -> BTreeMap<String, String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Tag>> for KeyValueTags {
    fn from(tags: Vec<Tag>) -> Self {
        Self(tags.into_iter().map(|t| (t.key, t.value)).collect())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueTags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
