//! Backend-independent key, key/value and channel types.
//!
//! Keys are plain strings; a logical namespace is encoded inside the key
//! with a configurable separator (`user:42:name` with `:`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Time-to-live of a key, as understood by the key-operation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ttl {
    /// Key never expires
    Persistent,
    /// Key does not exist (as reported by backends that distinguish it)
    NotExists,
    /// Seconds until expiry
    Seconds(u64),
}

impl Ttl {
    /// Decode the redis-style integer convention: `-1` persistent, `-2` missing.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            -2 => Ttl::NotExists,
            r if r < 0 => Ttl::Persistent,
            r => Ttl::Seconds(r as u64),
        }
    }

    /// Encode back to the redis-style integer convention.
    ///
    /// Seconds beyond `i64::MAX` saturate rather than wrap negative.
    pub fn to_raw(self) -> i64 {
        match self {
            Ttl::Persistent => -1,
            Ttl::NotExists => -2,
            Ttl::Seconds(s) => i64::try_from(s).unwrap_or(i64::MAX),
        }
    }
}

/// A key addressed by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NKey {
    name: String,
}

impl NKey {
    /// Create a key from its flattened name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Join namespace parts and a leaf name with `separator`.
    pub fn namespaced<S: AsRef<str>>(parts: &[S], leaf: &str, separator: &str) -> Self {
        let mut name = String::new();
        for part in parts {
            name.push_str(part.as_ref());
            name.push_str(separator);
        }
        name.push_str(leaf);
        Self { name }
    }

    /// Flattened key name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace components before the leaf, split on `separator`.
    ///
    /// An empty separator means the key has no namespace.
    pub fn namespace(&self, separator: &str) -> Vec<&str> {
        if separator.is_empty() {
            return Vec::new();
        }
        let mut parts: Vec<&str> = self.name.split(separator).collect();
        parts.pop();
        parts
    }

    /// Leaf name after the last `separator`.
    pub fn leaf(&self, separator: &str) -> &str {
        if separator.is_empty() {
            return &self.name;
        }
        match self.name.rfind(separator) {
            Some(idx) => &self.name[idx + separator.len()..],
            None => &self.name,
        }
    }
}

impl fmt::Display for NKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for NKey {
    fn from(s: &str) -> Self {
        NKey::new(s)
    }
}

impl From<String> for NKey {
    fn from(s: String) -> Self {
        NKey::new(s)
    }
}

/// A key together with its value, as used by create-key operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NDbKValue {
    key: NKey,
    value: Value,
}

impl NDbKValue {
    /// Pair a key with a value
    pub fn new(key: impl Into<NKey>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// The key
    pub fn key(&self) -> &NKey {
        &self.key
    }

    /// The value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Key name as wire text
    pub fn key_string(&self) -> &str {
        self.key.name()
    }

    /// Value flattened to wire text, container elements separated by spaces.
    pub fn value_string(&self) -> String {
        self.value.to_delimited_string(" ")
    }
}

/// A publish/subscribe channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NDbPSChannel {
    name: String,
    subscribers: u64,
}

impl NDbPSChannel {
    /// Channel with an unknown subscriber count
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscribers: 0,
        }
    }

    /// Channel name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last known subscriber count
    pub fn subscribers(&self) -> u64 {
        self.subscribers
    }

    /// Record a subscriber count reported by the backend
    pub fn with_subscribers(mut self, subscribers: u64) -> Self {
        self.subscribers = subscribers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_split() {
        let key = NKey::namespaced(&["user", "42"], "name", ":");
        assert_eq!(key.name(), "user:42:name");
        assert_eq!(key.namespace(":"), vec!["user", "42"]);
        assert_eq!(key.leaf(":"), "name");
    }

    #[test]
    fn test_namespace_without_separator() {
        let key = NKey::new("plain");
        assert!(key.namespace(":").is_empty());
        assert_eq!(key.leaf(":"), "plain");
        assert!(key.namespace("").is_empty());
    }

    #[test]
    fn test_ttl_raw_convention() {
        assert_eq!(Ttl::from_raw(-1), Ttl::Persistent);
        assert_eq!(Ttl::from_raw(-2), Ttl::NotExists);
        assert_eq!(Ttl::from_raw(30), Ttl::Seconds(30));
        assert_eq!(Ttl::Seconds(30).to_raw(), 30);
        assert_eq!(Ttl::Seconds(u64::MAX).to_raw(), i64::MAX);
    }

    #[test]
    fn test_kvalue_strings() {
        let kv = NDbKValue::new(
            "list",
            Value::Array(vec![Value::from("a"), Value::from("b")]),
        );
        assert_eq!(kv.key_string(), "list");
        assert_eq!(kv.value_string(), "a b");
    }
}
