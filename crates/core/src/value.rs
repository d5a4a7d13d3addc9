//! Value types for backend replies
//!
//! This module defines:
//! - Value: closed tagged variant covering every reply shape a backend produces
//! - SetValue / ZSetValue / HashValue: composite containers with key uniqueness
//! - ValueType: the variant discriminant, used to pick a type-aware load command
//!
//! ## Container invariants
//!
//! - `Set` members are unique (by value equality); inserting a duplicate is a no-op
//! - `ZSet` members are unique; re-inserting a member overwrites its score
//! - `ZSet` iterates by ascending score, ties broken by member bytes
//! - `Hash` fields are unique; re-inserting a field overwrites its value
//!
//! Values are immutable once handed to an [`OutputNode`](crate::OutputNode).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Delimiter used when a value is flattened without an explicit one.
pub const DEFAULT_DELIMITER: &str = "\n";

/// Backend-independent reply value.
///
/// Different variants are never equal, even when they carry the "same"
/// number: `Int(1) != UInt(1) != Double(1.0)`. Doubles follow IEEE-754
/// equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Absent / nil reply
    Null,
    /// Boolean
    Bool(bool),
    /// Signed 64-bit integer
    Int(i64),
    /// Unsigned 64-bit integer
    UInt(u64),
    /// IEEE-754 double
    Double(f64),
    /// Binary-safe string
    String(Vec<u8>),
    /// Ordered sequence
    Array(Vec<Value>),
    /// Unordered collection of unique members
    Set(SetValue),
    /// Score-ordered unique members
    ZSet(ZSetValue),
    /// Field → value map with unique fields
    Hash(HashValue),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::ZSet(a), Value::ZSet(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            _ => false,
        }
    }
}

/// Discriminant of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// See [`Value::Null`]
    Null,
    /// See [`Value::Bool`]
    Bool,
    /// See [`Value::Int`]
    Int,
    /// See [`Value::UInt`]
    UInt,
    /// See [`Value::Double`]
    Double,
    /// See [`Value::String`]
    String,
    /// See [`Value::Array`]
    Array,
    /// See [`Value::Set`]
    Set,
    /// See [`Value::ZSet`]
    ZSet,
    /// See [`Value::Hash`]
    Hash,
}

impl ValueType {
    /// Human-readable type name.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Null => "Null",
            ValueType::Bool => "Bool",
            ValueType::Int => "Int",
            ValueType::UInt => "UInt",
            ValueType::Double => "Double",
            ValueType::String => "String",
            ValueType::Array => "Array",
            ValueType::Set => "Set",
            ValueType::ZSet => "ZSet",
            ValueType::Hash => "Hash",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Construct a string value from anything byte-like.
    pub fn string(s: impl Into<Vec<u8>>) -> Self {
        Value::String(s.into())
    }

    /// Get the variant discriminant
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::UInt(_) => ValueType::UInt,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Set(_) => ValueType::Set,
            Value::ZSet(_) => ValueType::ZSet,
            Value::Hash(_) => ValueType::Hash,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for `Array` and `Set`, the shapes rendered as array-style nodes.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Set(_))
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as u64 if this is a UInt value
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }

    /// Get as f64 if this is a Double value
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Get the raw bytes if this is a String value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(b) => Some(b),
            _ => None,
        }
    }

    /// Get as &str if this is a String value holding valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Get as &[Value] if this is an Array value
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get the set if this is a Set value
    pub fn as_set(&self) -> Option<&SetValue> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Get the sorted set if this is a ZSet value
    pub fn as_zset(&self) -> Option<&ZSetValue> {
        match self {
            Value::ZSet(z) => Some(z),
            _ => None,
        }
    }

    /// Get the hash if this is a Hash value
    pub fn as_hash(&self) -> Option<&HashValue> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    /// Render for flattened contexts using [`DEFAULT_DELIMITER`].
    pub fn to_display_string(&self) -> String {
        self.to_delimited_string(DEFAULT_DELIMITER)
    }

    /// Render for flattened contexts, joining container elements with `delimiter`.
    ///
    /// Sorted-set entries render as `member score`, hash entries as `field value`.
    pub fn to_delimited_string(&self, delimiter: &str) -> String {
        match self {
            Value::Null => "(nil)".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Double(d) => d.to_string(),
            Value::String(s) => String::from_utf8_lossy(s).into_owned(),
            Value::Array(items) => join(items.iter(), delimiter),
            Value::Set(set) => join(set.iter(), delimiter),
            Value::ZSet(zset) => zset
                .iter()
                .map(|(member, score)| format!("{} {}", String::from_utf8_lossy(member), score))
                .collect::<Vec<_>>()
                .join(delimiter),
            Value::Hash(hash) => hash
                .iter()
                .map(|(field, value)| {
                    format!(
                        "{} {}",
                        String::from_utf8_lossy(field),
                        value.to_delimited_string(delimiter)
                    )
                })
                .collect::<Vec<_>>()
                .join(delimiter),
        }
    }
}

fn join<'a>(items: impl Iterator<Item = &'a Value>, delimiter: &str) -> String {
    items
        .map(|v| v.to_delimited_string(delimiter))
        .collect::<Vec<_>>()
        .join(delimiter)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

// ============================================================================
// Containers
// ============================================================================

/// Unordered collection of unique values.
///
/// Membership is by [`Value`] equality, so the set keeps insertion order for
/// display but never holds two equal members.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "SetRepr")]
pub struct SetValue {
    members: Vec<Value>,
}

impl SetValue {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member. Returns false (and changes nothing) if it was present.
    pub fn insert(&mut self, member: Value) -> bool {
        if self.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// Whether an equal member is present
    pub fn contains(&self, member: &Value) -> bool {
        self.members.iter().any(|m| m == member)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the set has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate members
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.members.iter()
    }
}

// Order-insensitive: two sets are equal when they hold the same members.
impl PartialEq for SetValue {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.members.iter().all(|m| other.contains(m))
    }
}

impl FromIterator<Value> for SetValue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = SetValue::new();
        for v in iter {
            set.insert(v);
        }
        set
    }
}

/// Sorted set: unique members ordered by ascending score, ties by member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ZSetRepr")]
pub struct ZSetValue {
    entries: Vec<(Vec<u8>, f64)>,
}

impl ZSetValue {
    /// Create an empty sorted set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or re-score a member. Returns true when the member is new.
    pub fn insert(&mut self, member: impl Into<Vec<u8>>, score: f64) -> bool {
        let member = member.into();
        let added = match self.entries.iter().position(|(m, _)| *m == member) {
            Some(idx) => {
                self.entries.remove(idx);
                false
            }
            None => true,
        };
        let at = self
            .entries
            .partition_point(|(m, s)| zset_order((m, *s), (&member, score)) == Ordering::Less);
        self.entries.insert(at, (member, score));
        added
    }

    /// Score of a member, if present
    pub fn score(&self, member: &[u8]) -> Option<f64> {
        self.entries
            .iter()
            .find(|(m, _)| m.as_slice() == member)
            .map(|(_, s)| *s)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the set has no members
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(member, score)` in ascending score order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], f64)> {
        self.entries.iter().map(|(m, s)| (m.as_slice(), *s))
    }
}

fn zset_order(a: (&Vec<u8>, f64), b: (&Vec<u8>, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0))
}

/// Field → value map with unique fields, iterated in field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashRepr")]
pub struct HashValue {
    fields: Vec<(Vec<u8>, Value)>,
}

impl HashValue {
    /// Create an empty hash
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value if it was overwritten.
    pub fn insert(&mut self, field: impl Into<Vec<u8>>, value: Value) -> Option<Value> {
        let field = field.into();
        match self.fields.binary_search_by(|(f, _)| f.cmp(&field)) {
            Ok(idx) => Some(std::mem::replace(&mut self.fields[idx].1, value)),
            Err(idx) => {
                self.fields.insert(idx, (field, value));
                None
            }
        }
    }

    /// Look up a field
    pub fn get(&self, field: &[u8]) -> Option<&Value> {
        self.fields
            .binary_search_by(|(f, _)| f.as_slice().cmp(field))
            .ok()
            .map(|idx| &self.fields[idx].1)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the hash has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate `(field, value)` in field order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Value)> {
        self.fields.iter().map(|(f, v)| (f.as_slice(), v))
    }
}

// Deserialized containers are rebuilt through `insert`, so input with
// duplicates or out-of-order entries still yields a valid container. Later
// duplicates win, as they would for repeated inserts.

#[derive(Deserialize)]
struct SetRepr {
    members: Vec<Value>,
}

impl From<SetRepr> for SetValue {
    fn from(repr: SetRepr) -> Self {
        repr.members.into_iter().collect()
    }
}

#[derive(Deserialize)]
struct ZSetRepr {
    entries: Vec<(Vec<u8>, f64)>,
}

impl From<ZSetRepr> for ZSetValue {
    fn from(repr: ZSetRepr) -> Self {
        let mut zset = ZSetValue::new();
        for (member, score) in repr.entries {
            zset.insert(member, score);
        }
        zset
    }
}

#[derive(Deserialize)]
struct HashRepr {
    fields: Vec<(Vec<u8>, Value)>,
}

impl From<HashRepr> for HashValue {
    fn from(repr: HashRepr) -> Self {
        let mut hash = HashValue::new();
        for (field, value) in repr.fields {
            hash.insert(field, value);
        }
        hash
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::String(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::String(b.to_vec())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<SetValue> for Value {
    fn from(s: SetValue) -> Self {
        Value::Set(s)
    }
}

impl From<ZSetValue> for Value {
    fn from(z: ZSetValue) -> Self {
        Value::ZSet(z)
    }
}

impl From<HashValue> for Value {
    fn from(h: HashValue) -> Self {
        Value::Hash(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_different_types_never_equal() {
        assert_ne!(Value::Int(1), Value::UInt(1));
        assert_ne!(Value::Int(1), Value::Double(1.0));
        assert_ne!(Value::from("1"), Value::Int(1));
    }

    #[test]
    fn test_nan_not_equal() {
        assert_ne!(Value::Double(f64::NAN), Value::Double(f64::NAN));
    }

    #[test]
    fn test_typed_accessors() {
        assert_eq!(Value::Int(-4).as_int(), Some(-4));
        assert_eq!(Value::UInt(4).as_int(), None);
        assert_eq!(Value::UInt(4).as_uint(), Some(4));
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::String(vec![0xff, 0xfe]).as_str(), None);
        assert_eq!(Value::String(vec![0xff]).as_bytes(), Some(&[0xff][..]));
        assert_eq!(Value::Null.as_bool(), None);
    }

    #[test]
    fn test_set_duplicate_insert_is_noop() {
        let mut set = SetValue::new();
        assert!(set.insert(Value::from("a")));
        assert!(set.insert(Value::from("b")));
        assert!(!set.insert(Value::from("a")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let a: SetValue = vec![Value::Int(1), Value::Int(2)].into_iter().collect();
        let b: SetValue = vec![Value::Int(2), Value::Int(1)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zset_ordering_and_rescore() {
        let mut z = ZSetValue::new();
        assert!(z.insert("b", 2.0));
        assert!(z.insert("a", 2.0));
        assert!(z.insert("c", 1.0));
        let order: Vec<&[u8]> = z.iter().map(|(m, _)| m).collect();
        assert_eq!(order, vec![&b"c"[..], &b"a"[..], &b"b"[..]]);

        assert!(!z.insert("c", 5.0));
        assert_eq!(z.len(), 3);
        assert_eq!(z.score(b"c"), Some(5.0));
        let last = z.iter().last().unwrap();
        assert_eq!(last.0, &b"c"[..]);
    }

    #[test]
    fn test_hash_overwrite_keeps_unique_fields() {
        let mut h = HashValue::new();
        assert_eq!(h.insert("f", Value::from("1")), None);
        assert_eq!(h.insert("f", Value::from("2")), Some(Value::from("1")));
        assert_eq!(h.len(), 1);
        assert_eq!(h.get(b"f"), Some(&Value::from("2")));
    }

    #[test]
    fn test_deserialize_rebuilds_hash_invariants() {
        let mut h = HashValue::new();
        h.insert("a", Value::from("1"));
        h.insert("b", Value::from("2"));
        let mut json = serde_json::to_value(&h).unwrap();
        let fields = json["fields"].as_array_mut().unwrap();
        fields.reverse();
        let dup = fields[0].clone();
        fields.push(dup);

        let back: HashValue = serde_json::from_value(json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back, h);
        assert_eq!(back.get(b"a"), Some(&Value::from("1")));
        assert_eq!(back.get(b"b"), Some(&Value::from("2")));
    }

    #[test]
    fn test_deserialize_rebuilds_set_and_zset_invariants() {
        let set: SetValue = vec![Value::from("x")].into_iter().collect();
        let mut json = serde_json::to_value(&set).unwrap();
        let dup = json["members"][0].clone();
        json["members"].as_array_mut().unwrap().push(dup);
        let back: SetValue = serde_json::from_value(json).unwrap();
        assert_eq!(back.len(), 1);

        let mut z = ZSetValue::new();
        z.insert("lo", 1.0);
        z.insert("hi", 9.0);
        let mut json = serde_json::to_value(&z).unwrap();
        json["entries"].as_array_mut().unwrap().reverse();
        let back: ZSetValue = serde_json::from_value(json).unwrap();
        let order: Vec<&[u8]> = back.iter().map(|(m, _)| m).collect();
        assert_eq!(order, vec![&b"lo"[..], &b"hi"[..]]);
    }

    #[test]
    fn test_display_string() {
        let arr = Value::Array(vec![Value::from("a"), Value::Int(2), Value::Null]);
        assert_eq!(arr.to_delimited_string(","), "a,2,(nil)");

        let mut z = ZSetValue::new();
        z.insert("m", 3.0);
        assert_eq!(Value::ZSet(z).to_delimited_string(";"), "m 3");

        let mut h = HashValue::new();
        h.insert("x", Value::from("1"));
        h.insert("y", Value::from("2"));
        assert_eq!(Value::Hash(h).to_delimited_string(" | "), "x 1 | y 2");
    }

    #[test]
    fn test_value_type() {
        assert_eq!(Value::Set(SetValue::new()).value_type(), ValueType::Set);
        assert_eq!(ValueType::ZSet.to_string(), "ZSet");
        assert!(Value::Array(vec![]).is_sequence());
        assert!(!Value::Hash(HashValue::new()).is_sequence());
    }
}
