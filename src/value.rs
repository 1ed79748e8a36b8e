// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Dynamically typed, JSON-like values with shared containers.
//!
//! [`Array`] and [`Object`] hold their contents behind an [`Arc`]. Cloning a [`Value`] therefore
//! never copies a container, it only hands out another reference to it. This is what makes
//! structural sharing observable: two values are the *same* container when [`Value::ptr_eq`]
//! says so, regardless of whether they are also equal.
//!
//! Mutating methods on [`Array`] and [`Object`] are copy-on-write. They never change a container
//! that is still referenced from elsewhere; instead, the handle they are called on is detached
//! onto a private copy first.
use crate::{GraftRandomState, create_map, create_map_with_capacity};
use std::{
    collections::HashMap,
    fmt,
    ops::Index,
    sync::Arc,
};

static NULL: Value = Value::Null;

/// A JSON-like value.
///
/// `Null` stands in for both an explicit null and an absent value. Update operations treat a
/// `Null` payload as "nothing to do", and the selective cloner treats a `Null` child as a missing
/// path.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Array),
    Object(Object),
}

impl Value {
    /// Returns a short name for the kind of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Returns `true` if both values are the same value.
    ///
    /// Containers are compared by identity: two arrays (or objects) are the same only if they
    /// share an allocation, even if their contents are equal. Scalars have no identity and are
    /// compared by value, like primitives in a garbage-collected language.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
                false
            }
            _ => self == other,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Looks up a direct child of this value.
    ///
    /// Objects are indexed by key; arrays are indexed by a key that parses as a decimal index.
    /// Scalars have no children.
    pub fn child(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(o) => o.get(key),
            Value::Array(a) => array_index(key).and_then(|i| a.get(i)),
            _ => None,
        }
    }
}

/// Parses `key` as an array index.
///
/// Only canonical decimal forms are accepted: `"1"` addresses element 1, while `"01"`, `"+1"` and
/// `" 1"` address nothing.
pub(crate) fn array_index(key: &str) -> Option<usize> {
    let canonical = match key.as_bytes() {
        [b'0'] => true,
        [b'1'..=b'9', rest @ ..] => rest.iter().all(u8::is_ascii_digit),
        _ => false,
    };
    if canonical { key.parse().ok() } else { None }
}

/// A key that addresses an entry in an [`Object`] or an element of an [`Array`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Key {
    Index(usize),
    Name(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(n) => write!(f, "{n}"),
        }
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Index(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Name(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Name(value)
    }
}

/// A shared, copy-on-write list of values.
#[derive(Clone, Default)]
pub struct Array(Arc<Vec<Value>>);

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns a new array holding the same element references.
    pub fn shallow_clone(&self) -> Array {
        Array(Arc::new(Vec::clone(&self.0)))
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        Arc::make_mut(&mut self.0).push(value.into());
    }

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// Returns `None` and leaves the array untouched if `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Option<Value> {
        if index >= self.len() {
            return None;
        }
        let slot = &mut Arc::make_mut(&mut self.0)[index];
        Some(std::mem::replace(slot, value.into()))
    }

    /// Returns a new array with the elements of `other` after those of `self`.
    pub fn concat(&self, other: &Array) -> Array {
        let mut items = Vec::with_capacity(self.len() + other.len());
        items.extend(self.iter().cloned());
        items.extend(other.iter().cloned());
        Array(Arc::new(items))
    }

    /// Returns a new array without the element at `index`, or `None` if there is no such element.
    pub fn without(&self, index: usize) -> Option<Array> {
        if index >= self.len() {
            return None;
        }
        Some(
            self.iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, v)| v.clone())
                .collect(),
        )
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Array(Arc::new(iter.into_iter().collect()))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Array {
    fn from(value: Vec<T>) -> Self {
        value.into_iter().map(Into::into).collect()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<Value> for Array {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(a) => Ok(a),
            other => Err(other),
        }
    }
}

#[derive(Clone, Default)]
struct Entries {
    // insertion order
    entries: Vec<(String, Value)>,
    // key -> position in `entries`
    index: HashMap<String, usize, GraftRandomState>,
}

impl Entries {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: create_map_with_capacity(capacity),
        }
    }

    fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }
}

/// A shared, copy-on-write map from string keys to values.
///
/// Keys keep the order in which they were first inserted. Lookups go through a hash index.
#[derive(Clone, Default)]
pub struct Object(Arc<Entries>);

impl Object {
    pub fn new() -> Self {
        Self(Arc::new(Entries {
            entries: Vec::new(),
            index: create_map(),
        }))
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Arc::new(Entries::with_capacity(capacity)))
    }

    pub fn len(&self) -> usize {
        self.0.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.index.get(key).map(|&i| &self.0.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.index.contains_key(key)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.0.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.0.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> {
        self.0.entries.iter().map(|(_, v)| v)
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns a new object holding the same entry references.
    pub fn shallow_clone(&self) -> Object {
        Object(Arc::new(Entries::clone(&self.0)))
    }

    /// Inserts or replaces the entry for `key`, returning the previous value.
    ///
    /// Replacing keeps the key at its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        Arc::make_mut(&mut self.0).insert(key.into(), value.into())
    }

    /// Returns a new object with the entries of `other` laid over those of `self`.
    pub fn merged(&self, other: &Object) -> Object {
        let mut entries = Entries::clone(&self.0);
        for (k, v) in other.iter() {
            entries.insert(k.to_string(), v.clone());
        }
        Object(Arc::new(entries))
    }

    /// Returns a new object without `key`, or `None` if there is no such key.
    ///
    /// The surviving keys keep their order.
    pub fn without(&self, key: &str) -> Option<Object> {
        if !self.contains_key(key) {
            return None;
        }
        Some(
            self.iter()
                .filter(|(k, _)| *k != key)
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len() == other.len()
                && self.iter().all(|(k, v)| other.get(k).is_some_and(|o| o == v)))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut entries = Entries::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            entries.insert(k.into(), v.into());
        }
        Object(Arc::new(entries))
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for Object {
    fn from(value: Vec<(K, V)>) -> Self {
        value.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Object {
    fn from(value: [(K, V); N]) -> Self {
        value.into_iter().collect()
    }
}

impl TryFrom<Value> for Object {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(o) => Ok(o),
            other => Err(other),
        }
    }
}

macro_rules! impl_from {
    ($($t:ty => $variant:ident),+ $(,)?) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::$variant(value.into())
            }
        })+
    };
}

impl_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => String,
    &str => String,
    Array => Array,
    Object => Object,
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Value::Float(value as f64), Value::Int)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        (value as u64).into()
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into())
    }
}

impl Index<&str> for Value {
    type Output = Value;

    /// Returns the child under `key`, or `Null` if there is none.
    fn index(&self, key: &str) -> &Value {
        self.child(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        self.as_array().and_then(|a| a.get(index)).unwrap_or(&NULL)
    }
}

macro_rules! impl_partial_eq {
    ($($t:ty => |$v:ident, $o:ident| $eq:expr),+ $(,)?) => {
        $(impl PartialEq<$t> for Value {
            fn eq(&self, other: &$t) -> bool {
                let ($v, $o) = (self, other);
                $eq
            }
        })+
    };
}

impl_partial_eq! {
    str => |v, o| v.as_str() == Some(o),
    &str => |v, o| v.as_str() == Some(*o),
    String => |v, o| v.as_str() == Some(o.as_str()),
    bool => |v, o| v.as_bool() == Some(*o),
    i64 => |v, o| v.as_i64() == Some(*o),
    // i32 because it's the "default" inference integer type
    i32 => |v, o| v.as_i64() == Some(i64::from(*o)),
    f64 => |v, o| matches!(v, Value::Float(f) if f == o),
}

/// Renders the value as compact JSON, keeping object keys in insertion order.
///
/// Non-finite floats have no JSON form and render as `null`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Array(a) => {
                f.write_str("[")?;
                for (i, v) in a.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Object(o) => {
                f.write_str("{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_string(f, k)?;
                    write!(f, ":{v}")?;
                }
                f.write_str("}")
            }
            Value::String(s) => write_string(f, s),
            scalar => write_scalar(f, scalar),
        }
    }
}

#[cfg(feature = "json")]
fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    fmt::Display::fmt(&serde_json::Value::from(s), f)
}

#[cfg(feature = "json")]
fn write_scalar(f: &mut fmt::Formatter<'_>, scalar: &Value) -> fmt::Result {
    fmt::Display::fmt(&serde_json::Value::from(scalar), f)
}

// Without serde_json, strings are escaped the way serde_json escapes them.
#[cfg(not(feature = "json"))]
fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

#[cfg(not(feature = "json"))]
fn write_scalar(f: &mut fmt::Formatter<'_>, scalar: &Value) -> fmt::Result {
    match scalar {
        Value::Bool(b) => write!(f, "{b}"),
        Value::Int(i) => write!(f, "{i}"),
        Value::Float(x) if x.is_finite() => write!(f, "{x:?}"),
        _ => f.write_str("null"),
    }
}
