// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! JSON representation
//!
//! [`Value`] maps onto [`serde_json::Value`] one to one, with two exceptions:
//!
//! - Integers outside the range of `i64` become floats when converted from JSON.
//! - Non-finite floats have no JSON representation and become `null` when converted to JSON.
//!
//! Object key order is preserved in both directions when `serde_json` is built with its
//! `preserve_order` feature; otherwise JSON objects come out sorted by key.
//!
//! # Example
//!
//! ```
//! use graftree::{Session, Value};
//! use serde_json::json;
//!
//! let original = Value::from(json!({ "user": { "roles": ["reader"] } }));
//! let session = Session::try_from(&Value::from(json!({ "user": { "roles": "#" } }))).unwrap();
//!
//! let updated = session.bind(&original).append("writer").apply().unwrap();
//! assert_eq!(
//!     serde_json::Value::from(updated),
//!     json!({ "user": { "roles": ["reader", "writer"] } })
//! );
//! ```
use crate::{Array, Object, Value};
use serde_json::{Map, Number};

/// Converts a [`serde_json::Value`] to a [`Value`].
impl From<serde_json::Value> for Value {
    fn from(val: serde_json::Value) -> Self {
        match val {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => number_to_value(&n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(map.into_iter().collect()),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(val: &serde_json::Value) -> Self {
        val.clone().into()
    }
}

fn number_to_value(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else {
        // u64 beyond i64::MAX, or a float
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Converts a [`Value`] to a [`serde_json::Value`].
impl From<Value> for serde_json::Value {
    fn from(val: Value) -> Self {
        (&val).into()
    }
}

impl From<&Value> for serde_json::Value {
    fn from(val: &Value) -> Self {
        match val {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(a) => array_to_json(a),
            Value::Object(o) => object_to_json(o),
        }
    }
}

fn array_to_json(array: &Array) -> serde_json::Value {
    serde_json::Value::Array(array.iter().map(serde_json::Value::from).collect())
}

fn object_to_json(object: &Object) -> serde_json::Value {
    let mut map = Map::with_capacity(object.len());
    for (k, v) in object.iter() {
        map.insert(k.to_string(), v.into());
    }
    serde_json::Value::Object(map)
}
