// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Implementation of the quickcheck::Arbitrary trait for values and keys.

use crate::{Array, Key, Object, Value};
use quickcheck::{Arbitrary, Gen};

// Keys are drawn from a small alphabet so that generated objects and selectors overlap often.
const KEYS: &[&str] = &["a", "b", "c", "id", "name", "items", "0", "1"];

impl Arbitrary for Value {
    fn arbitrary(g: &mut Gen) -> Self {
        // containers only while there is size left, otherwise generation would not terminate
        let choices: &[&str] = if g.size() > 1 {
            &["null", "bool", "int", "float", "string", "array", "object", "object"]
        } else {
            &["null", "bool", "int", "float", "string"]
        };
        match *g.choose(choices).unwrap() {
            "null" => Value::Null,
            "bool" => Value::Bool(bool::arbitrary(g)),
            "int" => Value::Int(i64::arbitrary(g)),
            "float" => {
                let f = f64::arbitrary(g);
                // NaN breaks equality, and infinities do not survive a JSON round trip
                Value::Float(if f.is_finite() { f } else { 0.5 })
            }
            "string" => Value::String(String::arbitrary(g)),
            "array" => {
                // penalize nesting
                let mut g = Gen::new(g.size() / 2);
                Value::Array(Array::arbitrary(&mut g))
            }
            "object" => {
                // penalize nesting
                let mut g = Gen::new(g.size() / 2);
                Value::Object(Object::arbitrary(&mut g))
            }
            _ => unreachable!(),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Value::Null => quickcheck::empty_shrinker(),
            Value::Bool(b) => Box::new(b.shrink().map(Value::Bool)),
            Value::Int(i) => Box::new(i.shrink().map(Value::Int)),
            Value::Float(f) => Box::new(f.shrink().filter(|f| f.is_finite()).map(Value::Float)),
            Value::String(s) => Box::new(s.shrink().map(Value::String)),
            Value::Array(a) => Box::new(
                std::iter::once(Value::Null).chain(a.shrink().map(Value::Array)),
            ),
            Value::Object(o) => Box::new(
                std::iter::once(Value::Null).chain(o.shrink().map(Value::Object)),
            ),
        }
    }
}

impl Arbitrary for Array {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 4;
        (0..len).map(|_| Value::arbitrary(g)).collect()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(
            self.as_slice()
                .to_vec()
                .shrink()
                .map(|items| items.into_iter().collect()),
        )
    }
}

impl Arbitrary for Object {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 4;
        (0..len)
            .map(|_| (*g.choose(KEYS).unwrap(), Value::arbitrary(g)))
            .collect()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let entries: Vec<(String, Value)> = self
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Box::new(entries.shrink().map(Object::from))
    }
}

impl Arbitrary for Key {
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            Key::Index(usize::arbitrary(g) % 4)
        } else {
            Key::Name(g.choose(KEYS).unwrap().to_string())
        }
    }
}
