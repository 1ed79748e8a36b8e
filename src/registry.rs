// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! The update operations and the pure functions that implement them.
//!
//! Every function here is total. When its input does not fit (a payload of the wrong shape, a
//! missing key, a `null` old value) it returns the old value itself rather than a copy, so that a
//! no-op leaf stays identical to the original under [`Value::ptr_eq`].
//!
//! | Operation | Result                                              | No-op when                           |
//! |-----------|-----------------------------------------------------|--------------------------------------|
//! | `set`     | the new value                                       | the new value is `null`              |
//! | `merge`   | a shallow copy of the old object with entries laid over it | the old value is not an object, or the patch is empty |
//! | `extend`  | the old array followed by the new elements          | the old value is not an array, or there are no new elements |
//! | `append`  | the old array followed by one new element           | the old value is not an array, or the element is `null` |
//! | `delete`  | the old container without the given key or index    | there is no such key or index        |
//! | `pipe`    | the transform applied to the old value              | the old value is `null`              |
use crate::{Array, Key, Object, Value};
use std::{error, fmt, str::FromStr, sync::Arc};

/// A caller-supplied transform used by [`Operation::Pipe`].
pub type Transform = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// An update operation with its payload.
#[derive(Clone)]
pub enum Operation {
    /// Replace the value.
    Set(Value),
    /// Shallow-merge entries into an object.
    Merge(Object),
    /// Concatenate elements onto an array.
    Extend(Array),
    /// Push one element onto an array.
    Append(Value),
    /// Remove an entry from an object or an element from an array.
    Delete(Key),
    /// Replace the value with the result of a transform.
    Pipe(Transform),
}

impl Operation {
    /// Wraps a closure into an [`Operation::Pipe`].
    pub fn pipe<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Operation::Pipe(Arc::new(f))
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Set(_) => OperationKind::Set,
            Operation::Merge(_) => OperationKind::Merge,
            Operation::Extend(_) => OperationKind::Extend,
            Operation::Append(_) => OperationKind::Append,
            Operation::Delete(_) => OperationKind::Delete,
            Operation::Pipe(_) => OperationKind::Pipe,
        }
    }

    /// Computes the new value for `old`.
    pub fn apply(&self, old: &Value) -> Value {
        match self {
            Operation::Set(new) => set(old, new),
            Operation::Merge(patch) => merge(old, patch),
            Operation::Extend(tail) => extend(old, tail),
            Operation::Append(item) => append(old, item),
            Operation::Delete(key) => delete(old, key),
            Operation::Pipe(f) => pipe(old, f.as_ref()),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Set(v) => f.debug_tuple("Set").field(v).finish(),
            Operation::Merge(o) => f.debug_tuple("Merge").field(o).finish(),
            Operation::Extend(a) => f.debug_tuple("Extend").field(a).finish(),
            Operation::Append(v) => f.debug_tuple("Append").field(v).finish(),
            Operation::Delete(k) => f.debug_tuple("Delete").field(k).finish(),
            Operation::Pipe(_) => f.write_str("Pipe(<fn>)"),
        }
    }
}

/// Returns `new`, or `old` if `new` is `null`.
pub fn set(old: &Value, new: &Value) -> Value {
    if new.is_null() {
        return old.clone();
    }
    new.clone()
}

/// Lays the entries of `patch` over a shallow copy of `old`.
pub fn merge(old: &Value, patch: &Object) -> Value {
    match old {
        Value::Object(object) if !patch.is_empty() => Value::Object(object.merged(patch)),
        _ => old.clone(),
    }
}

/// Appends the elements of `tail` to a copy of `old`.
pub fn extend(old: &Value, tail: &Array) -> Value {
    match old {
        Value::Array(array) if !tail.is_empty() => Value::Array(array.concat(tail)),
        _ => old.clone(),
    }
}

/// Appends `item` to a copy of `old`.
pub fn append(old: &Value, item: &Value) -> Value {
    match old {
        Value::Array(array) if !item.is_null() => {
            let mut items = array.shallow_clone();
            items.push(item.clone());
            Value::Array(items)
        }
        _ => old.clone(),
    }
}

/// Removes `key` from a copy of `old`.
///
/// Arrays only accept [`Key::Index`]. Objects accept both kinds, looking up an index by its
/// decimal form.
pub fn delete(old: &Value, key: &Key) -> Value {
    let removed = match (old, key) {
        (Value::Array(array), Key::Index(i)) => array.without(*i).map(Value::Array),
        (Value::Object(object), Key::Name(name)) => object.without(name).map(Value::Object),
        (Value::Object(object), Key::Index(i)) => {
            object.without(&i.to_string()).map(Value::Object)
        }
        _ => None,
    };
    removed.unwrap_or_else(|| old.clone())
}

/// Applies `f` to `old` unless `old` is `null`.
pub fn pipe(old: &Value, f: &(dyn Fn(&Value) -> Value + Send + Sync)) -> Value {
    if old.is_null() {
        return old.clone();
    }
    f(old)
}

/// The name of an [`Operation`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OperationKind {
    Set,
    Merge,
    Extend,
    Append,
    Delete,
    Pipe,
}

impl OperationKind {
    /// All operations, in registry order.
    pub const ALL: [OperationKind; 6] = [
        OperationKind::Set,
        OperationKind::Merge,
        OperationKind::Extend,
        OperationKind::Append,
        OperationKind::Delete,
        OperationKind::Pipe,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Set => "set",
            OperationKind::Merge => "merge",
            OperationKind::Extend => "extend",
            OperationKind::Append => "append",
            OperationKind::Delete => "delete",
            OperationKind::Pipe => "pipe",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// Error returned when parsing an [`OperationKind`] from an unknown name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperation(pub String);

impl fmt::Display for UnknownOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation {:?}", self.0)
    }
}

impl error::Error for UnknownOperation {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn set_replaces_unless_null() {
        let old = value!({ "a" => 1 });
        assert_eq!(set(&old, &value!("x")), "x");
        assert!(set(&old, &Value::Null).ptr_eq(&old));
    }

    #[test]
    fn merge_lays_new_keys_over_a_copy() {
        let old = value!({ "a" => 1, "b" => [2] });
        let patch: Object = [("b", value!(3)), ("c", value!(4))].into();
        let merged = merge(&old, &patch);
        assert_eq!(merged, value!({ "a" => 1, "b" => 3, "c" => 4 }));
        assert_eq!(
            merged.as_object().unwrap().keys().collect::<Vec<_>>(),
            ["a", "b", "c"]
        );
        assert_eq!(old, value!({ "a" => 1, "b" => [2] }));
    }

    #[test]
    fn merge_no_ops_return_the_old_reference() {
        let old = value!({ "a" => 1 });
        assert!(merge(&old, &Object::new()).ptr_eq(&old));

        let list = value!([1]);
        assert!(merge(&list, &[("a", 1)].into()).ptr_eq(&list));
        assert!(merge(&Value::Null, &[("a", 1)].into()).is_null());
    }

    #[test]
    fn extend_concatenates() {
        let old = value!([1, 2]);
        assert_eq!(extend(&old, &vec![3, 4].into()), value!([1, 2, 3, 4]));
        assert!(extend(&old, &Array::new()).ptr_eq(&old));

        let scalar = value!("str");
        assert!(extend(&scalar, &vec![1].into()).ptr_eq(&scalar));
    }

    #[test]
    fn append_pushes_one_element() {
        let old = value!([1]);
        assert_eq!(append(&old, &value!([2])), value!([1, [2]]));
        assert!(append(&old, &Value::Null).ptr_eq(&old));

        let obj = value!({});
        assert!(append(&obj, &value!(1)).ptr_eq(&obj));
        assert_eq!(old, value!([1]));
    }

    #[test]
    fn delete_from_objects() {
        let old = value!({ "a" => 1, "b" => 2, "c" => 3 });
        let rest = delete(&old, &"b".into());
        assert_eq!(rest, value!({ "a" => 1, "c" => 3 }));
        assert_eq!(rest.as_object().unwrap().keys().collect::<Vec<_>>(), ["a", "c"]);

        assert!(delete(&old, &"zzz".into()).ptr_eq(&old));

        let numeric = value!({ "0" => "zero", "1" => "one" });
        assert_eq!(delete(&numeric, &Key::Index(1)), value!({ "0" => "zero" }));
    }

    #[test]
    fn delete_from_arrays() {
        let old = value!(["a", "b", "c"]);
        assert_eq!(delete(&old, &Key::Index(0)), value!(["b", "c"]));
        assert!(delete(&old, &Key::Index(3)).ptr_eq(&old));
        assert!(delete(&old, &"0".into()).ptr_eq(&old));
    }

    #[test]
    fn delete_on_scalars_is_a_no_op() {
        assert_eq!(delete(&value!(5), &"a".into()), 5);
        assert!(delete(&Value::Null, &Key::Index(0)).is_null());
    }

    #[test]
    fn pipe_applies_the_transform() {
        let double = |v: &Value| Value::from(v.as_i64().unwrap_or_default() * 2);
        assert_eq!(pipe(&value!(21), &double), 42);
        assert!(pipe(&Value::Null, &double).is_null());
    }

    #[test]
    fn operations_dispatch_to_their_functions() {
        let old = value!({ "n" => 1 });
        let cases = [
            (Operation::Set(value!(0)), value!(0)),
            (
                Operation::Merge([("m", 2)].into()),
                value!({ "n" => 1, "m" => 2 }),
            ),
            (Operation::Delete("n".into()), value!({})),
            (
                Operation::pipe(|v| v.child("n").cloned().unwrap_or_default()),
                value!(1),
            ),
            (Operation::Extend(vec![1].into()), old.clone()),
            (Operation::Append(value!(1)), old.clone()),
        ];
        for (op, expected) in cases {
            assert_eq!(op.apply(&old), expected, "{op:?}");
        }
    }

    #[test]
    fn kinds_round_trip_through_names() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.as_str().parse::<OperationKind>(), Ok(kind));
        }
        assert_eq!(
            "patch".parse::<OperationKind>(),
            Err(UnknownOperation("patch".into()))
        );
        assert_eq!(Operation::Delete(Key::Index(0)).kind(), OperationKind::Delete);
        assert_eq!(format!("{:?}", Operation::pipe(Value::clone)), "Pipe(<fn>)");
    }
}
