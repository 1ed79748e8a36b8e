// (c) Copyright 2025 Helsing GmbH. All rights reserved.
/// Convenience macro for building a [`Value`](crate::Value) inline.
///
/// Object literal (note the '{' and '}'):
/// ```rust
/// # use graftree::value;
/// let person = value!({
///     "name" => "Alice",
///     "age" => 30,
///     "address" => { "city" => "Berlin" }
/// });
/// assert_eq!(person["address"]["city"], "Berlin");
/// ```
///
/// Array literal (note the '[' and ']'):
/// ```rust
/// # use graftree::value;
/// let list = value!([1, "two", null, [3.0]]);
/// assert_eq!(list[1], "two");
/// ```
///
/// Each nested value must be a single token tree, so wrap anything longer (such as negative
/// numbers or expressions) in parentheses:
/// ```rust
/// # use graftree::value;
/// let offset = 4;
/// let v = value!({ "delta" => (-1), "total" => (offset * 2) });
/// assert_eq!(v["delta"], -1);
/// assert_eq!(v["total"], 8);
/// ```
///
/// Selectors are written the same way, with pointer markers at the leaves, and then validated
/// with [`Selector::from_value`](crate::Selector::from_value).
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    // Object
    ({ $($k:literal => $v:tt),* $(,)? }) => {
        {
            #[allow(unused_mut)]
            let mut object = $crate::Object::new();
            $( object.insert($k, $crate::value!($v)); )*
            $crate::Value::Object(object)
        }
    };

    // Array
    ([ $($v:tt),* $(,)? ]) => {
        {
            let items: ::std::vec::Vec<$crate::Value> = ::std::vec![$( $crate::value!($v) ),*];
            $crate::Value::Array($crate::Array::from(items))
        }
    };

    // Scalar
    ($e:expr) => {
        $crate::Value::from($e)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Value, value};

    #[test]
    fn value_macro_object() {
        let v = value!({
            "field_x" => "Hello",
            "field_y" => 2,
            "field_z" => {
                "field_x" => "Nested",
                "field_y" => null
            }
        });
        insta::assert_snapshot!(
            v.to_string(),
            @r#"{"field_x":"Hello","field_y":2,"field_z":{"field_x":"Nested","field_y":null}}"#
        );
    }

    #[test]
    fn value_macro_array() {
        let v = value!([(-1), 2.5, [], {}]);
        insta::assert_snapshot!(v.to_string(), @"[-1,2.5,[],{}]");
    }

    #[test]
    fn value_macro_scalars() {
        assert_eq!(value!(null), Value::Null);
        assert_eq!(value!(true), Value::Bool(true));
        assert_eq!(value!("s"), Value::from("s"));
        let x = 7;
        assert_eq!(value!(x), Value::Int(7));
    }
}
