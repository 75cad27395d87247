/// Parses a key literal.
///
/// # Panics
///
/// Panics if the literal does not satisfy the key grammar.
///
/// ```rust
/// use semidoc::key;
///
/// let port = key!("servers[1].port");
/// assert_eq!(port.elements().len(), 2);
/// ```
#[macro_export]
macro_rules! key {
    ($key:expr) => {
        $crate::Key::parse($key).expect("invalid key literal")
    };
}

/// Builds a [`Document`](crate::Document) from a JSON-like literal.
///
/// Member names are key literals, so `"a.b": 1` creates the nested document
/// `a`. Arrays become sequences with an inferred kind; mixed arrays become
/// string sequences. Negative number literals are accepted as they are. Any
/// other value is one token tree converted with `Value::from`, so wrap paths
/// and calls in parentheses: `"c": (Color::Red)`.
///
/// # Panics
///
/// Panics if a member name is not a valid key or two members collide.
///
/// ```rust
/// use semidoc::prelude::*;
/// use semidoc::{doc, key};
///
/// let doc = doc!({
///     "name": "Ada",
///     "born": 1815,
///     "offset": -3,
///     "tags": ["math", null, "engines"],
///     "address": { "city": "London" }
/// });
///
/// assert_eq!(doc.get::<String>(&key!("address.city"))?, "London");
/// assert_eq!(doc.get::<i32>(&key!("offset"))?, -3);
/// assert_eq!(doc.sequence_len(&key!("tags")), Some(3));
/// # Ok::<(), semidoc::Error>(())
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::Document::new()
    };

    ({ $($members:tt)+ }) => {{
        let mut document = $crate::Document::new();
        $crate::doc!(@members document $($members)+);
        document
    }};

    (@members $document:ident) => {};

    (@members $document:ident $name:literal : - $value:literal $(, $($rest:tt)*)?) => {
        $document
            .insert(&$crate::key!($name), $crate::Value::from(-$value))
            .expect("invalid document literal");
        $crate::doc!(@members $document $($($rest)*)?);
    };

    (@members $document:ident $name:literal : $value:tt $(, $($rest:tt)*)?) => {
        $document
            .insert(&$crate::key!($name), $crate::doc!(@value $value))
            .expect("invalid document literal");
        $crate::doc!(@members $document $($($rest)*)?);
    };

    (@elements $items:ident) => {};

    (@elements $items:ident - $value:literal $(, $($rest:tt)*)?) => {
        $items.push($crate::Value::from(-$value));
        $crate::doc!(@elements $items $($($rest)*)?);
    };

    (@elements $items:ident $value:tt $(, $($rest:tt)*)?) => {
        $items.push($crate::doc!(@value $value));
        $crate::doc!(@elements $items $($($rest)*)?);
    };

    (@value null) => {
        $crate::Value::Null
    };

    (@value true) => {
        $crate::Value::Bool(true)
    };

    (@value false) => {
        $crate::Value::Bool(false)
    };

    (@value [ $($elements:tt)* ]) => {{
        #[allow(unused_mut)]
        let mut items: ::std::vec::Vec<$crate::Value> = ::std::vec::Vec::new();
        $crate::doc!(@elements items $($elements)*);
        $crate::Value::Sequence($crate::Sequence::infer(items))
    }};

    (@value { $($inner:tt)* }) => {
        $crate::Value::Document($crate::doc!({ $($inner)* }))
    };

    (@value $other:expr) => {
        $crate::Value::from($other)
    };
}

/// Declares an enum of named constants and implements
/// [`EnumConstant`](crate::EnumConstant), [`FromValue`](crate::FromValue) and
/// `From<_> for Value` for it.
///
/// ```rust
/// use semidoc::prelude::*;
/// use semidoc::{constants, key, Document};
///
/// constants! {
///     pub enum Color {
///         Red = "RED",
///         DarkBlue = "DARK_BLUE",
///     }
/// }
///
/// let mut doc = Document::new();
/// doc.add_enum(&key!("fg"), Color::Red)?.add_string(&key!("bg"), "dark blue")?;
///
/// assert_eq!(doc.get::<Color>(&key!("fg"))?, Color::Red);
/// assert_eq!(doc.get::<Color>(&key!("bg"))?, Color::DarkBlue);
/// assert_eq!(Color::DarkBlue.dotted_key()?.as_str(), "dark.blue");
/// # Ok::<(), semidoc::Error>(())
/// ```
#[macro_export]
macro_rules! constants {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::EnumConstant for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn variants() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl $crate::FromValue for $name {
            const KIND: &'static str = stringify!($name);

            fn from_value(value: &$crate::Value) -> $crate::Result<Self> {
                $crate::convert::enum_from_value(value)
            }
        }

        impl ::core::convert::From<$name> for $crate::Value {
            fn from(value: $name) -> Self {
                $crate::Value::Enum($crate::Constant::of(value))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::traits::ReadableDocument;
    use crate::value::Kind;
    use crate::{Document, EnumConstant, Error, Value};

    constants! {
        /// Test levels.
        enum Level {
            Low = "LOW",
            VeryHigh = "VERY_HIGH",
        }
    }

    #[test]
    fn test_key_macro() {
        assert_eq!(key!("a.b[2]").as_str(), "a.b[2]");
    }

    #[test]
    #[should_panic(expected = "invalid key literal")]
    fn test_key_macro_rejects_bad_literals() {
        let _ = key!("a..b");
    }

    #[test]
    fn test_doc_macro_empty() {
        assert_eq!(doc!({}), Document::new());
    }

    #[test]
    fn test_doc_macro_scalars_and_nesting() {
        let doc = doc!({
            "s": "text",
            "n": 2.5,
            "b": false,
            "z": null,
            "inner": { "deep": { "x": 1 } },
            "a.b": true,
        });
        assert_eq!(doc.get::<f64>(&key!("n")).unwrap(), 2.5);
        assert!(!doc.get::<bool>(&key!("b")).unwrap());
        assert!(doc.contains(&key!("z")));
        assert!(!doc.has_value(&key!("z")));
        assert_eq!(doc.get::<i32>(&key!("inner.deep.x")).unwrap(), 1);
        assert!(doc.get::<bool>(&key!("a.b")).unwrap());
    }

    #[test]
    fn test_doc_macro_negative_literals() {
        let doc = doc!({
            "n": -5,
            "f": -2.5,
            "list": [-1, 2, -3],
            "inner": { "m": -7 },
        });
        assert_eq!(doc.get::<i64>(&key!("n")).unwrap(), -5);
        assert_eq!(doc.get::<f64>(&key!("f")).unwrap(), -2.5);
        assert_eq!(
            doc.get_all::<i32>(&key!("list")).unwrap(),
            vec![Some(-1), Some(2), Some(-3)]
        );
        assert_eq!(doc.get::<i32>(&key!("inner.m")).unwrap(), -7);
    }

    #[test]
    fn test_doc_macro_sequences() {
        let doc = doc!({
            "nums": [1, null, 3],
            "mixed": [1, "x"],
            "people": [{ "name": "a" }, { "name": "b" }],
            "none": [],
        });
        assert_eq!(
            doc.get_all::<i32>(&key!("nums")).unwrap(),
            vec![Some(1), None, Some(3)]
        );
        let mixed = doc.value(&key!("mixed")).unwrap();
        assert_eq!(mixed.as_sequence().unwrap().kind(), Kind::String);
        assert_eq!(doc.get::<String>(&key!("people[1].name")).unwrap(), "b");
        assert_eq!(doc.sequence_len(&key!("none")), Some(0));
    }

    #[test]
    fn test_constants_macro() {
        assert_eq!(Level::TYPE_NAME, "Level");
        assert_eq!(Level::variants(), &[Level::Low, Level::VeryHigh]);
        assert_eq!(Level::VeryHigh.name(), "VERY_HIGH");
        assert_eq!(
            crate::convert::enum_from_value::<Level>(&Value::from("very high")).unwrap(),
            Level::VeryHigh
        );
        assert!(matches!(
            crate::convert::enum_from_value::<Level>(&Value::from("medium")),
            Err(Error::Conversion { .. })
        ));
        match Value::from(Level::Low) {
            Value::Enum(constant) => assert_eq!(constant.type_name(), Some("Level")),
            other => panic!("unexpected value {other:?}"),
        }
    }
}
