//! Depth-first traversal of a document.
//!
//! A [`Visitor`] receives one event per stored value in insertion order.
//! Sequences produce `begin_sequence`, one event per element (holes as
//! `null_value`) in ascending index order, then `end_sequence`; nested
//! documents produce `begin_child`, their own entries, then `end_child`.
//!
//! Event keys are local: `b` for an entry named `b`, `b[2]` for the third
//! element of the sequence `b`.
//!
//! `begin_child` and `begin_sequence` may hand the scope off to a fresh
//! visitor. The handed-off visitor receives every event of that scope, and is
//! passed back to `end_child`/`end_sequence` so the parent can fold its result
//! in. Returning `None` keeps the events on the current visitor.
//!
//! After every event the driver asks [`Visitor::is_complete`]. Once the
//! visitor driving the walk returns `true`, the walk stops immediately
//! (pending `end_child`/`end_sequence` events are not delivered) and
//! [`Visitor::process`] produces the output. A handed-off visitor that
//! completes only ends its own scope.
//!
//! ```rust
//! use semidoc::prelude::*;
//! use semidoc::{key, Constant, Document, Key, Number, Visitor};
//!
//! #[derive(Default)]
//! struct CountScalars(usize);
//!
//! impl Visitor for CountScalars {
//!     type Output = usize;
//!
//!     fn null_value(&mut self, _: &Key) { self.0 += 1 }
//!     fn string_value(&mut self, _: &Key, _: &str) { self.0 += 1 }
//!     fn numeric_value(&mut self, _: &Key, _: &Number) { self.0 += 1 }
//!     fn boolean_value(&mut self, _: &Key, _: bool) { self.0 += 1 }
//!     fn enum_value(&mut self, _: &Key, _: &Constant) { self.0 += 1 }
//!
//!     fn process(self) -> usize { self.0 }
//! }
//!
//! let mut doc = Document::new();
//! doc.add_numbers(&key!("a"), [Some(1), None])?.add_string(&key!("b.c"), "x")?;
//! assert_eq!(doc.accept(CountScalars::default()), 3);
//! # Ok::<(), semidoc::Error>(())
//! ```

use crate::value::{Constant, Kind, Sequence};
use crate::{Document, Key, Number, Value};
use std::ops::ControlFlow;
use tracing::trace;

/// Receives traversal events for one document.
pub trait Visitor: Sized {
    /// The result of the traversal.
    type Output;

    /// Called once with the root document before any other event.
    fn initialise(&mut self, _document: &Document) {}

    fn null_value(&mut self, key: &Key);

    fn string_value(&mut self, key: &Key, value: &str);

    fn numeric_value(&mut self, key: &Key, value: &Number);

    fn boolean_value(&mut self, key: &Key, value: bool);

    fn enum_value(&mut self, key: &Key, value: &Constant);

    /// A nested document starts; its entries follow.
    ///
    /// Returning a visitor hands the document's entries to it.
    fn begin_child(&mut self, _key: &Key, _document: &Document) -> Option<Self> {
        None
    }

    /// A nested document ends. `child` is the visitor `begin_child` handed
    /// the scope to, if any.
    fn end_child(&mut self, _key: &Key, _child: Option<Self>) {}

    /// A sequence of `len` elements of `kind` starts; its elements follow.
    ///
    /// Returning a visitor hands the elements to it.
    fn begin_sequence(&mut self, _key: &Key, _kind: Kind, _len: usize) -> Option<Self> {
        None
    }

    /// A sequence ends. `child` is the visitor `begin_sequence` handed the
    /// scope to, if any.
    fn end_sequence(&mut self, _key: &Key, _child: Option<Self>) {}

    /// Returning `true` stops the traversal after the current event.
    fn is_complete(&self) -> bool {
        false
    }

    /// Consumes the visitor and yields its output.
    fn process(self) -> Self::Output;
}

/// Drives `visitor` over `document` and returns its output.
pub fn walk<V: Visitor>(document: &Document, mut visitor: V) -> V::Output {
    visitor.initialise(document);
    if check(&visitor).is_continue() && walk_document(document, &mut visitor).is_break() {
        trace!("visitor completed before the end of the document");
    }
    visitor.process()
}

fn check<V: Visitor>(visitor: &V) -> ControlFlow<()> {
    if visitor.is_complete() {
        ControlFlow::Break(())
    } else {
        ControlFlow::Continue(())
    }
}

/// Sends the events of one scope to the handed-off visitor if there is one,
/// otherwise to `visitor`. The handed-off visitor is returned for the
/// closing event.
fn enter<V, F>(visitor: &mut V, child: Option<V>, events: F) -> ControlFlow<(), Option<V>>
where
    V: Visitor,
    F: FnOnce(&mut V) -> ControlFlow<()>,
{
    match child {
        Some(mut child) => {
            if check(&child).is_continue() && events(&mut child).is_break() {
                trace!("handed-off visitor completed before the end of its scope");
            }
            ControlFlow::Continue(Some(child))
        }
        None => {
            check(visitor)?;
            events(visitor)?;
            ControlFlow::Continue(None)
        }
    }
}

fn walk_document<V: Visitor>(document: &Document, visitor: &mut V) -> ControlFlow<()> {
    for (name, value) in document {
        match value {
            Value::Sequence(sequence) => {
                let key = Key::from_element(name, None);
                let child = visitor.begin_sequence(&key, sequence.kind(), sequence.len());
                let child = enter(visitor, child, |v| walk_elements(name, sequence, v))?;
                visitor.end_sequence(&key, child);
                check(visitor)?;
            }
            other => walk_value(&Key::from_element(name, None), other, visitor)?,
        }
    }
    ControlFlow::Continue(())
}

fn walk_elements<V: Visitor>(name: &str, sequence: &Sequence, visitor: &mut V) -> ControlFlow<()> {
    for (index, element) in sequence.iter().enumerate() {
        walk_value(&Key::from_element(name, Some(index)), element, visitor)?;
    }
    ControlFlow::Continue(())
}

fn walk_value<V: Visitor>(key: &Key, value: &Value, visitor: &mut V) -> ControlFlow<()> {
    match value {
        Value::Null => visitor.null_value(key),
        Value::String(s) => visitor.string_value(key, s),
        Value::Number(n) => visitor.numeric_value(key, n),
        Value::Bool(b) => visitor.boolean_value(key, *b),
        Value::Enum(c) => visitor.enum_value(key, c),
        Value::Document(document) => {
            let child = visitor.begin_child(key, document);
            let child = enter(visitor, child, |v| walk_document(document, v))?;
            visitor.end_child(key, child);
        }
        // Sequences never hold sequences.
        Value::Sequence(_) => {}
    }
    check(visitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::key;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        stop_after: Option<usize>,
    }

    impl Visitor for Recorder {
        type Output = Vec<String>;

        fn null_value(&mut self, key: &Key) {
            self.events.push(format!("null {key}"));
        }

        fn string_value(&mut self, key: &Key, value: &str) {
            self.events.push(format!("string {key}={value}"));
        }

        fn numeric_value(&mut self, key: &Key, value: &Number) {
            self.events.push(format!("number {key}={value}"));
        }

        fn boolean_value(&mut self, key: &Key, value: bool) {
            self.events.push(format!("boolean {key}={value}"));
        }

        fn enum_value(&mut self, key: &Key, value: &Constant) {
            self.events.push(format!("enum {key}={value}"));
        }

        fn begin_child(&mut self, key: &Key, _document: &Document) -> Option<Self> {
            self.events.push(format!("begin {key}"));
            None
        }

        fn end_child(&mut self, key: &Key, _child: Option<Self>) {
            self.events.push(format!("end {key}"));
        }

        fn begin_sequence(&mut self, key: &Key, kind: Kind, len: usize) -> Option<Self> {
            self.events.push(format!("begin_sequence {key} {kind} {len}"));
            None
        }

        fn end_sequence(&mut self, key: &Key, _child: Option<Self>) {
            self.events.push(format!("end_sequence {key}"));
        }

        fn is_complete(&self) -> bool {
            self.stop_after.map_or(false, |n| self.events.len() >= n)
        }

        fn process(self) -> Vec<String> {
            self.events
        }
    }

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.add_string(&key!("a"), "x")
            .unwrap()
            .add_number(&key!("b.c"), 1)
            .unwrap()
            .add_numbers(&key!("b.d"), [Some(1), None])
            .unwrap()
            .add_boolean(&key!("e"), true)
            .unwrap();
        doc
    }

    #[test]
    fn test_events_in_order() {
        let events = sample().accept(Recorder::default());
        assert_eq!(
            events,
            vec![
                "string a=x",
                "begin b",
                "number c=1",
                "begin_sequence d number 2",
                "number d[0]=1",
                "null d[1]",
                "end_sequence d",
                "end b",
                "boolean e=true",
            ]
        );
    }

    #[test]
    fn test_early_completion_skips_pending_ends() {
        let visitor = Recorder {
            stop_after: Some(3),
            ..Recorder::default()
        };
        let events = sample().accept(visitor);
        assert_eq!(events, vec!["string a=x", "begin b", "number c=1"]);
    }

    #[test]
    fn test_empty_document_produces_no_events() {
        assert!(Document::new().accept(Recorder::default()).is_empty());
    }

    #[derive(Debug, Default, PartialEq)]
    struct Node {
        leaves: Vec<String>,
        children: Vec<(String, Node)>,
    }

    /// Builds one `Node` per scope by handing each scope to a fresh outline.
    #[derive(Default)]
    struct Outline {
        node: Node,
        limit: Option<usize>,
        child_limit: Option<usize>,
    }

    impl Outline {
        fn leaf(&mut self, key: &Key) {
            self.node.leaves.push(key.to_string());
        }

        fn scope(&self) -> Outline {
            Outline {
                limit: self.child_limit,
                child_limit: self.child_limit,
                ..Outline::default()
            }
        }

        fn fold(&mut self, key: &Key, child: Option<Outline>) {
            if let Some(child) = child {
                self.node.children.push((key.to_string(), child.process()));
            }
        }
    }

    impl Visitor for Outline {
        type Output = Node;

        fn null_value(&mut self, key: &Key) {
            self.leaf(key);
        }

        fn string_value(&mut self, key: &Key, _value: &str) {
            self.leaf(key);
        }

        fn numeric_value(&mut self, key: &Key, _value: &Number) {
            self.leaf(key);
        }

        fn boolean_value(&mut self, key: &Key, _value: bool) {
            self.leaf(key);
        }

        fn enum_value(&mut self, key: &Key, _value: &Constant) {
            self.leaf(key);
        }

        fn begin_child(&mut self, _key: &Key, _document: &Document) -> Option<Self> {
            Some(self.scope())
        }

        fn end_child(&mut self, key: &Key, child: Option<Self>) {
            self.fold(key, child);
        }

        fn begin_sequence(&mut self, _key: &Key, _kind: Kind, _len: usize) -> Option<Self> {
            Some(self.scope())
        }

        fn end_sequence(&mut self, key: &Key, child: Option<Self>) {
            self.fold(key, child);
        }

        fn is_complete(&self) -> bool {
            self.limit.map_or(false, |n| self.node.leaves.len() >= n)
        }

        fn process(self) -> Node {
            self.node
        }
    }

    fn leaves(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_handed_off_visitors_build_nested_results() {
        let outline = sample().accept(Outline::default());
        let expected = Node {
            leaves: leaves(&["a", "e"]),
            children: vec![(
                "b".to_string(),
                Node {
                    leaves: leaves(&["c"]),
                    children: vec![(
                        "d".to_string(),
                        Node {
                            leaves: leaves(&["d[0]", "d[1]"]),
                            children: Vec::new(),
                        },
                    )],
                },
            )],
        };
        assert_eq!(outline, expected);
    }

    #[test]
    fn test_completed_child_only_ends_its_scope() {
        let mut doc = Document::new();
        doc.add_number(&key!("b.c"), 1)
            .unwrap()
            .add_number(&key!("b.f"), 2)
            .unwrap()
            .add_boolean(&key!("g"), true)
            .unwrap();

        let visitor = Outline {
            child_limit: Some(1),
            ..Outline::default()
        };
        let outline = doc.accept(visitor);
        assert_eq!(outline.leaves, leaves(&["g"]));
        assert_eq!(outline.children.len(), 1);
        assert_eq!(outline.children[0].1.leaves, leaves(&["c"]));
    }
}
