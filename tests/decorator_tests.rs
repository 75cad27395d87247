use semidoc::prelude::*;
use semidoc::{key, Document, Error, NullFiltering, Synchronized, Unmodifiable, Value};
use std::sync::Arc;
use std::thread;

#[test]
fn test_filter_keeps_null_documents() {
    let mut filtered = NullFiltering::new(Document::new());
    filtered.add_document(&key!("d"), None::<Document>).unwrap();
    filtered.add_number(&key!("n"), None::<i32>).unwrap();
    filtered.append_boolean(&key!("b"), None::<bool>).unwrap();

    assert!(filtered.contains(&key!("d")));
    assert!(!filtered.contains(&key!("n")));
    assert!(!filtered.contains(&key!("b")));
}

#[test]
fn test_filter_over_existing_sequence() {
    let mut doc = Document::new();
    doc.add_strings(&key!("s"), ["a", "b"]).unwrap();

    let mut filtered = NullFiltering::new(&mut doc);
    filtered.append_string(&key!("s"), None::<String>).unwrap();
    filtered.add_string(&key!("s[1]"), None::<String>).unwrap();

    assert_eq!(doc.sequence_len(&key!("s")), Some(2));
    assert_eq!(doc.get::<String>(&key!("s[1]")).unwrap(), "b");
}

#[test]
fn test_synchronized_concurrent_writers() {
    let shared = Arc::new(Synchronized::new(Document::new()));
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let mut writer = &*shared;
                for i in 0..25 {
                    writer.append_number(&key!("all"), t * 100 + i).unwrap();
                    let own = key!(format!("t{t}.count").as_str());
                    writer.add_number(&own, i + 1).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(shared.sequence_len(&key!("all")), Some(100));
    for t in 0..4 {
        let own = key!(format!("t{t}.count").as_str());
        assert_eq!(shared.get::<i32>(&own).unwrap(), 25);
    }
}

#[test]
fn test_stacked_decorators() {
    let shared = Synchronized::new(NullFiltering::new(Document::new()));
    let mut writer = &shared;
    writer
        .add_numbers(&key!("n"), [Some(1), None, Some(3)])
        .unwrap();
    assert_eq!(
        shared.get_all::<i32>(&key!("n")).unwrap(),
        vec![Some(1), Some(3)]
    );

    let mut view = Unmodifiable::new(&shared);
    assert_eq!(view.get::<i32>(&key!("n[1]")).unwrap(), 3);
    assert!(matches!(
        view.add_string(&key!("x"), "y"),
        Err(Error::UnsupportedMutation { operation: "add", .. })
    ));
    assert!(!shared.contains(&key!("x")));
}

#[test]
fn test_unmodifiable_error_names_operation_and_key() {
    let doc = Document::new();
    let mut view = doc.unmodifiable();
    let err = view
        .add_strings(&key!("a.b"), [Value::from("x")])
        .unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedMutation { operation: "add all", ref key } if key == "a.b"
    ));
    assert!(err.to_string().contains("a.b"));
}

#[test]
fn test_snapshot_is_independent() {
    let shared = Synchronized::new(Document::new());
    let mut writer = &shared;
    writer.add_string(&key!("a"), "before").unwrap();

    let snapshot = shared.snapshot();
    writer.add_string(&key!("a"), "after").unwrap();

    assert_eq!(snapshot.get::<String>(&key!("a")).unwrap(), "before");
    assert_eq!(shared.get::<String>(&key!("a")).unwrap(), "after");
}
