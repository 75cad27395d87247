use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use semidoc::prelude::*;
use semidoc::{
    from_compact_str, from_json_str, from_properties_str, from_xml_str, key, to_compact_string,
    to_json_string, to_properties_string, to_xml_string, Document, Key,
};

fn sample_document(users: usize) -> Document {
    let mut doc = Document::new();
    doc.add_string(&key!("service.name"), "inventory")
        .unwrap()
        .add_number(&key!("service.port"), 8080)
        .unwrap();
    for i in 0..users {
        let user = Key::builder()
            .element("users")
            .index(i)
            .build()
            .unwrap();
        doc.add_number(&user.child("id").unwrap(), i)
            .unwrap()
            .add_string(&user.child("email").unwrap(), format!("user{i}@example.com"))
            .unwrap()
            .add_boolean(&user.child("active").unwrap(), i % 2 == 0)
            .unwrap();
    }
    doc
}

fn benchmark_key_parse(c: &mut Criterion) {
    c.bench_function("key_parse", |b| {
        b.iter(|| Key::parse(black_box("servers[12].listeners[3].tls.cert_path")))
    });
}

fn benchmark_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");

    for size in [10, 100, 500].iter() {
        let doc = sample_document(*size);
        group.bench_with_input(BenchmarkId::new("json", size), &doc, |b, doc| {
            b.iter(|| to_json_string(black_box(doc)))
        });
        group.bench_with_input(BenchmarkId::new("xml", size), &doc, |b, doc| {
            b.iter(|| to_xml_string(black_box(doc)))
        });
        group.bench_with_input(BenchmarkId::new("compact", size), &doc, |b, doc| {
            b.iter(|| to_compact_string(black_box(doc)))
        });
        group.bench_with_input(BenchmarkId::new("properties", size), &doc, |b, doc| {
            b.iter(|| to_properties_string(black_box(doc)))
        });
    }

    group.finish();
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for size in [10, 100, 500].iter() {
        let doc = sample_document(*size);
        let json = to_json_string(&doc);
        let xml = to_xml_string(&doc);
        let compact = to_compact_string(&doc);
        let properties = to_properties_string(&doc);

        group.bench_with_input(BenchmarkId::new("json", size), &json, |b, input| {
            b.iter(|| from_json_str(black_box(input)))
        });
        group.bench_with_input(BenchmarkId::new("xml", size), &xml, |b, input| {
            b.iter(|| from_xml_str(black_box(input)))
        });
        group.bench_with_input(BenchmarkId::new("compact", size), &compact, |b, input| {
            b.iter(|| from_compact_str(black_box(input)))
        });
        group.bench_with_input(BenchmarkId::new("properties", size), &properties, |b, input| {
            b.iter(|| from_properties_str(black_box(input)))
        });
    }

    group.finish();
}

fn benchmark_typed_reads(c: &mut Criterion) {
    let doc = sample_document(100);
    let keys: Vec<Key> = (0..100)
        .map(|i| Key::parse(&format!("users[{i}].id")).unwrap())
        .collect();

    c.bench_function("typed_reads", |b| {
        b.iter(|| {
            keys.iter()
                .map(|k| doc.get::<u64>(black_box(k)).unwrap())
                .sum::<u64>()
        })
    });
}

fn benchmark_append(c: &mut Criterion) {
    c.bench_function("append_1000_numbers", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            let k = key!("values");
            for i in 0..1000 {
                doc.append_number(&k, black_box(i)).unwrap();
            }
            doc
        })
    });
}

criterion_group!(
    benches,
    benchmark_key_parse,
    benchmark_serialize,
    benchmark_parse,
    benchmark_typed_reads,
    benchmark_append
);
criterion_main!(benches);
