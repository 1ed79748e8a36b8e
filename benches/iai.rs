// (c) Copyright 2025 Helsing GmbH. All rights reserved.
#![cfg_attr(not(target_os = "linux"), allow(dead_code, unused_imports))]

use graftree::{Array, Object, Session, Value, value};
use iai_callgrind::{library_benchmark, library_benchmark_group, main};
use std::hint::black_box;

/// A document with `n` records, each holding a small nested object and an array.
fn wide_document(n: usize) -> Value {
    graftree::enable_determinism();

    let records: Object = (0..n)
        .map(|i| {
            (
                format!("r{i}"),
                value!({ "meta" => { "rev" => (i as i64) }, "tags" => ["x", "y"] }),
            )
        })
        .collect();
    value!({ "records" => (records), "version" => 1 })
}

/// A chain of `depth` nested objects with an array at the bottom.
fn deep_document(depth: usize) -> (Value, Value) {
    graftree::enable_determinism();

    let mut doc = value!({ "leaf" => [1, 2, 3] });
    let mut selector = value!({ "leaf" => "#" });
    for _ in 0..depth {
        doc = value!({ "next" => (doc), "side" => [0] });
        selector = value!({ "next" => (selector) });
    }
    (doc, selector)
}

fn setup_wide(n: usize) -> (Session, Value) {
    let doc = wide_document(n);
    let session = Session::try_from(&value!({
        "records" => { "r0" => { "meta" => { "rev" => "#/rev" } }, "r1" => { "tags" => "#/tags" } },
        "version" => "#"
    }))
    .unwrap();
    (session, doc)
}

fn setup_deep(depth: usize) -> (Session, Value) {
    let (doc, selector) = deep_document(depth);
    (Session::try_from(&selector).unwrap(), doc)
}

#[library_benchmark]
#[bench::medium(setup_wide(255))]
fn wide_set((session, doc): (Session, Value)) {
    let doc = black_box(doc);
    let mut tx = session.bind(&doc);
    tx.set(2).of("#/rev").set(10).of("#/tags").set(Array::new());
    black_box(tx.apply().unwrap());
}

#[library_benchmark]
#[bench::medium(setup_wide(255))]
fn wide_pipe((session, doc): (Session, Value)) {
    let doc = black_box(doc);
    let mut tx = session.bind(&doc);
    tx.pipe(|v| Value::from(v.as_i64().unwrap_or(0) + 1))
        .of("#/rev")
        .pipe(|v| Value::from(v.as_i64().unwrap_or(0) * 2))
        .of("#/tags")
        .append("z");
    black_box(tx.apply().unwrap());
}

#[library_benchmark]
#[bench::medium(setup_wide(255))]
fn wide_missing_path((session, doc): (Session, Value)) {
    let doc = black_box(doc);
    let missing = Session::try_from(&value!({ "records" => { "absent" => "#" } })).unwrap();
    let mut tx = missing.bind(&doc);
    tx.set(0);
    black_box(tx.apply().unwrap());
    black_box(session);
}

#[library_benchmark]
#[bench::shallow(setup_deep(4))]
#[bench::deep(setup_deep(64))]
fn deep_append((session, doc): (Session, Value)) {
    let doc = black_box(doc);
    let mut tx = session.bind(&doc);
    tx.append(4);
    black_box(tx.apply().unwrap());
}

#[library_benchmark]
#[bench::deep(setup_deep(64))]
fn deep_delete((session, doc): (Session, Value)) {
    let doc = black_box(doc);
    let mut tx = session.bind(&doc);
    tx.delete(0_usize);
    black_box(tx.apply().unwrap());
}

#[library_benchmark]
#[bench::deep(deep_document(64))]
fn selector_validation((_, selector): (Value, Value)) {
    let selector = black_box(selector);
    black_box(Session::try_from(&selector).unwrap());
}

library_benchmark_group!(
    name = wide;
    benchmarks = wide_set, wide_pipe, wide_missing_path
);
library_benchmark_group!(
    name = deep;
    benchmarks = deep_append, deep_delete, selector_validation
);

#[cfg(target_os = "linux")]
main!(library_benchmark_groups = wide, deep);

#[cfg(not(target_os = "linux"))]
fn main() {}
