use std::sync::Arc;

use class_proxy::{BinaryOp, Class, CompareOp, ProxyRegistry, Value, protocol, synthesize, types::builtins};
use criterion::{Bencher, Criterion, black_box, criterion_group, criterion_main};

fn provenance() -> Arc<Class> {
    Class::builder("Provenance")
        .init(|this, args| this.set_attr("source", args.first().cloned().unwrap_or(Value::None)))
        .method("describe", |this, _| this.get_attr("source"))
        .build()
}

/// Runs `op` on a proxied operand and on the plain value it wraps.
///
/// The result is checked once outside the timed loop so both variants are known
/// to compute the same thing.
fn run_op(bench: &mut Bencher, value: &Value, op: impl Fn(&Value) -> Value, expected: i64) {
    assert_eq!(op(value).as_int(), Some(expected));
    bench.iter(|| black_box(op(black_box(value))));
}

fn tracked_int(n: i64) -> Value {
    synthesize(Some(&builtins().int), &provenance())
        .call(&[Value::Int(n), Value::str("bench")])
        .unwrap()
}

/// Attribute lookup on each tier.
fn attribute_lookup(c: &mut Criterion) {
    let value = tracked_int(42);
    c.bench_function("attr_state__proxy", |b| {
        b.iter(|| black_box(value.get_attr("source").unwrap()));
    });
    c.bench_function("attr_base_method__proxy", |b| {
        b.iter(|| black_box(value.get_attr("describe").unwrap()));
    });
    c.bench_function("attr_wrapped__proxy", |b| {
        b.iter(|| black_box(value.get_attr("bit_length").unwrap()));
    });
    c.bench_function("attr_wrapped__plain", |b| {
        b.iter(|| black_box(Value::Int(42).get_attr("bit_length").unwrap()));
    });
}

/// Operator hooks forwarded to the wrapped value.
fn hook_dispatch(c: &mut Criterion) {
    let add = |value: &Value| protocol::binary_op(value, &Value::Int(1), BinaryOp::Add).unwrap();
    c.bench_function("add__proxy", |b| run_op(b, &tracked_int(41), add, 42));
    c.bench_function("add__plain", |b| run_op(b, &Value::Int(41), add, 42));

    let radd = |value: &Value| protocol::binary_op(&Value::Int(1), value, BinaryOp::Add).unwrap();
    c.bench_function("radd__proxy", |b| run_op(b, &tracked_int(41), radd, 42));

    let lhs = tracked_int(1);
    let rhs = tracked_int(2);
    c.bench_function("lt_two_proxies", |b| {
        b.iter(|| black_box(protocol::compare_bool(&lhs, &rhs, CompareOp::Lt).unwrap()));
    });
    c.bench_function("hash__proxy", |b| b.iter(|| black_box(protocol::hash(&lhs).unwrap())));
}

/// Type synthesis, uncached and through a registry.
fn synthesis(c: &mut Criterion) {
    let base = provenance();
    c.bench_function("synthesize", |b| {
        b.iter(|| black_box(synthesize(Some(&builtins().int), &base)));
    });
    let registry = ProxyRegistry::new();
    c.bench_function("registry_cached", |b| {
        b.iter(|| black_box(registry.wrap_with(Some(&builtins().int), &base, None)));
    });
}

criterion_group!(benches, attribute_lookup, hook_dispatch, synthesis);
criterion_main!(benches);
