// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::missing_panics_doc)] // Benches panic on failure
#![allow(clippy::semicolon_if_nothing_returned)] // Benchmark code formatting
#![allow(clippy::redundant_closure_for_method_calls)] // Bench code clarity

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use typedesc::ordering::{compare_strz, compare_tval, Context};
use typedesc::types::{builtin, Object, ScalarKind, StructBuilder, TemplateCons, TypeRef, Value};

fn message_type() -> TypeRef {
    StructBuilder::new("BenchMessage")
        .typed_field("id", builtin::scalar_type(ScalarKind::U64).clone())
        .typed_field("score", builtin::scalar_type(ScalarKind::F64).clone())
        .typed_field("payload", builtin::bytes_type().clone())
        .with_tracker()
        .build()
}

fn message_seed(ty: &TypeRef, id: u64) -> Value {
    let mut obj = Object::new(ty, vec![Value::U64(id), Value::F64(0.5), Value::Null])
        .expect("seed");
    obj.set_bytes("payload", &[0x5A; 256]).expect("payload");
    Value::Object(Box::new(obj))
}

// ============================================================================
// Construction
// ============================================================================

/// Benchmark: default init + free of a tracked struct
fn bench_init_free_default(c: &mut Criterion) {
    let ty = message_type();
    c.bench_function("init_free_default", |b| {
        b.iter(|| {
            let mut value = ty.init(&mut TemplateCons::new()).expect("init");
            ty.free(black_box(&mut value));
        })
    });
}

/// Benchmark: init from initials (deep copies a 256B buffer)
fn bench_init_free_initials(c: &mut Criterion) {
    let ty = message_type();
    let seed = message_seed(&ty, 7);
    c.bench_function("init_free_initials_256b", |b| {
        b.iter(|| {
            let mut value = ty
                .init(&mut TemplateCons::new().with_initials(black_box(&seed)))
                .expect("init");
            ty.free(&mut value);
        })
    });
}

/// Benchmark: recursive vs shallow dup
fn bench_dup(c: &mut Criterion) {
    let ty = message_type();
    let seed = message_seed(&ty, 9);
    let mut group = c.benchmark_group("dup");
    for recurse in [false, true] {
        group.bench_function(if recurse { "recursive" } else { "shallow" }, |b| {
            b.iter(|| {
                let mut copy = ty.dup(black_box(&seed), recurse).expect("dup");
                ty.free(&mut copy);
            })
        });
    }
    group.finish();
}

// ============================================================================
// Comparison
// ============================================================================

/// Benchmark: type-dispatched field-wise comparison
fn bench_compare_tval(c: &mut Criterion) {
    let ty = message_type();
    let a = message_seed(&ty, 1);
    let b2 = message_seed(&ty, 2);
    let ctx = Context::none();
    c.bench_function("compare_tval_struct", |b| {
        b.iter(|| compare_tval(&ctx, Some(black_box(&a)), Some(black_box(&b2))))
    });
}

/// Benchmark: NUL-terminated string comparison (64B common prefix)
fn bench_compare_strz(c: &mut Criterion) {
    let mut left = vec![b'a'; 64];
    left.push(b'x');
    let mut right = vec![b'a'; 64];
    right.push(b'y');
    let ctx = Context::none();
    c.bench_function("compare_strz_64b", |b| {
        b.iter(|| {
            compare_strz::<[u8]>(&ctx, Some(black_box(&left[..])), Some(black_box(&right[..])))
        })
    });
}

criterion_group!(
    construction_benches,
    bench_init_free_default,
    bench_init_free_initials,
    bench_dup
);

criterion_group!(comparison_benches, bench_compare_tval, bench_compare_strz);

criterion_main!(construction_benches, comparison_benches);
