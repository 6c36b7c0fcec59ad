// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Exact values round-trip through fields
#![allow(clippy::cast_possible_truncation)] // Random test parameters

//! Behavioural properties of managers, trackers, constructors and comparers.

mod common;

use common::Recorder;
use std::collections::HashSet;
use typedesc::memory::{allocate, allocate_zeroed, MemoryTracker};
use typedesc::ordering::{compare_tval, Comparer, Context, Ordering};
use typedesc::types::{
    builtin, FromValue, Object, ScalarKind, StructBuilder, TemplateCons, TypeDescriptor, TypeKind,
    TypeRef, Value,
};

fn scalar(kind: ScalarKind) -> TypeRef {
    builtin::scalar_type(kind).clone()
}

// ============================================================================
// Memory manager fallback
// ============================================================================

#[test]
fn test_calloc_fallback_zero_fills() {
    let recorder = Recorder::new();
    let manager = recorder.manager();
    assert!(!manager.has_calloc());

    for _ in 0..50 {
        let n = fastrand::usize(0..16);
        let s = fastrand::usize(0..32);
        let block = allocate_zeroed(Some(&manager), n, s).expect("calloc");
        assert_eq!(block.len(), n * s);
        assert!(block.as_slice().iter().all(|&b| b == 0));

        let mut manual = allocate(Some(&manager), n * s).expect("malloc");
        manual.as_mut_slice().fill(0);
        assert_eq!(block.as_slice(), manual.as_slice());

        manager.release(block);
        manager.release(manual);
    }
}

// ============================================================================
// Tracker round-trip
// ============================================================================

#[test]
fn test_tracker_releases_each_buffer_once() {
    for _ in 0..20 {
        let recorder = Recorder::new();
        let mut tracker = MemoryTracker::new(Some(recorder.manager()));

        let count = fastrand::usize(0..40);
        let mut addrs = HashSet::new();
        for _ in 0..count {
            let buf = tracker.allocate(fastrand::usize(1..64)).expect("alloc");
            addrs.insert(buf.addr().expect("live"));
        }
        assert_eq!(tracker.count(), count);

        tracker.release_all();
        let frees = recorder.frees();
        assert_eq!(frees.len(), count);
        assert_eq!(frees.iter().copied().collect::<HashSet<_>>(), addrs);

        // Second release: nothing left to free
        tracker.release_all();
        assert_eq!(recorder.frees().len(), count);
    }
}

#[test]
fn test_zero_tracker_release_is_noop() {
    let recorder = Recorder::new();
    let mut tracker = MemoryTracker::default();
    tracker.bind(Some(recorder.manager()));
    assert!(!tracker.release_all());
    assert!(recorder.events().is_empty());
}

// ============================================================================
// Constructor default and override rules
// ============================================================================

/// `a`: scalar type whose default is 42, generic zero check.
/// `b`: i32 field where only -1 counts as default.
fn defaults_fixture() -> TypeRef {
    let answer = TypeDescriptor::new("answer", TypeKind::Scalar(ScalarKind::I32))
        .with_default(Value::I32(42))
        .into_ref();
    StructBuilder::new("Defaults")
        .typed_field("a", answer)
        .field_with_default_check("b", scalar(ScalarKind::I32), |v| {
            matches!(v, Value::I32(-1))
        })
        .build()
}

fn initials(ty: &TypeRef, a: i32, b: i32) -> Value {
    Value::Object(Box::new(
        Object::new(ty, vec![Value::I32(a), Value::I32(b)]).expect("initials"),
    ))
}

fn field(value: &Value, name: &str) -> i32 {
    value
        .as_object()
        .expect("object")
        .get::<i32>(name)
        .expect("field")
}

#[test]
fn test_default_rule_replaces_zero_fields() {
    let ty = defaults_fixture();
    for x in [5, 0, i32::MAX, -7] {
        let src = initials(&ty, 0, x);
        let value = ty
            .init(&mut TemplateCons::new().with_initials(&src))
            .expect("init");
        assert_eq!(field(&value, "a"), 42);
        // Custom predicate: 0 is not the default for `b`
        assert_eq!(field(&value, "b"), x);
    }

    let src = initials(&ty, 0, -1);
    let value = ty
        .init(&mut TemplateCons::new().with_initials(&src))
        .expect("init");
    assert_eq!(field(&value, "b"), 0);
}

#[test]
fn test_default_instance_fills_skipped_fields() {
    let ty = StructBuilder::new("Preset")
        .typed_field("a", scalar(ScalarKind::I32))
        .typed_field("b", scalar(ScalarKind::I32))
        .default_instance(vec![Value::I32(7), Value::I32(8)])
        .build();

    let plain = ty.init(&mut TemplateCons::new()).expect("init");
    assert_eq!(field(&plain, "a"), 7);
    assert_eq!(field(&plain, "b"), 8);

    // Zero `a` is skipped, so the default instance supplies it
    let src = initials(&ty, 0, 5);
    let value = ty
        .init(&mut TemplateCons::new().with_initials(&src))
        .expect("init");
    assert_eq!(field(&value, "a"), 7);
    assert_eq!(field(&value, "b"), 5);
}

#[test]
fn test_override_forces_initial_value() {
    let ty = defaults_fixture();
    let src = initials(&ty, 0, 5);
    let force_a = |index: usize| index == 0;

    let value = ty
        .init(
            &mut TemplateCons::new()
                .with_initials(&src)
                .with_override(&force_a),
        )
        .expect("init");
    assert_eq!(field(&value, "a"), 0);
    assert_eq!(field(&value, "b"), 5);
}

// ============================================================================
// Ordering encoding
// ============================================================================

#[test]
fn test_invert_negates_ordinary_results() {
    for _ in 0..100 {
        let r = Ordering::from_raw(fastrand::i32(..));
        if r.is_ordinary() {
            assert_eq!(r.invert().raw(), -r.raw());
        } else {
            assert_eq!(r.invert(), r);
        }
    }
    assert_eq!(Ordering::INVALID.invert(), Ordering::INVALID);
    assert_eq!(Ordering::MISMATCH.invert(), Ordering::MISMATCH);
}

// ============================================================================
// Type-dispatch symmetry
// ============================================================================

fn sample_type() -> TypeRef {
    let inner = StructBuilder::new("Inner")
        .typed_field("tag", scalar(ScalarKind::U8))
        .build();
    StructBuilder::new("Sample")
        .typed_field("id", scalar(ScalarKind::I32))
        .typed_field("weight", scalar(ScalarKind::F64))
        .typed_field("inner", inner)
        .build()
}

fn random_sample(ty: &TypeRef) -> Value {
    let inner_ty = ty
        .is_struct()
        .and_then(|d| d.field(2))
        .and_then(|f| f.ty.clone())
        .expect("inner type");
    let inner = Object::new(&inner_ty, vec![Value::U8(fastrand::u8(0..3))]).expect("inner");
    Value::Object(Box::new(
        Object::new(
            ty,
            vec![
                Value::I32(fastrand::i32(-2..2)),
                Value::F64(f64::from(fastrand::u8(0..3)) / 2.0),
                Value::Object(Box::new(inner)),
            ],
        )
        .expect("sample"),
    ))
}

#[test]
fn test_generic_comparison_is_antisymmetric() {
    let ty = sample_type();
    let cmp = Comparer::typed(None);
    for _ in 0..200 {
        let x = random_sample(&ty);
        let y = random_sample(&ty);
        let xy = cmp.cmp(&x, &y);
        let yx = cmp.cmp(&y, &x);
        assert!(xy.is_ordinary());
        assert_eq!(xy, yx.invert());
    }
}

#[test]
fn test_typed_context_for_erased_values() {
    let ctx = Context::of_type(scalar(ScalarKind::U64));
    let a = Value::U64(3);
    let b = Value::U64(9);
    assert_eq!(compare_tval(&ctx, Some(&a), Some(&b)), Ordering::LESS);
    assert_eq!(compare_tval(&Context::none(), Some(&a), Some(&b)), Ordering::INVALID);
    assert_eq!(compare_tval(&ctx, None, Some(&b)), Ordering::INVALID);
}

// ============================================================================
// Non-recursive dup
// ============================================================================

#[test]
fn test_shallow_dup_is_independent() {
    let recorder = Recorder::new();
    let manager = recorder.manager();
    let ty = StructBuilder::new("Record")
        .typed_field("count", scalar(ScalarKind::U16))
        .typed_field("ratio", scalar(ScalarKind::F32))
        .typed_field("data", builtin::bytes_type().clone())
        .with_tracker()
        .manager(manager.clone())
        .build();

    let mut seed = Object::new(&ty, vec![Value::U16(12), Value::F32(0.25), Value::Null])
        .expect("seed");
    seed.set_bytes("data", b"contents").expect("bytes");
    let seed = Value::Object(Box::new(seed));
    let mut src = ty
        .init(&mut TemplateCons::new().with_initials(&seed))
        .expect("init");
    assert_eq!(recorder.mallocs(), 1);

    let mut dest = ty.dup(&src, false).expect("dup");
    let (s, d) = (src.as_object().expect("src"), dest.as_object().expect("dest"));
    assert_eq!(u16::from_value(&d.fields()[0]), u16::from_value(&s.fields()[0]));
    assert_eq!(f32::from_value(&d.fields()[1]), Some(0.25));
    assert_eq!(d.bytes("data"), s.bytes("data"));
    assert_eq!(d.tracker().map(MemoryTracker::count), Some(0));
    assert_eq!(
        d.tracker().and_then(MemoryTracker::manager),
        Some(&manager)
    );

    ty.free(&mut dest);
    assert!(dest.is_null());
    assert!(recorder.frees().is_empty());
    assert_eq!(
        src.as_object().and_then(|o| o.bytes("data")).as_deref(),
        Some(&b"contents"[..])
    );

    ty.free(&mut src);
    assert_eq!(recorder.frees().len(), 1);
}

#[test]
fn test_manager_precedence() {
    let type_level = Recorder::new();
    let cons_level = Recorder::new();
    let ty = StructBuilder::new("Owned")
        .typed_field("data", builtin::bytes_type().clone())
        .with_tracker()
        .manager(type_level.manager())
        .build();

    let mut seed = Object::new(&ty, vec![Value::Null]).expect("seed");
    seed.set_bytes("data", b"x").expect("bytes");
    let seed = Value::Object(Box::new(seed));

    let mut a = ty
        .init(&mut TemplateCons::new().with_initials(&seed))
        .expect("init");
    let mut b = ty
        .init(
            &mut TemplateCons::new()
                .with_initials(&seed)
                .with_manager(cons_level.manager()),
        )
        .expect("init");
    assert_eq!(type_level.mallocs(), 1);
    assert_eq!(cons_level.mallocs(), 1);

    ty.free(&mut a);
    ty.free(&mut b);
    assert_eq!(type_level.frees().len(), 1);
    assert_eq!(cons_level.frees().len(), 1);
}
