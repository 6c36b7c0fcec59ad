// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Comparison dispatched through type descriptors.

use super::{Context, Ordering};
use crate::types::{builtin, Object, TypeRef, Value};
use std::sync::Arc;

/// Runtime type tag carried by a value.
///
/// Objects carry their descriptor and type references belong to the
/// type-of-types. Scalars, buffers and identities are erased: `None`.
pub fn runtime_type(value: &Value) -> Option<TypeRef> {
    match value {
        Value::Object(obj) => Some(obj.ty().clone()),
        Value::Type(_) => Some(builtin::type_type().clone()),
        _ => None,
    }
}

/// Compare two typed values.
///
/// Each operand's type is its runtime tag, else the type carried by the
/// context. A context type also constrains tagged operands: each must be
/// that type or a subtype of it, else `MISMATCH`. Operands of one runtime
/// type compare through it; mixed operands through the context type.
/// `INVALID` when a type or an operand is absent.
pub fn compare_tval(ctx: &Context, check: Option<&Value>, baseline: Option<&Value>) -> Ordering {
    let (Some(a), Some(b)) = (check, baseline) else {
        return Ordering::INVALID;
    };

    let expected = ctx.type_ref();
    if let Some(expected) = expected {
        let outside = |v: &Value| runtime_type(v).is_some() && !expected.accepts(v);
        if outside(a) || outside(b) {
            return Ordering::MISMATCH;
        }
    }

    let ta = runtime_type(a).or_else(|| expected.cloned());
    let tb = runtime_type(b).or_else(|| expected.cloned());
    match (ta, tb, expected) {
        (Some(ta), Some(tb), _) if Arc::ptr_eq(&ta, &tb) => compare_with_type(&ta, a, b),
        (Some(_), Some(_), Some(expected)) => compare_with_type(expected, a, b),
        (Some(_), Some(_), None) => Ordering::MISMATCH,
        _ => Ordering::INVALID,
    }
}

/// Compare two values declared as `ty`.
///
/// Uses the type's own comparer when it has one, else the generic
/// field-wise comparison.
pub fn compare_with_type(ty: &TypeRef, check: &Value, baseline: &Value) -> Ordering {
    if !ty.accepts(check) || !ty.accepts(baseline) {
        return Ordering::MISMATCH;
    }
    match ty.cmp() {
        Some(cmp) => cmp.cmp(check, baseline),
        None => generic_compare(check, baseline),
    }
}

/// Structural comparison without type-specific comparers at the top level.
///
/// Scalars compare by value (different variants are `MISMATCH`), buffers
/// by content, objects field by field in declaration order, identities by
/// address and types by name. `Null` sorts before everything else.
pub fn generic_compare(check: &Value, baseline: &Value) -> Ordering {
    use Value::*;

    match (check, baseline) {
        (Null, Null) => Ordering::EQUAL,
        (Null, _) => Ordering::LESS,
        (_, Null) => Ordering::GREATER,

        (Bool(a), Bool(b)) => a.cmp(b).into(),
        (Char(a), Char(b)) => a.cmp(b).into(),
        (I8(a), I8(b)) => a.cmp(b).into(),
        (I16(a), I16(b)) => a.cmp(b).into(),
        (I32(a), I32(b)) => a.cmp(b).into(),
        (I64(a), I64(b)) => a.cmp(b).into(),
        (Isize(a), Isize(b)) => a.cmp(b).into(),
        (U8(a), U8(b)) => a.cmp(b).into(),
        (U16(a), U16(b)) => a.cmp(b).into(),
        (U32(a), U32(b)) => a.cmp(b).into(),
        (U64(a), U64(b)) => a.cmp(b).into(),
        (Usize(a), Usize(b)) => a.cmp(b).into(),
        (F32(a), F32(b)) => Ordering::from_partial(a.partial_cmp(b)),
        (F64(a), F64(b)) => Ordering::from_partial(a.partial_cmp(b)),

        (Buffer(a), Buffer(b)) => a
            .with(|xa| b.with(|xb| xa.cmp(xb)))
            .flatten()
            .map_or(Ordering::INVALID, Ordering::from),

        (Object(a), Object(b)) => compare_objects(a, b),

        (ObjectRef(a), ObjectRef(b)) | (FunctionRef(a), FunctionRef(b)) => a.cmp(b).into(),

        (Type(a), Type(b)) if Arc::ptr_eq(a, b) => Ordering::EQUAL,
        (Type(a), Type(b)) => a.name().cmp(b.name()).into(),

        _ => Ordering::MISMATCH,
    }
}

fn compare_objects(a: &Object, b: &Object) -> Ordering {
    if !Arc::ptr_eq(a.ty(), b.ty()) {
        return Ordering::MISMATCH;
    }
    let Some(desc) = a.ty().is_struct() else {
        return Ordering::INVALID;
    };

    for (i, (fa, fb)) in a.fields().iter().zip(b.fields()).enumerate() {
        let field_cmp = desc
            .field(i)
            .and_then(|f| f.ty.as_ref())
            .and_then(|t| t.cmp());
        let r = match (field_cmp, fa) {
            (Some(cmp), _) => cmp.cmp(fa, fb),
            (None, Value::Object(inner)) => compare_with_type(inner.ty(), fa, fb),
            (None, _) => generic_compare(fa, fb),
        };
        if r != Ordering::EQUAL {
            return r;
        }
    }
    a.fields().len().cmp(&b.fields().len()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::Comparer;
    use crate::types::{builtin, ScalarKind, StructBuilder};

    fn point() -> TypeRef {
        StructBuilder::new("Point")
            .typed_field("x", builtin::scalar_type(ScalarKind::I32).clone())
            .typed_field("y", builtin::scalar_type(ScalarKind::I32).clone())
            .build()
    }

    fn make(ty: &TypeRef, x: i32, y: i32) -> Value {
        Value::Object(Box::new(
            Object::new(ty, vec![Value::I32(x), Value::I32(y)]).expect("object"),
        ))
    }

    #[test]
    fn test_scalars_need_a_type() {
        let untyped = Comparer::typed(None);
        assert_eq!(untyped.cmp(&Value::I32(1), &Value::I32(2)), Ordering::INVALID);

        let typed = Comparer::typed(Some(builtin::scalar_type(ScalarKind::I32).clone()));
        assert_eq!(typed.cmp(&Value::I32(1), &Value::I32(2)), Ordering::LESS);
        assert_eq!(typed.cmp(&Value::I32(1), &Value::U8(2)), Ordering::MISMATCH);
    }

    #[test]
    fn test_objects_compare_fieldwise() {
        let ty = point();
        let cmp = Comparer::typed(None);
        assert_eq!(cmp.cmp(&make(&ty, 1, 9), &make(&ty, 2, 0)), Ordering::LESS);
        assert_eq!(cmp.cmp(&make(&ty, 1, 2), &make(&ty, 1, 2)), Ordering::EQUAL);
        assert_eq!(cmp.cmp(&make(&ty, 1, 3), &make(&ty, 1, 2)), Ordering::GREATER);
    }

    #[test]
    fn test_different_runtime_types_mismatch() {
        let a = point();
        let b = point();
        let cmp = Comparer::typed(None);
        assert_eq!(cmp.cmp(&make(&a, 0, 0), &make(&b, 0, 0)), Ordering::MISMATCH);
        assert_eq!(cmp.compare(None, Some(&make(&a, 0, 0))), Ordering::INVALID);
    }

    #[test]
    fn test_context_type_rejects_foreign_objects() {
        let point_ty = point();
        let velocity = StructBuilder::new("Velocity")
            .typed_field("x", builtin::scalar_type(ScalarKind::I32).clone())
            .typed_field("y", builtin::scalar_type(ScalarKind::I32).clone())
            .build();
        let cmp = Comparer::typed(Some(point_ty.clone()));

        let (a, b) = (make(&velocity, 0, 0), make(&velocity, 1, 0));
        assert_eq!(cmp.cmp(&a, &b), Ordering::MISMATCH);
        assert_eq!(cmp.cmp(&make(&point_ty, 0, 0), &b), Ordering::MISMATCH);
        assert_eq!(
            cmp.cmp(&make(&point_ty, 0, 0), &make(&point_ty, 1, 0)),
            Ordering::LESS
        );
    }

    #[test]
    fn test_context_type_admits_subtypes() {
        let point_ty = point();
        let point3 = StructBuilder::new("Point3")
            .extends(point_ty.clone())
            .typed_field("z", builtin::scalar_type(ScalarKind::I32).clone())
            .build();
        let make3 = |z: i32| {
            Value::Object(Box::new(
                Object::new(&point3, vec![Value::I32(z), Value::I32(0), Value::I32(0)])
                    .expect("object"),
            ))
        };

        let cmp = Comparer::typed(Some(point_ty));
        assert_eq!(cmp.cmp(&make3(1), &make3(2)), Ordering::LESS);
        assert_eq!(cmp.cmp(&make3(2), &make3(2)), Ordering::EQUAL);
    }

    #[test]
    fn test_null_sorts_first() {
        assert_eq!(generic_compare(&Value::Null, &Value::I8(0)), Ordering::LESS);
        assert_eq!(generic_compare(&Value::I8(0), &Value::Null), Ordering::GREATER);
        assert_eq!(generic_compare(&Value::Null, &Value::Null), Ordering::EQUAL);
    }

    #[test]
    fn test_types_compare_by_name() {
        let a = Value::Type(builtin::scalar_type(ScalarKind::F32).clone());
        let b = Value::Type(builtin::scalar_type(ScalarKind::U8).clone());
        let cmp = Comparer::typed(None);
        assert_eq!(cmp.cmp(&a, &b), Ordering::LESS);
        assert_eq!(cmp.cmp(&a, &a), Ordering::EQUAL);
    }
}
