// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builtin type descriptors, created once per process.

use super::{Identity, ScalarKind, TemplateCons, TypeDescriptor, TypeKind, TypeRef, Value};
use std::sync::OnceLock;

struct Catalogue {
    scalars: Vec<TypeRef>,
    bytes: TypeRef,
    object_ref: TypeRef,
    function_ref: TypeRef,
    ty: TypeRef,
    template_cons: TypeRef,
}

static CATALOGUE: OnceLock<Catalogue> = OnceLock::new();

fn catalogue() -> &'static Catalogue {
    CATALOGUE.get_or_init(|| {
        log::debug!("[builtin] creating builtin type descriptors");
        Catalogue {
            scalars: ScalarKind::ALL
                .iter()
                .map(|&kind| TypeDescriptor::scalar(kind).into_ref())
                .collect(),
            bytes: TypeDescriptor::new("bytes", TypeKind::Bytes)
                .with_info("variable-width byte buffer")
                .into_ref(),
            object_ref: TypeDescriptor::new("object_ref", TypeKind::Identity { function: false })
                .with_info("object identity")
                .with_default(Value::ObjectRef(Identity::NULL))
                .into_ref(),
            function_ref: TypeDescriptor::new("function_ref", TypeKind::Identity { function: true })
                .with_info("function identity")
                .with_default(Value::FunctionRef(Identity::NULL))
                .into_ref(),
            ty: TypeDescriptor::new("type", TypeKind::Type)
                .with_info("type of type descriptors")
                .into_ref(),
            template_cons: TypeDescriptor::new(
                "template_cons",
                TypeKind::Opaque {
                    size: std::mem::size_of::<TemplateCons<'static>>(),
                },
            )
            .with_info("generic template constructor")
            .into_ref(),
        }
    })
}

/// Descriptor of a machine scalar.
pub fn scalar_type(kind: ScalarKind) -> &'static TypeRef {
    &catalogue().scalars[kind.index()]
}

/// Variable-width byte buffers.
pub fn bytes_type() -> &'static TypeRef {
    &catalogue().bytes
}

pub fn object_ref_type() -> &'static TypeRef {
    &catalogue().object_ref
}

pub fn function_ref_type() -> &'static TypeRef {
    &catalogue().function_ref
}

/// The type of type descriptors; `Value::Type` values carry this tag.
pub fn type_type() -> &'static TypeRef {
    &catalogue().ty
}

/// Default constructor type returned by `cons_type`.
pub fn template_cons_type() -> &'static TypeRef {
    &catalogue().template_cons
}

/// Every builtin descriptor, scalars first.
pub fn builtin_types() -> impl Iterator<Item = &'static TypeRef> {
    let c = catalogue();
    c.scalars.iter().chain([
        &c.bytes,
        &c.object_ref,
        &c.function_ref,
        &c.ty,
        &c.template_cons,
    ])
}
