// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for struct type descriptors.

use super::{
    FieldDescriptor, MemoryTracker, Object, StructDescriptor, TypeBehavior, TypeDescriptor,
    TypeKind, TypeRef, Value,
};
use crate::memory::MemoryManager;
use std::any::Any;
use std::sync::Arc;

/// Builder for struct types.
pub struct StructBuilder {
    name: String,
    info: Option<String>,
    parity: Option<String>,
    fields: Vec<FieldDescriptor>,
    base: Option<TypeRef>,
    tracked: bool,
    manager: Option<MemoryManager>,
    cons_type: Option<TypeRef>,
    behavior: Option<Arc<dyn TypeBehavior>>,
    user: Option<Arc<dyn Any + Send + Sync>>,
    default_fields: Option<Vec<Value>>,
}

impl StructBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            info: None,
            parity: None,
            fields: Vec::new(),
            base: None,
            tracked: false,
            manager: None,
            cons_type: None,
            behavior: None,
            user: None,
            default_fields: None,
        }
    }

    /// Add an untyped field of `size` bytes.
    pub fn field(mut self, name: impl Into<String>, size: usize) -> Self {
        self.fields.push(FieldDescriptor::untyped(name, size));
        self
    }

    /// Add a field with a type descriptor.
    pub fn typed_field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(FieldDescriptor::typed(name, ty));
        self
    }

    /// Add a field duplicated through its own type's `dup`.
    pub fn recursive_field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(FieldDescriptor::typed(name, ty).recursive());
        self
    }

    /// Add a typed field with a custom default predicate.
    pub fn field_with_default_check<F>(
        mut self,
        name: impl Into<String>,
        ty: TypeRef,
        check: F,
    ) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.fields
            .push(FieldDescriptor::typed(name, ty).with_default_check(check));
        self
    }

    /// Add a prepared field descriptor.
    pub fn push(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Inherit every field of `base` (appended after this type's fields).
    pub fn extends(mut self, base: TypeRef) -> Self {
        if base.is_struct().is_none() {
            log::warn!(
                "[builder] {} extends non-struct {}, only the subtype relation is kept",
                self.name,
                base.name()
            );
        }
        self.base = Some(base);
        self
    }

    /// Embed a memory tracker in every instance.
    pub fn with_tracker(mut self) -> Self {
        self.tracked = true;
        self
    }

    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn parity(mut self, parity: impl Into<String>) -> Self {
        self.parity = Some(parity.into());
        self
    }

    /// Default memory manager for instances.
    pub fn manager(mut self, manager: MemoryManager) -> Self {
        self.manager = Some(manager);
        self
    }

    pub fn cons_type(mut self, cons_type: TypeRef) -> Self {
        self.cons_type = Some(cons_type);
        self
    }

    pub fn behavior(mut self, behavior: impl TypeBehavior + 'static) -> Self {
        self.behavior = Some(Arc::new(behavior));
        self
    }

    pub fn user<T: Any + Send + Sync>(mut self, user: T) -> Self {
        self.user = Some(Arc::new(user));
        self
    }

    /// Field values of the canonical default instance, one per field
    /// (base fields included).
    pub fn default_instance(mut self, fields: Vec<Value>) -> Self {
        self.default_fields = Some(fields);
        self
    }

    /// Build the type.
    ///
    /// # Panics
    ///
    /// Panics if a default instance was given with the wrong number of
    /// field values.
    pub fn build(self) -> TypeRef {
        let desc = StructDescriptor::new(self.fields, self.base, self.tracked);
        let tracked = desc.is_tracked();
        let field_count = desc.len();

        let mut ty = TypeDescriptor::new(self.name, TypeKind::Struct(desc))
            .with_shared_behavior(self.behavior)
            .with_shared_user(self.user);
        if let Some(info) = self.info {
            ty = ty.with_info(info);
        }
        if let Some(parity) = self.parity {
            ty = ty.with_parity(parity);
        }
        if let Some(manager) = self.manager {
            ty = ty.with_manager(manager);
        }
        if let Some(cons_type) = self.cons_type {
            ty = ty.with_cons_type(cons_type);
        }
        let ty = ty.into_ref();

        if let Some(fields) = self.default_fields {
            assert_eq!(
                fields.len(),
                field_count,
                "default instance of {} has {} values for {} fields",
                ty.name(),
                fields.len(),
                field_count
            );
            let tracker = tracked.then(MemoryTracker::default);
            ty.set_default(Value::Object(Box::new(Object::from_parts(
                ty.clone(),
                fields,
                tracker,
            ))));
        }
        ty
    }
}
