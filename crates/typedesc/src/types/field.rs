// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field and struct descriptors.

use super::{TypeRef, Value};
use std::fmt;
use std::sync::Arc;

/// Custom "is this the default?" predicate for a field.
pub type DefaultCheck = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// One struct field.
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Position in the full (base-inclusive) field list.
    pub index: usize,
    /// Size in bytes.
    pub size: usize,
    /// Declared type (`None` for untyped fields).
    pub ty: Option<TypeRef>,
    /// Duplicate through the field type's `dup` instead of a raw copy.
    pub recurse: bool,
    /// Custom default predicate; generic zero check when absent.
    pub is_default: Option<DefaultCheck>,
}

impl FieldDescriptor {
    /// Untyped field of `size` bytes.
    pub fn untyped(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            index: 0,
            size,
            ty: None,
            recurse: false,
            is_default: None,
        }
    }

    pub fn typed(name: impl Into<String>, ty: TypeRef) -> Self {
        let size = ty.size(None);
        Self {
            size,
            ty: Some(ty),
            ..Self::untyped(name, 0)
        }
    }

    pub fn recursive(mut self) -> Self {
        self.recurse = true;
        self
    }

    pub fn with_default_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.is_default = Some(Arc::new(check));
        self
    }

    /// True when `value` counts as this field's default.
    pub fn is_default_value(&self, value: &Value) -> bool {
        match &self.is_default {
            Some(check) => check(value),
            None => value.is_zero(),
        }
    }

    pub(crate) fn reindexed(&self, index: usize) -> Self {
        Self {
            index,
            ..self.clone()
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("size", &self.size)
            .field("ty", &self.ty.as_ref().map(|t| t.name().to_string()))
            .field("recurse", &self.recurse)
            .field("custom_default", &self.is_default.is_some())
            .finish()
    }
}

/// Layout of a struct type.
///
/// `fields` holds the type's own fields followed by every field of its
/// base type, so generic code never chases the base at runtime.
#[derive(Debug, Clone)]
pub struct StructDescriptor {
    fields: Vec<FieldDescriptor>,
    own: usize,
    base: Option<TypeRef>,
    tracked: bool,
}

impl StructDescriptor {
    /// Concatenate `own` fields with the base's field list.
    pub fn new(own: Vec<FieldDescriptor>, base: Option<TypeRef>, tracked: bool) -> Self {
        let own_len = own.len();
        let inherited = base
            .as_ref()
            .and_then(|b| b.is_struct())
            .map(|d| d.fields.as_slice())
            .unwrap_or_default();
        let tracked = tracked
            || base
                .as_ref()
                .and_then(|b| b.is_struct())
                .is_some_and(|d| d.tracked);

        let fields = own
            .iter()
            .chain(inherited)
            .enumerate()
            .map(|(i, f)| f.reindexed(i))
            .collect();
        Self {
            fields,
            own: own_len,
            base,
            tracked,
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Fields declared by this type itself (excluding the base's).
    pub fn own_fields(&self) -> &[FieldDescriptor] {
        &self.fields[..self.own]
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    /// True when instances embed a memory tracker.
    pub fn is_tracked(&self) -> bool {
        self.tracked
    }

    /// Sum of field sizes.
    pub fn size(&self) -> usize {
        self.fields.iter().map(|f| f.size).sum()
    }
}
