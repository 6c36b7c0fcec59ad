// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Template constructors and the generic struct init/free/dup algorithms.
//!
//! A field is taken from the constructor's initials iff `override_at`
//! says so or the initial value is not the field's default. Everything
//! else gets the field type's own default.

use super::{FieldDescriptor, MemoryTracker, Object, TypeRef, Value};
use crate::config::{self, DEFAULT_MESSAGE_CAPACITY};
use crate::error::{ConsError, Result};
use crate::memory::MemoryManager;
use std::fmt;

/// Bounded text sink for construction failure messages.
///
/// Writes never grow the text past `capacity` bytes; truncation happens
/// on a char boundary.
#[derive(Debug, Clone)]
pub struct MessageBuf {
    text: String,
    capacity: usize,
}

impl MessageBuf {
    pub fn new(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            capacity,
        }
    }

    /// Replace the current message.
    pub fn set(&mut self, message: &str) {
        self.text.clear();
        let _ = fmt::Write::write_str(self, message);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

impl Default for MessageBuf {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_CAPACITY)
    }
}

impl fmt::Write for MessageBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.capacity.saturating_sub(self.text.len());
        let mut end = s.len().min(room);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.text.push_str(&s[..end]);
        Ok(())
    }
}

/// Generic constructor argument consumed by `init`.
#[derive(Default)]
pub struct TemplateCons<'a> {
    manager: Option<MemoryManager>,
    initials: Option<&'a Value>,
    override_at: Option<&'a dyn Fn(usize) -> bool>,
    message: Option<&'a mut MessageBuf>,
}

impl<'a> TemplateCons<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate through `manager` instead of the type's default.
    pub fn with_manager(mut self, manager: MemoryManager) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Same-typed value supplying non-default field values.
    pub fn with_initials(mut self, initials: &'a Value) -> Self {
        self.initials = Some(initials);
        self
    }

    /// Per-field-index predicate forcing use of the initials value.
    pub fn with_override(mut self, override_at: &'a dyn Fn(usize) -> bool) -> Self {
        self.override_at = Some(override_at);
        self
    }

    /// Receive a description of a construction failure.
    pub fn with_message(mut self, message: &'a mut MessageBuf) -> Self {
        self.message = Some(message);
        self
    }

    pub fn manager(&self) -> Option<&MemoryManager> {
        self.manager.as_ref()
    }

    /// Initials, with an explicit `Null` treated as absent.
    pub fn initials(&self) -> Option<&'a Value> {
        self.initials.filter(|v| !v.is_null())
    }

    pub fn overrides(&self, index: usize) -> bool {
        self.override_at.is_some_and(|f| f(index))
    }

    /// Decide whether `field` is taken from `initial`.
    pub fn takes_initial(&self, field: &FieldDescriptor, initial: &Value) -> bool {
        self.overrides(field.index) || !field.is_default_value(initial)
    }

    pub(crate) fn report(&mut self, err: &ConsError) {
        if let Some(message) = self.message.as_deref_mut() {
            message.set(&err.to_string());
        }
    }
}

impl fmt::Debug for TemplateCons<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCons")
            .field("manager", &self.manager)
            .field("initials", &self.initials.map(Value::type_name))
            .field("override_at", &self.override_at.is_some())
            .field("message", &self.message.is_some())
            .finish()
    }
}

/// Manager used by a construction: constructor override, else the
/// type's manager, else the process default.
fn resolve_manager(ty: &TypeRef, cons: &TemplateCons<'_>) -> MemoryManager {
    cons.manager()
        .or_else(|| ty.manager())
        .unwrap_or_else(|| config::default_manager())
        .clone()
}

/// Generic struct construction.
///
/// A field not taken from the initials is copied from the type's default
/// instance when it has one, else built from the field's own type. The
/// embedded tracker is bound to the resolved manager and marked
/// heap-allocated last. On failure the partial object is freed first.
pub fn init_struct(ty: &TypeRef, cons: &mut TemplateCons<'_>) -> Result<Value> {
    let desc = ty
        .is_struct()
        .ok_or_else(|| ConsError::NotConstructible(ty.name().to_string()))?;
    let manager = resolve_manager(ty, cons);

    let initials = cons.initials().and_then(Value::as_object);
    let defaults = ty.has_default().and_then(Value::as_object);
    for src in initials.iter().chain(defaults.iter()) {
        if src.fields().len() != desc.len() {
            return Err(ConsError::FieldCountMismatch {
                expected: desc.len(),
                got: src.fields().len(),
            });
        }
    }

    let tracker = desc
        .is_tracked()
        .then(|| MemoryTracker::new(Some(manager.clone())));
    let mut obj = Object::from_parts(ty.clone(), Vec::with_capacity(desc.len()), tracker);

    for field in desc.fields() {
        let initial = initials
            .and_then(|src| src.field(field.index))
            .filter(|v| cons.takes_initial(field, v))
            .or_else(|| {
                defaults
                    .and_then(|src| src.field(field.index))
                    .filter(|v| !v.is_null())
            });
        let value = match initial {
            Some(v) => copy_initial(v, obj.tracker.as_mut(), &manager),
            None => default_field(field, &manager),
        };

        match value {
            Ok(v) => obj.fields.push(v),
            Err(err) => {
                log::debug!(
                    "[template] {}.{} failed, releasing {} tracked buffer(s)",
                    ty.name(),
                    field.name,
                    obj.tracker.as_ref().map_or(0, MemoryTracker::count)
                );
                let mut partial = Value::Object(Box::new(obj));
                free_struct(&mut partial);
                return Err(ConsError::Field {
                    index: field.index,
                    name: field.name.clone(),
                    source: Box::new(err),
                });
            }
        }
    }

    if let Some(tracker) = obj.tracker.as_mut() {
        tracker.set_heap_allocated(true);
    }
    Ok(Value::Object(Box::new(obj)))
}

fn copy_initial(
    value: &Value,
    tracker: Option<&mut MemoryTracker>,
    manager: &MemoryManager,
) -> Result<Value> {
    match (value, tracker) {
        (Value::Buffer(src), Some(tracker)) => {
            let bytes = src.to_vec().ok_or(ConsError::ReleasedBuffer)?;
            tracker
                .allocate_copy(&bytes)
                .map(Value::Buffer)
                .ok_or(ConsError::OutOfMemory {
                    requested: bytes.len(),
                })
        }
        (Value::Object(inner), _) => {
            let mut nested = TemplateCons::new()
                .with_manager(manager.clone())
                .with_initials(value);
            inner.ty().init(&mut nested)
        }
        (other, _) => Ok(other.shallow_copy()),
    }
}

fn default_field(field: &FieldDescriptor, manager: &MemoryManager) -> Result<Value> {
    let Some(ty) = &field.ty else {
        return Ok(Value::Null);
    };
    if ty.is_struct().is_some() {
        let mut nested = TemplateCons::new().with_manager(manager.clone());
        return ty.init(&mut nested);
    }
    Ok(ty
        .has_default()
        .map_or_else(|| ty.zero_value(), Value::shallow_copy))
}

/// Generic struct destruction.
///
/// Frees nested objects and `recurse` fields through their own types,
/// then releases the embedded tracker. A heap-allocated value becomes
/// `Null`. Without a tracker this only recurses into nested values.
pub fn free_struct(value: &mut Value) {
    let Value::Object(obj) = value else {
        return;
    };
    let ty = obj.ty.clone();
    let desc = ty.is_struct();

    for (i, field_value) in obj.fields.iter_mut().enumerate() {
        let field_ty = match &*field_value {
            Value::Object(inner) => Some(inner.ty.clone()),
            Value::Null => None,
            _ => desc
                .and_then(|d| d.field(i))
                .filter(|f| f.recurse)
                .and_then(|f| f.ty.clone()),
        };
        if let Some(field_ty) = field_ty {
            field_ty.free(field_value);
        }
    }

    let heap_allocated = obj.tracker.as_mut().is_some_and(MemoryTracker::release_all);
    if heap_allocated {
        *value = Value::Null;
    }
}

/// Generic struct duplication.
///
/// The copy gets a fresh tracker bound to the source's manager and is
/// marked heap-allocated. Without `rec` every field is a raw copy
/// (buffers alias the source's).
pub fn dup_struct(src: &Object, rec: bool) -> Result<Value> {
    let ty = src.ty.clone();
    let desc = ty
        .is_struct()
        .ok_or_else(|| ConsError::NotConstructible(ty.name().to_string()))?;
    if src.fields.len() != desc.len() {
        return Err(ConsError::FieldCountMismatch {
            expected: desc.len(),
            got: src.fields.len(),
        });
    }

    let tracker = src
        .tracker
        .as_ref()
        .map(|t| MemoryTracker::new(t.manager().cloned()));
    let mut out = Object::from_parts(ty.clone(), Vec::with_capacity(desc.len()), tracker);

    for (field, value) in desc.fields().iter().zip(&src.fields) {
        let copied = if rec && field.recurse {
            dup_field(field, value, out.tracker.as_mut())
        } else {
            Ok(value.shallow_copy())
        };

        match copied {
            Ok(v) => out.fields.push(v),
            Err(err) => {
                let mut partial = Value::Object(Box::new(out));
                free_struct(&mut partial);
                return Err(ConsError::Field {
                    index: field.index,
                    name: field.name.clone(),
                    source: Box::new(err),
                });
            }
        }
    }

    if let Some(tracker) = out.tracker.as_mut() {
        tracker.set_heap_allocated(true);
    }
    Ok(Value::Object(Box::new(out)))
}

fn dup_field(
    field: &FieldDescriptor,
    value: &Value,
    tracker: Option<&mut MemoryTracker>,
) -> Result<Value> {
    match (value, tracker) {
        (Value::Object(inner), _) => inner.ty().dup(value, true),
        (Value::Buffer(src), Some(tracker)) => {
            let bytes = src.to_vec().ok_or(ConsError::ReleasedBuffer)?;
            tracker
                .allocate_copy(&bytes)
                .map(Value::Buffer)
                .ok_or(ConsError::OutOfMemory {
                    requested: bytes.len(),
                })
        }
        (other, _) => match &field.ty {
            Some(ty) if !other.is_null() => ty.dup(other, true),
            _ => Ok(other.shallow_copy()),
        },
    }
}
