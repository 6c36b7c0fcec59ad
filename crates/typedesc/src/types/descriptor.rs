// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: the reflective record every typed value points to.

use super::{builtin, template, MemoryTracker, Object, StructDescriptor, TemplateCons, Value};
use crate::config::POINTER_SIZE;
use crate::error::{ConsError, Result};
use crate::memory::MemoryManager;
use crate::ordering::Comparer;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Shared handle to a type descriptor. Type identity is pointer identity.
pub type TypeRef = Arc<TypeDescriptor>;

/// True if `a` and `b` are the same descriptor.
pub fn same_type(a: &TypeRef, b: &TypeRef) -> bool {
    Arc::ptr_eq(a, b)
}

/// Machine scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 14] = [
        Self::Bool,
        Self::Char,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::Isize,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::Usize,
        Self::F32,
        Self::F64,
    ];

    /// Width in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::Char | Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
            Self::Isize | Self::Usize => POINTER_SIZE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    pub fn info(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Char => "unicode scalar value",
            Self::I8 => "signed 8-bit integer",
            Self::I16 => "signed 16-bit integer",
            Self::I32 => "signed 32-bit integer",
            Self::I64 => "signed 64-bit integer",
            Self::Isize => "pointer difference",
            Self::U8 => "unsigned 8-bit integer",
            Self::U16 => "unsigned 16-bit integer",
            Self::U32 => "unsigned 32-bit integer",
            Self::U64 => "unsigned 64-bit integer",
            Self::Usize => "object size",
            Self::F32 => "single precision float",
            Self::F64 => "double precision float",
        }
    }

    /// The all-zero value of this kind.
    pub fn zero(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Char => Value::Char('\0'),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::Isize => Value::Isize(0),
            Self::U8 => Value::U8(0),
            Self::U16 => Value::U16(0),
            Self::U32 => Value::U32(0),
            Self::U64 => Value::U64(0),
            Self::Usize => Value::Usize(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        value.scalar_kind() == Some(self)
    }

    /// Position in [`ScalarKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Shape of the values a descriptor describes.
#[derive(Debug)]
pub enum TypeKind {
    /// Fixed-width machine scalar; values carry no runtime tag.
    Scalar(ScalarKind),
    /// Introspectable struct; values are tagged [`Object`]s.
    Struct(StructDescriptor),
    /// Variable-width byte buffer.
    Bytes,
    /// Identity-only reference to an object or a function.
    Identity { function: bool },
    /// The type of type descriptors.
    Type,
    /// Not introspectable, not generically constructible.
    Opaque { size: usize },
}

impl TypeKind {
    fn parity(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Struct(_) => "struct",
            Self::Bytes => "bytes",
            Self::Identity { function: false } => "object_ref",
            Self::Identity { function: true } => "function_ref",
            Self::Type => "type",
            Self::Opaque { .. } => "opaque",
        }
    }
}

/// Optional per-type operations.
///
/// Every method defaults to "capability absent" (`None` / `false`); the
/// descriptor then applies its generic algorithm.
pub trait TypeBehavior: Send + Sync {
    /// Size of `value` (or of the type when `value` is absent).
    fn size(&self, _ty: &TypeRef, _value: Option<&Value>) -> Option<usize> {
        None
    }

    /// Witness that `ty` is a subtype of `other`, consulted before the
    /// base chain and the reflexive check.
    fn is_subtype(&self, _ty: &TypeRef, _other: &TypeRef) -> Option<TypeRef> {
        None
    }

    fn is_supertype(&self, _ty: &TypeRef, _other: &TypeRef) -> Option<TypeRef> {
        None
    }

    /// Construct a value. Initials were already checked against `ty`.
    fn init(&self, _ty: &TypeRef, _cons: &mut TemplateCons<'_>) -> Option<Result<Value>> {
        None
    }

    /// Release `value`. Returns `true` when handled.
    fn free(&self, _ty: &TypeRef, _value: &mut Value) -> bool {
        false
    }

    fn dup(&self, _ty: &TypeRef, _src: &Value, _rec: bool) -> Option<Result<Value>> {
        None
    }

    /// Type-specific comparer.
    fn cmp(&self, _ty: &TypeRef) -> Option<Comparer<Value>> {
        None
    }
}

/// Runtime type descriptor.
pub struct TypeDescriptor {
    name: String,
    info: Option<String>,
    parity: String,
    kind: TypeKind,
    cons_type: Option<TypeRef>,
    default: OnceLock<Value>,
    manager: Option<MemoryManager>,
    behavior: Option<Arc<dyn TypeBehavior>>,
    user: Option<Arc<dyn Any + Send + Sync>>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            info: None,
            parity: kind.parity().to_string(),
            kind,
            cons_type: None,
            default: OnceLock::new(),
            manager: None,
            behavior: None,
            user: None,
        }
    }

    /// Descriptor for a machine scalar, with a zero default.
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::new(kind.name(), TypeKind::Scalar(kind))
            .with_info(kind.info())
            .with_default(kind.zero())
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn with_parity(mut self, parity: impl Into<String>) -> Self {
        self.parity = parity.into();
        self
    }

    pub fn with_cons_type(mut self, cons_type: TypeRef) -> Self {
        self.cons_type = Some(cons_type);
        self
    }

    pub fn with_default(self, value: Value) -> Self {
        let _ = self.default.set(value);
        self
    }

    pub fn with_manager(mut self, manager: MemoryManager) -> Self {
        self.manager = Some(manager);
        self
    }

    pub fn with_behavior(mut self, behavior: impl TypeBehavior + 'static) -> Self {
        self.behavior = Some(Arc::new(behavior));
        self
    }

    pub(crate) fn with_shared_behavior(mut self, behavior: Option<Arc<dyn TypeBehavior>>) -> Self {
        self.behavior = behavior;
        self
    }

    /// Attach extension data. Read-only once the type is built; share
    /// interior-mutable state (e.g. an atomic) when it must change.
    pub fn with_user<T: Any + Send + Sync>(mut self, user: T) -> Self {
        self.user = Some(Arc::new(user));
        self
    }

    pub(crate) fn with_shared_user(mut self, user: Option<Arc<dyn Any + Send + Sync>>) -> Self {
        self.user = user;
        self
    }

    pub fn into_ref(self) -> TypeRef {
        Arc::new(self)
    }

    // ------------------------------------------------------------------
    // Plain accessors
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    /// Display/debug tag.
    pub fn parity(&self) -> &str {
        &self.parity
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Default memory manager of values of this type.
    pub fn manager(&self) -> Option<&MemoryManager> {
        self.manager.as_ref()
    }

    pub fn behavior(&self) -> Option<&Arc<dyn TypeBehavior>> {
        self.behavior.as_ref()
    }

    /// Typed access to the user extension slot.
    pub fn user<T: Any>(&self) -> Option<&T> {
        self.user.as_deref()?.downcast_ref::<T>()
    }

    /// Struct layout, `None` for opaque/non-introspectable types.
    pub fn is_struct(&self) -> Option<&StructDescriptor> {
        match &self.kind {
            TypeKind::Struct(desc) => Some(desc),
            _ => None,
        }
    }

    /// Canonical default instance.
    pub fn has_default(&self) -> Option<&Value> {
        self.default.get()
    }

    /// Install the default instance once the descriptor is shared.
    ///
    /// Returns `false` if a default was already set.
    pub fn set_default(&self, value: Value) -> bool {
        self.default.set(value).is_ok()
    }

    /// Type of the values accepted as constructor arguments.
    pub fn cons_type(&self) -> TypeRef {
        self.cons_type
            .clone()
            .unwrap_or_else(|| builtin::template_cons_type().clone())
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// `Some(self)` when values carry their type at runtime.
    pub fn typed(self: &Arc<Self>) -> Option<TypeRef> {
        match self.kind {
            TypeKind::Struct(_) | TypeKind::Type => Some(self.clone()),
            _ => None,
        }
    }

    /// Size in bytes. Variable-width types report 0 without a value.
    pub fn size(self: &Arc<Self>, value: Option<&Value>) -> usize {
        if let Some(size) = self.behavior.as_ref().and_then(|b| b.size(self, value)) {
            return size;
        }
        match &self.kind {
            TypeKind::Scalar(kind) => kind.size(),
            TypeKind::Struct(desc) => desc.size(),
            TypeKind::Bytes => value
                .and_then(Value::as_buffer)
                .and_then(|b| b.len())
                .unwrap_or(0),
            TypeKind::Identity { .. } | TypeKind::Type => POINTER_SIZE,
            TypeKind::Opaque { size } => *size,
        }
    }

    /// Witness that `self` is a subtype of `other`.
    ///
    /// Behaviour hook first, then reflexive identity, then the struct base.
    pub fn is_subtype(self: &Arc<Self>, other: &TypeRef) -> Option<TypeRef> {
        if let Some(witness) = self.behavior.as_ref().and_then(|b| b.is_subtype(self, other)) {
            return Some(witness);
        }
        if Arc::ptr_eq(self, other) {
            return Some(other.clone());
        }
        self.is_struct()?.base()?.is_subtype(other)
    }

    /// Witness that `self` is a supertype of `other`.
    pub fn is_supertype(self: &Arc<Self>, other: &TypeRef) -> Option<TypeRef> {
        if let Some(witness) = self
            .behavior
            .as_ref()
            .and_then(|b| b.is_supertype(self, other))
        {
            return Some(witness);
        }
        other.is_subtype(self).map(|_| self.clone())
    }

    /// Type-specific comparer, if the type defines one.
    pub fn cmp(self: &Arc<Self>) -> Option<Comparer<Value>> {
        self.behavior.as_ref().and_then(|b| b.cmp(self))
    }

    /// Comparer for values of this type: the specific one, else the
    /// type-dispatched generic comparison.
    pub fn comparer(self: &Arc<Self>) -> Comparer<Value> {
        self.cmp()
            .unwrap_or_else(|| Comparer::typed(Some(self.clone())))
    }

    /// True if `value` may be stored where this type is declared.
    ///
    /// Struct types accept objects of any subtype; `Null` stands for an
    /// absent reference and is accepted by every non-scalar type.
    pub fn accepts(self: &Arc<Self>, value: &Value) -> bool {
        match (&self.kind, value) {
            (TypeKind::Scalar(_), Value::Null) => false,
            (_, Value::Null) => true,
            (TypeKind::Scalar(kind), v) => kind.matches(v),
            (TypeKind::Struct(_), Value::Object(obj)) => obj.ty.is_subtype(self).is_some(),
            (TypeKind::Bytes, Value::Buffer(_)) => true,
            (TypeKind::Identity { function: false }, Value::ObjectRef(_)) => true,
            (TypeKind::Identity { function: true }, Value::FunctionRef(_)) => true,
            (TypeKind::Type, Value::Type(_)) => true,
            (TypeKind::Opaque { .. }, _) => true,
            _ => false,
        }
    }

    /// The all-zero value of this type.
    pub fn zero_value(self: &Arc<Self>) -> Value {
        match &self.kind {
            TypeKind::Scalar(kind) => kind.zero(),
            TypeKind::Struct(desc) => {
                let fields = desc
                    .fields()
                    .iter()
                    .map(|f| f.ty.as_ref().map_or(Value::Null, |t| t.zero_value()))
                    .collect();
                let tracker = desc.is_tracked().then(MemoryTracker::default);
                Value::Object(Box::new(Object::from_parts(self.clone(), fields, tracker)))
            }
            TypeKind::Identity { function: false } => Value::ObjectRef(super::Identity::NULL),
            TypeKind::Identity { function: true } => Value::FunctionRef(super::Identity::NULL),
            TypeKind::Bytes | TypeKind::Type | TypeKind::Opaque { .. } => Value::Null,
        }
    }

    /// Construct a new value (the "target absent" case).
    ///
    /// Struct values come back with their tracker marked heap-allocated.
    /// On failure every buffer tracked so far has been released and the
    /// constructor's message buffer (if any) holds a description.
    pub fn init(self: &Arc<Self>, cons: &mut TemplateCons<'_>) -> Result<Value> {
        let result = self.construct(cons);
        if let Err(err) = &result {
            log::debug!("[types] init of {} failed: {}", self.name, err);
            cons.report(err);
        }
        result
    }

    /// Construct into an existing target (the "target present" case).
    ///
    /// # Panics
    ///
    /// Panics if `target` is not `Value::Null`: initialising a value twice
    /// is a precondition violation.
    pub fn init_in_place(
        self: &Arc<Self>,
        target: &mut Value,
        cons: &mut TemplateCons<'_>,
    ) -> Result<()> {
        assert!(
            target.is_null(),
            "init_in_place: target already holds a {} value",
            target.type_name()
        );
        let mut value = self.init(cons)?;
        clear_heap_flag(&mut value);
        *target = value;
        Ok(())
    }

    fn construct(self: &Arc<Self>, cons: &mut TemplateCons<'_>) -> Result<Value> {
        if let Some(initials) = cons.initials() {
            if !self.is_exact(initials) {
                return Err(ConsError::InitialsTypeMismatch {
                    expected: self.name.clone(),
                    got: initials.type_name().to_string(),
                });
            }
        }

        if let Some(result) = self.behavior.as_ref().and_then(|b| b.init(self, cons)) {
            return result;
        }

        match &self.kind {
            TypeKind::Struct(_) => template::init_struct(self, cons),
            TypeKind::Opaque { .. } => Err(ConsError::NotConstructible(self.name.clone())),
            _ => Ok(cons
                .initials()
                .or_else(|| self.has_default())
                .map_or_else(|| self.zero_value(), Value::shallow_copy)),
        }
    }

    fn is_exact(self: &Arc<Self>, value: &Value) -> bool {
        match value {
            Value::Object(obj) => Arc::ptr_eq(&obj.ty, self),
            other => self.accepts(other),
        }
    }

    /// Release everything `init` or `dup` acquired for `value`.
    ///
    /// Objects dispatch to their own runtime type. Heap-allocated values
    /// are reset to `Null`; calling again is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if `value` is not a value of this type.
    pub fn free(self: &Arc<Self>, value: &mut Value) {
        if value.is_null() {
            return;
        }
        assert!(
            self.accepts(value),
            "free: {} value passed to type {}",
            value.type_name(),
            self.name
        );

        let runtime = match &*value {
            Value::Object(obj) if !Arc::ptr_eq(&obj.ty, self) => Some(obj.ty.clone()),
            _ => None,
        };
        if let Some(actual) = runtime {
            actual.free(value);
            return;
        }

        if self.behavior.as_ref().is_some_and(|b| b.free(self, value)) {
            return;
        }
        if self.is_struct().is_some() {
            template::free_struct(value);
        }
    }

    /// Duplicate `src` into a new value.
    ///
    /// With `rec` set, fields marked `recurse` are duplicated through their
    /// own type instead of being copied raw.
    pub fn dup(self: &Arc<Self>, src: &Value, rec: bool) -> Result<Value> {
        if !self.accepts(src) {
            return Err(ConsError::InitialsTypeMismatch {
                expected: self.name.clone(),
                got: src.type_name().to_string(),
            });
        }
        if let Value::Object(obj) = src {
            if !Arc::ptr_eq(&obj.ty, self) {
                return obj.ty.dup(src, rec);
            }
        }

        if let Some(result) = self.behavior.as_ref().and_then(|b| b.dup(self, src, rec)) {
            return result;
        }
        match src {
            Value::Object(obj) => template::dup_struct(obj, rec),
            other => Ok(other.shallow_copy()),
        }
    }

    /// Duplicate `src` over `dest`, freeing what `dest` held before.
    ///
    /// # Panics
    ///
    /// Panics if `dest` holds a value this type does not accept (see
    /// [`free`](Self::free)).
    pub fn dup_into(self: &Arc<Self>, dest: &mut Value, src: &Value, rec: bool) -> Result<()> {
        let mut value = self.dup(src, rec)?;
        clear_heap_flag(&mut value);
        self.free(dest);
        *dest = value;
        Ok(())
    }
}

fn clear_heap_flag(value: &mut Value) {
    if let Some(tracker) = value.as_object_mut().and_then(Object::tracker_mut) {
        tracker.set_heap_allocated(false);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("parity", &self.parity)
            .field("kind", &self.kind)
            .field("has_default", &self.default.get().is_some())
            .field("has_behavior", &self.behavior.is_some())
            .finish()
    }
}
