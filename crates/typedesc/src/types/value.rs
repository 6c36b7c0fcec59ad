// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values and introspectable struct instances.

use super::{ScalarKind, TypeKind, TypeRef};
use crate::error::{ConsError, ValueError};
use crate::memory::{BufferRef, MemoryTracker};

/// Address-like identity of an object or function.
///
/// Only compared, never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(usize);

impl Identity {
    pub const NULL: Self = Self(0);

    /// Identity of the referenced object.
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Self((value as *const T).cast::<()>() as usize)
    }

    /// Identity from a raw address (e.g. `f as usize` for a function).
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    pub const fn addr(self) -> usize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A value that can be described by a type descriptor.
#[derive(Debug, Default)]
pub enum Value {
    /// Absent value (null reference, uninitialised target).
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    /// Auxiliary byte buffer owned by some tracker.
    Buffer(BufferRef),
    /// Struct instance carrying its own type tag.
    Object(Box<Object>),
    ObjectRef(Identity),
    FunctionRef(Identity),
    /// A type descriptor used as a value.
    Type(TypeRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Generic "looks like a default" test: null, false, NUL, numeric
    /// zero (floats by bit pattern), null identities, and objects whose
    /// fields are all zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(v) => !*v,
            Self::Char(v) => *v == '\0',
            Self::I8(v) => *v == 0,
            Self::I16(v) => *v == 0,
            Self::I32(v) => *v == 0,
            Self::I64(v) => *v == 0,
            Self::Isize(v) => *v == 0,
            Self::U8(v) => *v == 0,
            Self::U16(v) => *v == 0,
            Self::U32(v) => *v == 0,
            Self::U64(v) => *v == 0,
            Self::Usize(v) => *v == 0,
            Self::F32(v) => v.to_bits() == 0,
            Self::F64(v) => v.to_bits() == 0,
            Self::ObjectRef(id) | Self::FunctionRef(id) => id.is_null(),
            Self::Object(obj) => obj.fields.iter().all(Value::is_zero),
            Self::Buffer(_) | Self::Type(_) => false,
        }
    }

    /// Raw copy: scalars copied, buffers aliased, nested objects copied
    /// field-wise with a fresh empty tracker.
    pub fn shallow_copy(&self) -> Value {
        match self {
            Self::Null => Self::Null,
            Self::Bool(v) => Self::Bool(*v),
            Self::Char(v) => Self::Char(*v),
            Self::I8(v) => Self::I8(*v),
            Self::I16(v) => Self::I16(*v),
            Self::I32(v) => Self::I32(*v),
            Self::I64(v) => Self::I64(*v),
            Self::Isize(v) => Self::Isize(*v),
            Self::U8(v) => Self::U8(*v),
            Self::U16(v) => Self::U16(*v),
            Self::U32(v) => Self::U32(*v),
            Self::U64(v) => Self::U64(*v),
            Self::Usize(v) => Self::Usize(*v),
            Self::F32(v) => Self::F32(*v),
            Self::F64(v) => Self::F64(*v),
            Self::Buffer(b) => Self::Buffer(b.clone()),
            Self::Object(obj) => Self::Object(Box::new(obj.shallow_copy())),
            Self::ObjectRef(id) => Self::ObjectRef(*id),
            Self::FunctionRef(id) => Self::FunctionRef(*id),
            Self::Type(ty) => Self::Type(ty.clone()),
        }
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        let kind = match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Char(_) => ScalarKind::Char,
            Self::I8(_) => ScalarKind::I8,
            Self::I16(_) => ScalarKind::I16,
            Self::I32(_) => ScalarKind::I32,
            Self::I64(_) => ScalarKind::I64,
            Self::Isize(_) => ScalarKind::Isize,
            Self::U8(_) => ScalarKind::U8,
            Self::U16(_) => ScalarKind::U16,
            Self::U32(_) => ScalarKind::U32,
            Self::U64(_) => ScalarKind::U64,
            Self::Usize(_) => ScalarKind::Usize,
            Self::F32(_) => ScalarKind::F32,
            Self::F64(_) => ScalarKind::F64,
            _ => return None,
        };
        Some(kind)
    }

    /// Display name of the value's shape (the type name for objects).
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Buffer(_) => "bytes",
            Self::Object(obj) => obj.ty.name(),
            Self::ObjectRef(_) => "object_ref",
            Self::FunctionRef(_) => "function_ref",
            Self::Type(_) => "type",
            scalar => scalar.scalar_kind().map_or("?", ScalarKind::name),
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_buffer(&self) -> Option<&BufferRef> {
        match self {
            Self::Buffer(b) => Some(b),
            _ => None,
        }
    }
}

/// Conversion out of a [`Value`].
pub trait FromValue: Sized {
    /// Name used in mismatch errors.
    const NAME: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! scalar_conversions {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }

            impl FromValue for $t {
                const NAME: &'static str = stringify!($t);

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

scalar_conversions! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

impl From<BufferRef> for Value {
    fn from(b: BufferRef) -> Self {
        Value::Buffer(b)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(Box::new(obj))
    }
}

impl From<TypeRef> for Value {
    fn from(ty: TypeRef) -> Self {
        Value::Type(ty)
    }
}

impl FromValue for Vec<u8> {
    const NAME: &'static str = "bytes";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_buffer()?.to_vec()
    }
}

impl FromValue for TypeRef {
    const NAME: &'static str = "type";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Type(ty) => Some(ty.clone()),
            _ => None,
        }
    }
}

/// Instance of a struct type: one value per field, plus the embedded
/// tracker when the struct declares one.
#[derive(Debug)]
pub struct Object {
    pub(crate) ty: TypeRef,
    pub(crate) fields: Vec<Value>,
    pub(crate) tracker: Option<MemoryTracker>,
}

impl Object {
    /// Assemble an object from field values.
    ///
    /// The tracker (if declared) starts empty and unbound; buffers passed
    /// here stay owned by whoever allocated them.
    pub fn new(ty: &TypeRef, fields: Vec<Value>) -> crate::Result<Self> {
        let desc = ty
            .is_struct()
            .ok_or_else(|| ConsError::NotConstructible(ty.name().to_string()))?;
        if fields.len() != desc.len() {
            return Err(ConsError::FieldCountMismatch {
                expected: desc.len(),
                got: fields.len(),
            });
        }
        let tracker = desc.is_tracked().then(MemoryTracker::default);
        Ok(Self::from_parts(ty.clone(), fields, tracker))
    }

    pub(crate) fn from_parts(
        ty: TypeRef,
        fields: Vec<Value>,
        tracker: Option<MemoryTracker>,
    ) -> Self {
        Self {
            ty,
            fields,
            tracker,
        }
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.fields.get_mut(index)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Value> {
        let index = self.ty.is_struct()?.index_of(name)?;
        self.fields.get(index)
    }

    pub fn tracker(&self) -> Option<&MemoryTracker> {
        self.tracker.as_ref()
    }

    pub fn tracker_mut(&mut self) -> Option<&mut MemoryTracker> {
        self.tracker.as_mut()
    }

    /// Read a field by name.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ValueError> {
        let value = self
            .field_by_name(name)
            .ok_or_else(|| ValueError::FieldNotFound(name.to_string()))?;
        T::from_value(value).ok_or_else(|| ValueError::TypeMismatch {
            expected: T::NAME.to_string(),
            got: value.type_name().to_string(),
        })
    }

    /// Overwrite a field. Typed fields only accept values of their type.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValueError> {
        let value = value.into();
        let index = self.index_of(name)?;
        if let Some(ty) = self.ty.is_struct().and_then(|d| d.field(index)?.ty.clone()) {
            if !ty.accepts(&value) {
                return Err(ValueError::TypeMismatch {
                    expected: ty.name().to_string(),
                    got: value.type_name().to_string(),
                });
            }
        }
        self.fields[index] = value;
        Ok(())
    }

    /// Copy `bytes` into a buffer owned by this object's tracker and store
    /// it in the named field.
    pub fn set_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<BufferRef, ValueError> {
        let index = self.index_of(name)?;
        let field_ty = self.ty.is_struct().and_then(|d| d.field(index)?.ty.clone());
        if let Some(ty) = field_ty {
            if !matches!(ty.kind(), TypeKind::Bytes | TypeKind::Opaque { .. }) {
                return Err(ValueError::TypeMismatch {
                    expected: ty.name().to_string(),
                    got: "bytes".to_string(),
                });
            }
        }

        let Some(tracker) = self.tracker.as_mut() else {
            return Err(ValueError::NotTracked(self.ty.name().to_string()));
        };
        let buffer = tracker
            .allocate_copy(bytes)
            .ok_or(ValueError::OutOfMemory {
                requested: bytes.len(),
            })?;
        self.fields[index] = Value::Buffer(buffer.clone());
        Ok(buffer)
    }

    /// Contents of a buffer field (`None` if absent, not a buffer, or released).
    pub fn bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.field_by_name(name)?.as_buffer()?.to_vec()
    }

    pub(crate) fn shallow_copy(&self) -> Object {
        Object {
            ty: self.ty.clone(),
            fields: self.fields.iter().map(Value::shallow_copy).collect(),
            tracker: self
                .tracker
                .as_ref()
                .map(|t| MemoryTracker::new(t.manager().cloned())),
        }
    }

    fn index_of(&self, name: &str) -> Result<usize, ValueError> {
        self.ty
            .is_struct()
            .and_then(|d| d.index_of(name))
            .filter(|&i| i < self.fields.len())
            .ok_or_else(|| ValueError::FieldNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_zero() {
        assert!(Value::Null.is_zero());
        assert!(Value::I64(0).is_zero());
        assert!(Value::F64(0.0).is_zero());
        assert!(!Value::F64(-0.0).is_zero());
        assert!(!Value::Char('a').is_zero());
        assert!(Value::ObjectRef(Identity::NULL).is_zero());
        assert!(!Value::Buffer(BufferRef::dangling()).is_zero());
    }

    #[test]
    fn test_scalar_conversions() {
        let v: Value = 7u16.into();
        assert_eq!(v.scalar_kind(), Some(ScalarKind::U16));
        assert_eq!(u16::from_value(&v), Some(7));
        assert_eq!(i32::from_value(&v), None);
        assert_eq!(v.type_name(), "u16");
    }

    #[test]
    fn test_identity_of_function() {
        fn handler() {}
        let f = Identity::from_addr(handler as usize);
        assert!(!f.is_null());
        assert_eq!(f, Identity::from_addr(handler as usize));
    }

    #[test]
    fn test_shallow_copy_aliases_buffers() {
        let mut tracker = MemoryTracker::new(None);
        let buf = tracker.allocate_copy(b"xyz").expect("alloc");
        let v = Value::Buffer(buf);
        let copy = v.shallow_copy();
        match (&v, &copy) {
            (Value::Buffer(a), Value::Buffer(b)) => assert!(a.same_buffer(b)),
            _ => panic!("expected buffers"),
        }
    }
}
