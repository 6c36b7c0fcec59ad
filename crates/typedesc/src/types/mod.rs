// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors.
//!
//! Reflection without the host type system: every typed value points to a
//! [`TypeDescriptor`] that supplies name, size, layout, construction,
//! destruction, duplication, comparison and subtyping.
//!
//! # Features
//!
//! - **TypeDescriptor**: reflective record with optional per-type behaviour
//!   and generic fallbacks
//! - **StructBuilder**: fluent construction of introspectable struct types
//! - **TemplateCons**: generic constructor (initials, override predicate,
//!   manager override, bounded failure message)
//! - **TypeRegistry**: concurrent name lookup, with a builtin catalogue
//!
//! # Example
//!
//! ```rust
//! use typedesc::types::{builtin, ScalarKind, StructBuilder, TemplateCons};
//!
//! let i32_ty = builtin::scalar_type(ScalarKind::I32).clone();
//! let point = StructBuilder::new("Point")
//!     .typed_field("x", i32_ty.clone())
//!     .typed_field("y", i32_ty)
//!     .with_tracker()
//!     .build();
//!
//! let mut value = point.init(&mut TemplateCons::new()).expect("init");
//! value.as_object_mut().expect("object").set("x", 3i32).expect("set");
//! assert_eq!(value.as_object().expect("object").get::<i32>("x"), Ok(3));
//!
//! // Tracked values built by `init` own themselves: free resets them
//! point.free(&mut value);
//! assert!(value.is_null());
//! ```

pub mod builtin;
mod builder;
mod descriptor;
mod field;
mod registry;
mod template;
mod value;

use crate::memory::MemoryTracker;

pub use builder::StructBuilder;
pub use descriptor::{same_type, ScalarKind, TypeBehavior, TypeDescriptor, TypeKind, TypeRef};
pub use field::{DefaultCheck, FieldDescriptor, StructDescriptor};
pub use registry::{builtin_registry, TypeRegistry};
pub use template::{dup_struct, free_struct, init_struct, MessageBuf, TemplateCons};
pub use value::{FromValue, Identity, Object, Value};
