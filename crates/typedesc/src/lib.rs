// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # typedesc - runtime type descriptors
//!
//! A small metaobject runtime: values are tagged with a [`TypeDescriptor`]
//! that supplies reflective operations (name, size, layout, construction,
//! destruction, duplication, comparison, subtyping) without relying on the
//! host type system.
//!
//! ## Quick Start
//!
//! ```rust
//! use typedesc::types::{builtin, ScalarKind, StructBuilder, TemplateCons, Value};
//! use typedesc::ordering::{Comparer, Ordering};
//!
//! let u32_ty = builtin::scalar_type(ScalarKind::U32).clone();
//! let version = StructBuilder::new("Version")
//!     .typed_field("major", u32_ty.clone())
//!     .typed_field("minor", u32_ty)
//!     .build();
//!
//! let mut old = version.init(&mut TemplateCons::new()).expect("init");
//! let mut new = version.init(&mut TemplateCons::new()).expect("init");
//! new.as_object_mut().expect("object").set("minor", 1u32).expect("set");
//!
//! let cmp = Comparer::<Value>::typed(None);
//! assert_eq!(cmp.cmp(&old, &new), Ordering::LESS);
//!
//! version.free(&mut old);
//! version.free(&mut new);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |   ordering: Ordering sentinels | Comparer family | typed dispatch  |
//! +---------------------------------------------------------------------+
//! |   types: TypeDescriptor | StructBuilder | TemplateCons | registry   |
//! +---------------------------------------------------------------------+
//! |   memory: MemoryManager fallbacks | MemoryTracker | BufferRef       |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`types`] - descriptors, values, generic init/free/dup (start here)
//! - [`memory`] - pluggable allocators and per-value tracking
//! - [`ordering`] - three-way comparison and comparers
//! - [`config`] - constants and the process-wide default manager

/// Global configuration (constants, default memory manager).
pub mod config;
/// Construction and field access errors.
pub mod error;
/// Memory managers, trackers and buffer handles.
pub mod memory;
/// Ordering results, comparers and type-dispatched comparison.
pub mod ordering;
/// Type descriptors, struct introspection and template constructors.
pub mod types;

pub use error::{ConsError, Result, ValueError};
pub use memory::{MemoryManager, MemoryTracker};
pub use ordering::{Comparer, Ordering};
pub use types::{
    builtin_registry, StructBuilder, TemplateCons, TypeDescriptor, TypeRef, TypeRegistry, Value,
};
