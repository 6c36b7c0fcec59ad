// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name-keyed registry of type descriptors.

use super::{builtin, TypeRef};
use dashmap::DashMap;
use std::sync::OnceLock;

/// Concurrent name -> descriptor map.
///
/// Descriptors are immutable once published, so lookups hand out clones
/// of the shared handle.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    /// `DashMap`: concurrent map with internal sharding (no global lock).
    types: DashMap<String, TypeRef>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every builtin descriptor.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for ty in builtin::builtin_types() {
            registry.register(ty.clone());
        }
        registry
    }

    /// Register `ty` under its name, returning the descriptor it replaced.
    pub fn register(&self, ty: TypeRef) -> Option<TypeRef> {
        let name = ty.name().to_string();
        let previous = self.types.insert(name, ty);
        if let Some(old) = &previous {
            log::debug!("[registry] replaced type {}", old.name());
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<TypeRef> {
        self.types.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Option<TypeRef> {
        self.types.remove(name).map(|(_, ty)| ty)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }
}

static BUILTIN_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

/// Process-wide registry pre-populated with the builtin types.
pub fn builtin_registry() -> &'static TypeRegistry {
    BUILTIN_REGISTRY.get_or_init(TypeRegistry::with_builtins)
}
