// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for construction, duplication and field access.
//!
//! Comparison failures are not errors here: they travel as
//! [`Ordering`](crate::ordering::Ordering) sentinels so generic sort/search
//! code can abort cleanly without unwinding.

use std::fmt;

/// Errors returned when `init` or `dup` cannot produce a value.
///
/// Any buffers tracked before the failure have already been released when
/// one of these is returned.
#[derive(Debug)]
pub enum ConsError {
    /// Constructor initials are not a value of the type being built.
    InitialsTypeMismatch { expected: String, got: String },
    /// The memory manager refused an allocation.
    OutOfMemory { requested: usize },
    /// The type has no generic construction (opaque types).
    NotConstructible(String),
    /// An object does not carry one value per declared field.
    FieldCountMismatch { expected: usize, got: usize },
    /// A source buffer was already released by its owner.
    ReleasedBuffer,
    /// Construction of a nested field failed.
    Field {
        index: usize,
        name: String,
        source: Box<ConsError>,
    },
}

impl fmt::Display for ConsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialsTypeMismatch { expected, got } => {
                write!(f, "Initials type mismatch: expected {}, got {}", expected, got)
            }
            Self::OutOfMemory { requested } => {
                write!(f, "Out of memory: {} bytes requested", requested)
            }
            Self::NotConstructible(name) => write!(f, "Type {} is not constructible", name),
            Self::FieldCountMismatch { expected, got } => {
                write!(f, "Field count mismatch: expected {}, got {}", expected, got)
            }
            Self::ReleasedBuffer => write!(f, "Source buffer was already released"),
            Self::Field {
                index,
                name,
                source,
            } => write!(f, "Field #{} ({}): {}", index, name, source),
        }
    }
}

impl std::error::Error for ConsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Field { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Errors for named field access on objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    FieldNotFound(String),
    TypeMismatch { expected: String, got: String },
    /// The object's type declares no memory tracker.
    NotTracked(String),
    OutOfMemory { requested: usize },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFound(name) => write!(f, "Field not found: {}", name),
            Self::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Self::NotTracked(name) => write!(f, "Type {} has no memory tracker", name),
            Self::OutOfMemory { requested } => {
                write!(f, "Out of memory: {} bytes requested", requested)
            }
        }
    }
}

impl std::error::Error for ValueError {}

/// Result alias for construction and duplication.
pub type Result<T> = std::result::Result<T, ConsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_nested_field_error_chain() {
        let err = ConsError::Field {
            index: 2,
            name: "payload".into(),
            source: Box::new(ConsError::OutOfMemory { requested: 64 }),
        };
        assert_eq!(
            err.to_string(),
            "Field #2 (payload): Out of memory: 64 bytes requested"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_value_error_display() {
        let err = ValueError::TypeMismatch {
            expected: "i32".into(),
            got: "f64".into(),
        };
        assert_eq!(err.to_string(), "Type mismatch: expected i32, got f64");
    }
}
