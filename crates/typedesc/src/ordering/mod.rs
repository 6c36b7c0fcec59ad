// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Three-way ordering and the comparer family.
//!
//! # Features
//!
//! - **Ordering**: `-1/0/1` plus `INVALID`, `MISMATCH` and `LOSSY` sentinels
//! - **Comparer**: one calling convention `(context, check, baseline)` for
//!   scalars, identities, memory ranges, strings and typed values
//! - **compare_tval**: dispatch through the runtime type of a value
//!
//! # Example
//!
//! ```rust
//! use typedesc::ordering::{Comparer, Ordering};
//!
//! let strz = Comparer::<str>::strz();
//! assert_eq!(strz.cmp("abc", "abd"), Ordering::LESS);
//!
//! let strn = Comparer::<str>::strn(2);
//! assert_eq!(strn.cmp("abXX", "abYY"), Ordering::EQUAL);
//! ```

mod comparer;
mod result;
mod typed;

pub use comparer::{
    compare_identity, compare_less_than, compare_mem, compare_scalar, compare_strn,
    compare_strnr, compare_strz, compare_strzr, search_by_comparer, sort_by_comparer, CompareFn,
    Comparer, Context,
};
pub use result::Ordering;
pub use typed::{compare_tval, compare_with_type, generic_compare, runtime_type};

/// True when `cmp` reports `check` and `baseline` equal.
pub fn equals<T: ?Sized>(cmp: &Comparer<T>, check: &T, baseline: &T) -> bool {
    cmp.equals(check, baseline)
}
