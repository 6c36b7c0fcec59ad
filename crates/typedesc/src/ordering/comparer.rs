// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Uniform comparers: one function shape plus an opaque context.
//!
//! Every comparer has the signature
//! `fn(&Context, Option<&T>, Option<&T>) -> Ordering`. Absent operands
//! yield [`Ordering::INVALID`] instead of panicking, so generic sort and
//! search code can abort cleanly.

use super::Ordering;
use crate::types::{Identity, TypeRef, Value};
use std::fmt;

/// Opaque comparer context.
#[derive(Clone, Debug, Default)]
pub enum Context {
    /// No parameters.
    #[default]
    None,
    /// Byte count for memory and bounded string comparers.
    Len(usize),
    /// Type used by type-dispatched comparers.
    Type(TypeRef),
}

impl Context {
    pub fn none() -> Self {
        Self::None
    }

    /// Context carrying a byte count.
    pub fn len(n: usize) -> Self {
        Self::Len(n)
    }

    /// Context carrying a type descriptor.
    pub fn of_type(ty: TypeRef) -> Self {
        Self::Type(ty)
    }

    pub fn byte_len(&self) -> Option<usize> {
        match self {
            Self::Len(n) => Some(*n),
            _ => None,
        }
    }

    pub fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            Self::Type(ty) => Some(ty),
            _ => None,
        }
    }
}

/// Signature shared by every comparer.
pub type CompareFn<T> = fn(&Context, Option<&T>, Option<&T>) -> Ordering;

/// A comparison function bound to its context.
pub struct Comparer<T: ?Sized> {
    func: CompareFn<T>,
    ctx: Context,
}

impl<T: ?Sized> Comparer<T> {
    pub fn new(func: CompareFn<T>, ctx: Context) -> Self {
        Self { func, ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Compare `check` against `baseline`; either may be absent.
    pub fn compare(&self, check: Option<&T>, baseline: Option<&T>) -> Ordering {
        (self.func)(&self.ctx, check, baseline)
    }

    /// Compare two present operands.
    pub fn cmp(&self, check: &T, baseline: &T) -> Ordering {
        self.compare(Some(check), Some(baseline))
    }

    pub fn equals(&self, check: &T, baseline: &T) -> bool {
        self.cmp(check, baseline).is_eq()
    }
}

impl<T: ?Sized> Clone for Comparer<T> {
    fn clone(&self) -> Self {
        Self {
            func: self.func,
            ctx: self.ctx.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Comparer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparer")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl<T: PartialOrd> Comparer<T> {
    /// Direct value comparison for scalars.
    pub fn scalar() -> Self {
        Self::new(compare_scalar::<T>, Context::None)
    }
}

impl Comparer<Identity> {
    pub fn identity() -> Self {
        Self::new(compare_identity, Context::None)
    }
}

impl Comparer<[u8]> {
    /// Compare the first `n` bytes.
    pub fn mem(n: usize) -> Self {
        Self::new(compare_mem, Context::len(n))
    }
}

impl<S: AsRef<[u8]> + ?Sized> Comparer<S> {
    /// Bounded string comparison (at most `n` bytes, stops at NUL).
    pub fn strn(n: usize) -> Self {
        Self::new(compare_strn::<S>, Context::len(n))
    }

    /// NUL-terminated string comparison.
    pub fn strz() -> Self {
        Self::new(compare_strz::<S>, Context::None)
    }
}

impl<'a, S: AsRef<[u8]> + ?Sized> Comparer<&'a S> {
    /// Bounded comparison over elements that reference strings.
    pub fn strnr(n: usize) -> Self {
        Self::new(compare_strnr::<S>, Context::len(n))
    }

    /// NUL-terminated comparison over elements that reference strings.
    pub fn strzr() -> Self {
        Self::new(compare_strzr::<S>, Context::None)
    }
}

impl Comparer<Value> {
    /// Type-dispatched comparison; `ty` is used for untagged values.
    pub fn typed(ty: Option<TypeRef>) -> Self {
        let ctx = ty.map_or(Context::None, Context::Type);
        Self::new(super::compare_tval, ctx)
    }
}

// ============================================================================
// Comparer family
// ============================================================================

/// Compare scalars by value. Unordered operands (NaN) are `INVALID`.
pub fn compare_scalar<T: PartialOrd + ?Sized>(
    _ctx: &Context,
    check: Option<&T>,
    baseline: Option<&T>,
) -> Ordering {
    match (check, baseline) {
        (Some(a), Some(b)) => Ordering::from_partial(a.partial_cmp(b)),
        _ => Ordering::INVALID,
    }
}

/// Boolean `<` comparison; anything but "less" comes back `LOSSY`.
pub fn compare_less_than<T: PartialOrd + ?Sized>(
    _ctx: &Context,
    check: Option<&T>,
    baseline: Option<&T>,
) -> Ordering {
    match (check, baseline) {
        (Some(a), Some(b)) => Ordering::from_less_than(a < b),
        _ => Ordering::INVALID,
    }
}

/// Compare object or function identities by address.
pub fn compare_identity(
    _ctx: &Context,
    check: Option<&Identity>,
    baseline: Option<&Identity>,
) -> Ordering {
    match (check, baseline) {
        (Some(a), Some(b)) => a.addr().cmp(&b.addr()).into(),
        _ => Ordering::INVALID,
    }
}

/// Compare the first `n` bytes, `n` taken from `Context::Len`.
///
/// `n == 0` is `EQUAL`; operands shorter than `n` are `INVALID`.
pub fn compare_mem(ctx: &Context, check: Option<&[u8]>, baseline: Option<&[u8]>) -> Ordering {
    let (Some(a), Some(b)) = (check, baseline) else {
        return Ordering::INVALID;
    };
    let Some(n) = ctx.byte_len() else {
        return Ordering::INVALID;
    };
    if n == 0 {
        return Ordering::EQUAL;
    }

    match (a.get(..n), b.get(..n)) {
        (Some(a), Some(b)) => a.cmp(b).into(),
        _ => Ordering::INVALID,
    }
}

/// Bounded string comparison, `n` taken from `Context::Len`.
pub fn compare_strn<S: AsRef<[u8]> + ?Sized>(
    ctx: &Context,
    check: Option<&S>,
    baseline: Option<&S>,
) -> Ordering {
    let (Some(a), Some(b)) = (check, baseline) else {
        return Ordering::INVALID;
    };
    match ctx.byte_len() {
        Some(n) => strncmp(a.as_ref(), b.as_ref(), n),
        None => Ordering::INVALID,
    }
}

/// NUL-terminated string comparison; the end of a slice counts as NUL.
pub fn compare_strz<S: AsRef<[u8]> + ?Sized>(
    _ctx: &Context,
    check: Option<&S>,
    baseline: Option<&S>,
) -> Ordering {
    match (check, baseline) {
        (Some(a), Some(b)) => strncmp(a.as_ref(), b.as_ref(), usize::MAX),
        _ => Ordering::INVALID,
    }
}

/// [`compare_strn`] over elements that are references to strings.
pub fn compare_strnr<S: AsRef<[u8]> + ?Sized>(
    ctx: &Context,
    check: Option<&&S>,
    baseline: Option<&&S>,
) -> Ordering {
    compare_strn(ctx, check.copied(), baseline.copied())
}

/// [`compare_strz`] over elements that are references to strings.
pub fn compare_strzr<S: AsRef<[u8]> + ?Sized>(
    ctx: &Context,
    check: Option<&&S>,
    baseline: Option<&&S>,
) -> Ordering {
    compare_strz(ctx, check.copied(), baseline.copied())
}

fn strncmp(a: &[u8], b: &[u8], n: usize) -> Ordering {
    let limit = a.len().max(b.len()).saturating_add(1).min(n);
    for i in 0..limit {
        let ca = a.get(i).copied().unwrap_or(0);
        let cb = b.get(i).copied().unwrap_or(0);
        if ca != cb {
            return ca.cmp(&cb).into();
        }
        if ca == 0 {
            break;
        }
    }
    Ordering::EQUAL
}

// ============================================================================
// Generic algorithms over comparers
// ============================================================================

/// Stable in-place sort.
///
/// Aborts with the first non-ordinary result; the slice is then partially
/// sorted. Insertion sort: meant for the short sequences reflection code
/// handles.
pub fn sort_by_comparer<T>(items: &mut [T], cmp: &Comparer<T>) -> Result<(), Ordering> {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 {
            let r = cmp.cmp(&items[j], &items[j - 1]);
            if !r.is_ordinary() {
                return Err(r);
            }
            if r != Ordering::LESS {
                break;
            }
            items.swap(j, j - 1);
            j -= 1;
        }
    }
    Ok(())
}

/// Binary search over a slice sorted by the same comparer.
pub fn search_by_comparer<T>(
    items: &[T],
    key: &T,
    cmp: &Comparer<T>,
) -> Result<Option<usize>, Ordering> {
    let (mut lo, mut hi) = (0, items.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match cmp.cmp(&items[mid], key) {
            Ordering::LESS => lo = mid + 1,
            Ordering::GREATER => hi = mid,
            Ordering::EQUAL => return Ok(Some(mid)),
            err => return Err(err),
        }
    }
    Ok(None)
}
