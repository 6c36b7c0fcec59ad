// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Three-way comparison result with error sentinels.

use std::cmp;
use std::fmt;

/// Three-way comparison result.
///
/// Ordinary results are `-1`, `0`, `1`. The sentinels sit at the extremes
/// of `i32`, so `is_ordinary` is a single magnitude check:
///
/// | value | meaning |
/// |-------|---------|
/// | `i32::MIN` | [`INVALID`](Self::INVALID): absent operand / structurally invalid |
/// | `i32::MIN + 1` | [`MISMATCH`](Self::MISMATCH): operands of different types |
/// | `i32::MAX` | [`LOSSY`](Self::LOSSY): only a boolean `<` was available |
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ordering(i32);

impl Ordering {
    pub const LESS: Self = Self(-1);
    pub const EQUAL: Self = Self(0);
    pub const GREATER: Self = Self(1);
    pub const INVALID: Self = Self(i32::MIN);
    pub const MISMATCH: Self = Self(i32::MIN + 1);
    pub const LOSSY: Self = Self(i32::MAX);

    /// Normalize any signed result (e.g. a `memcmp` difference).
    ///
    /// Sentinel encodings are preserved; other values clamp to -1/0/1.
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            i32::MIN | i32::MAX => Self(raw),
            r if r == i32::MIN + 1 => Self(r),
            r if r < 0 => Self::LESS,
            0 => Self::EQUAL,
            _ => Self::GREATER,
        }
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// True for `LESS`, `EQUAL` and `GREATER`.
    pub const fn is_ordinary(self) -> bool {
        self.0.unsigned_abs() <= 1
    }

    /// True for `INVALID` and `MISMATCH`.
    pub const fn is_error(self) -> bool {
        self.0 == Self::INVALID.0 || self.0 == Self::MISMATCH.0
    }

    pub const fn is_lossy(self) -> bool {
        self.0 == Self::LOSSY.0
    }

    pub const fn is_eq(self) -> bool {
        self.0 == 0
    }

    /// Swap operand order: ordinary results negate, sentinels pass through.
    pub const fn invert(self) -> Self {
        if self.is_ordinary() {
            Self(-self.0)
        } else {
            self
        }
    }

    /// Degenerate result from a boolean `check < baseline` test.
    ///
    /// `true` is a real `LESS`; `false` cannot tell equal from greater.
    pub const fn from_less_than(less: bool) -> Self {
        if less {
            Self::LESS
        } else {
            Self::LOSSY
        }
    }

    /// Chain a tie-breaker: `self` unless it is `EQUAL`.
    pub const fn then(self, other: Self) -> Self {
        if self.is_eq() {
            other
        } else {
            self
        }
    }

    /// Convert to `std::cmp::Ordering` (ordinary results only).
    pub fn to_std(self) -> Option<cmp::Ordering> {
        match self.0 {
            -1 => Some(cmp::Ordering::Less),
            0 => Some(cmp::Ordering::Equal),
            1 => Some(cmp::Ordering::Greater),
            _ => None,
        }
    }

    /// Convert a `partial_cmp` outcome; unordered operands are `INVALID`.
    pub fn from_partial(ord: Option<cmp::Ordering>) -> Self {
        ord.map_or(Self::INVALID, Self::from)
    }
}

impl From<cmp::Ordering> for Ordering {
    fn from(ord: cmp::Ordering) -> Self {
        match ord {
            cmp::Ordering::Less => Self::LESS,
            cmp::Ordering::Equal => Self::EQUAL,
            cmp::Ordering::Greater => Self::GREATER,
        }
    }
}

impl fmt::Debug for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::LESS => write!(f, "Less"),
            Self::EQUAL => write!(f, "Equal"),
            Self::GREATER => write!(f, "Greater"),
            Self::INVALID => write!(f, "Invalid"),
            Self::MISMATCH => write!(f, "Mismatch"),
            Self::LOSSY => write!(f, "Lossy"),
            Self(raw) => write!(f, "Ordering({})", raw),
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_ordinary_negates() {
        for r in [Ordering::LESS, Ordering::EQUAL, Ordering::GREATER] {
            assert_eq!(r.invert().raw(), -r.raw());
            assert!(r.is_ordinary());
        }
    }

    #[test]
    fn test_invert_sentinels_pass_through() {
        for e in [Ordering::INVALID, Ordering::MISMATCH, Ordering::LOSSY] {
            assert_eq!(e.invert(), e);
            assert!(!e.is_ordinary());
        }
        assert!(Ordering::INVALID.is_error());
        assert!(Ordering::MISMATCH.is_error());
        assert!(!Ordering::LOSSY.is_error());
    }

    #[test]
    fn test_from_raw_clamps() {
        assert_eq!(Ordering::from_raw(-42), Ordering::LESS);
        assert_eq!(Ordering::from_raw(0), Ordering::EQUAL);
        assert_eq!(Ordering::from_raw(7), Ordering::GREATER);
        assert_eq!(Ordering::from_raw(i32::MIN), Ordering::INVALID);
        assert_eq!(Ordering::from_raw(i32::MIN + 1), Ordering::MISMATCH);
    }

    #[test]
    fn test_std_conversion() {
        assert_eq!(Ordering::from(1.cmp(&2)), Ordering::LESS);
        assert_eq!(Ordering::GREATER.to_std(), Some(cmp::Ordering::Greater));
        assert_eq!(Ordering::LOSSY.to_std(), None);
        assert_eq!(Ordering::from_partial(f64::NAN.partial_cmp(&1.0)), Ordering::INVALID);
    }

    #[test]
    fn test_lossy_and_then() {
        assert_eq!(Ordering::from_less_than(true), Ordering::LESS);
        assert!(Ordering::from_less_than(false).is_lossy());
        assert_eq!(Ordering::EQUAL.then(Ordering::GREATER), Ordering::GREATER);
        assert_eq!(Ordering::LESS.then(Ordering::GREATER), Ordering::LESS);
    }
}
