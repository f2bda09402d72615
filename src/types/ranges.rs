// Copyright (c) 2024 Mike Tsao

use core::{
    fmt::Display,
    ops::{Mul, RangeInclusive, Sub},
};
use serde::{Deserialize, Serialize};

/// [RangedF64] enforces the given range limits while not becoming too expensive
/// to use compared to a plain f64. It enforces the value at creation, when
/// setting it explicitly, and when converting from an f64. Math operations are
/// not checked.
///
/// [RangedF64] doesn't tell you when clamping happens. It just does it,
/// silently, which is what a slider-driven parameter wants.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RangedF64<const LOWER: i8, const UPPER: i8>(pub f64);
#[allow(missing_docs)]
impl<const LOWER: i8, const UPPER: i8> RangedF64<LOWER, UPPER> {
    /// The highest valid value.
    pub const MAX: f64 = UPPER as f64;
    /// The lowest valid value.
    pub const MIN: f64 = LOWER as f64;

    pub fn new(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }
    pub const fn maximum() -> Self {
        Self(Self::MAX)
    }
    pub const fn minimum() -> Self {
        Self(Self::MIN)
    }
    pub fn set(&mut self, value: f64) {
        self.0 = value.clamp(Self::MIN, Self::MAX);
    }
    pub fn scale(&self, factor: f64) -> f64 {
        self.0 * factor
    }
}
impl<const LOWER: i8, const UPPER: i8> Display for RangedF64<LOWER, UPPER> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{}", self.0))
    }
}
impl<const LOWER: i8, const UPPER: i8> From<RangedF64<LOWER, UPPER>> for f64 {
    fn from(value: RangedF64<LOWER, UPPER>) -> Self {
        value.0.clamp(Self::MIN, Self::MAX)
    }
}
impl<const LOWER: i8, const UPPER: i8> From<f64> for RangedF64<LOWER, UPPER> {
    fn from(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }
}
impl<const LOWER: i8, const UPPER: i8> From<f32> for RangedF64<LOWER, UPPER> {
    fn from(value: f32) -> Self {
        Self(value.clamp(Self::MIN as f32, Self::MAX as f32) as f64)
    }
}

/// A [Normal] is a RangedF64 whose range is [0.0, 1.0]. Gains, mixes, and
/// sustain levels are all [Normal]s.
pub type Normal = RangedF64<0, 1>;
#[allow(missing_docs)]
impl Normal {
    pub const fn range() -> RangeInclusive<f64> {
        0.0..=1.0
    }
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }
    /// The complement, 1.0 - self. Used for wet/dry crossfades.
    pub fn complement(&self) -> Self {
        Self(1.0 - self.0)
    }
}
impl Default for Normal {
    // A default-constructed level should pass signal, not silence it.
    fn default() -> Self {
        Self(1.0)
    }
}
impl Mul<Normal> for f64 {
    type Output = Self;

    fn mul(self, rhs: Normal) -> Self::Output {
        self * rhs.0
    }
}
impl Mul<f64> for Normal {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}
impl Sub<Normal> for f64 {
    type Output = Self;

    fn sub(self, rhs: Normal) -> Self::Output {
        self - rhs.0
    }
}
impl From<Normal> for f32 {
    fn from(val: Normal) -> Self {
        val.0 as f32
    }
}
