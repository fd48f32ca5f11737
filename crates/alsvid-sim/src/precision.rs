//! Floating-point precision abstraction.
//!
//! The engine is generic over the amplitude scalar so the same kernels serve
//! single precision (half the memory, one more qubit in the same footprint)
//! and double precision (tighter tolerances).

use std::fmt::{Debug, Display};

use num_traits::{Float, FloatConst, NumAssign};

/// Scalar type usable as the real/imaginary part of an amplitude.
pub trait Precision:
    Float + FloatConst + NumAssign + Send + Sync + Debug + Display + 'static
{
    /// Convert an `f64` constant (gate angle, matrix entry) losslessly enough
    /// for this precision.
    fn lit(value: f64) -> Self;

    /// Widen back to `f64` for reporting.
    fn to_f64(self) -> f64;

    /// Tolerance for norm checks after a sequence of gates.
    fn norm_epsilon() -> Self;

    /// Smallest retained probability a measurement may collapse onto. Below
    /// this the renormalization 1/sqrt(p) is numerically meaningless.
    fn prob_floor() -> Self;
}

impl Precision for f32 {
    #[inline]
    fn lit(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn norm_epsilon() -> Self {
        1e-4
    }

    fn prob_floor() -> Self {
        1e-12
    }
}

impl Precision for f64 {
    #[inline]
    fn lit(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    fn norm_epsilon() -> Self {
        1e-9
    }

    fn prob_floor() -> Self {
        1e-24
    }
}
