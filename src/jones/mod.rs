// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Code for general Jones matrix math.

It's not ideal to use LAPACK for matrix multiplies, because it is not possible
to optimise only for 2x2 matrices. Here, we supply the math for these special
cases. Everything is generic over the working precision ([`VisFloat`]), and
[`JonesElement`] abstracts over full 2x2 matrices and scalar complex numbers so
that the measurement equation can be evaluated in "matrix" or "scalar" mode
with the same code.
 */

mod element;
mod error;
mod field;

pub use element::{Coherency, JonesElement};
pub use error::JonesError;
pub use field::JonesField;

use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Deref, DerefMut, Div, Mul, MulAssign, Sub};

use num_complex::Complex;
use num_traits::{Float, NumAssign};
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};

/// A floating-point type that visibilities can be simulated in.
pub trait VisFloat:
    Float + NumAssign + Default + Debug + Display + Send + Sync + 'static
{
    /// The precision that this type represents.
    const PRECISION: Precision;

    fn from_double(v: f64) -> Self;

    fn to_double(self) -> f64;
}

impl VisFloat for f32 {
    const PRECISION: Precision = Precision::Single;

    #[inline(always)]
    fn from_double(v: f64) -> Self {
        v as f32
    }

    #[inline(always)]
    fn to_double(self) -> f64 {
        self as f64
    }
}

impl VisFloat for f64 {
    const PRECISION: Precision = Precision::Double;

    #[inline(always)]
    fn from_double(v: f64) -> Self {
        v
    }

    #[inline(always)]
    fn to_double(self) -> f64 {
        self
    }
}

/// The floating-point precision used for Jones matrices and visibilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[strum(serialize = "single")]
    Single,
    #[strum(serialize = "double")]
    Double,
}

/// Whether polarisation is simulated (2x2 matrices) or not (scalars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JonesMode {
    #[strum(serialize = "scalar")]
    Scalar,
    #[strum(serialize = "matrix")]
    Matrix,
}

/// The type of visibility data being simulated: a precision and whether the
/// data is polarised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisType {
    pub precision: Precision,
    pub mode: JonesMode,
}

impl VisType {
    pub fn new(double_precision: bool, scalar_mode: bool) -> VisType {
        VisType {
            precision: if double_precision {
                Precision::Double
            } else {
                Precision::Single
            },
            mode: if scalar_mode {
                JonesMode::Scalar
            } else {
                JonesMode::Matrix
            },
        }
    }

    /// The number of complex numbers in each visibility sample.
    pub fn num_components(self) -> usize {
        match self.mode {
            JonesMode::Scalar => 1,
            JonesMode::Matrix => 4,
        }
    }
}

impl std::fmt::Display for VisType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}-precision {}", self.precision, self.mode)
    }
}

/// A 2x2 complex matrix, stored row major: `[XX, XY, YX, YY]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Jones<F: VisFloat>([Complex<F>; 4]);

impl<F: VisFloat> Jones<F> {
    #[inline(always)]
    pub fn identity() -> Self {
        Self([
            Complex::new(F::one(), F::zero()),
            Complex::new(F::zero(), F::zero()),
            Complex::new(F::zero(), F::zero()),
            Complex::new(F::one(), F::zero()),
        ])
    }

    #[inline(always)]
    pub fn zero() -> Self {
        Self([Complex::new(F::zero(), F::zero()); 4])
    }

    /// A matrix with `d` on both diagonals and zeros elsewhere.
    #[inline(always)]
    pub fn diagonal(d: Complex<F>) -> Self {
        let z = Complex::new(F::zero(), F::zero());
        Self([d, z, z, d])
    }

    /// From an input Jones matrix, get a copy that has been Hermitian
    /// conjugated (J^H).
    ///
    /// # Examples
    ///
    /// ```
    /// # use num_complex::Complex;
    /// # use rime_simulator::jones::Jones;
    /// let j = Jones::from([
    ///     Complex::new(1.0, 2.0),
    ///     Complex::new(3.0, 4.0),
    ///     Complex::new(5.0, 6.0),
    ///     Complex::new(7.0, 8.0),
    /// ]);
    /// let expected = Jones::from([
    ///     Complex::new(1.0, -2.0),
    ///     Complex::new(5.0, -6.0),
    ///     Complex::new(3.0, -4.0),
    ///     Complex::new(7.0, -8.0),
    /// ]);
    /// assert_eq!(j.h(), expected);
    /// ```
    #[inline(always)]
    pub fn h(&self) -> Self {
        Self([
            self[0].conj(),
            self[2].conj(),
            self[1].conj(),
            self[3].conj(),
        ])
    }

    /// Multiply by a Jones matrix which gets Hermitian conjugated (J^H).
    #[inline(always)]
    pub fn mul_hermitian(&self, b: &Self) -> Self {
        *self * b.h()
    }

    /// Get a double-precision copy of this matrix.
    #[inline(always)]
    pub fn to_double(self) -> Jones<f64> {
        Jones([
            Complex::new(self[0].re.to_double(), self[0].im.to_double()),
            Complex::new(self[1].re.to_double(), self[1].im.to_double()),
            Complex::new(self[2].re.to_double(), self[2].im.to_double()),
            Complex::new(self[3].re.to_double(), self[3].im.to_double()),
        ])
    }

    /// Demote (or copy) a double-precision matrix into this precision.
    #[inline(always)]
    pub fn from_double(j: Jones<f64>) -> Self {
        Self([
            Complex::new(F::from_double(j[0].re), F::from_double(j[0].im)),
            Complex::new(F::from_double(j[1].re), F::from_double(j[1].im)),
            Complex::new(F::from_double(j[2].re), F::from_double(j[2].im)),
            Complex::new(F::from_double(j[3].re), F::from_double(j[3].im)),
        ])
    }

    /// Are any of the elements NaN?
    pub fn any_nan(&self) -> bool {
        self.iter().any(|c| c.re.is_nan() || c.im.is_nan())
    }
}

impl<F: VisFloat> From<[Complex<F>; 4]> for Jones<F> {
    #[inline(always)]
    fn from(arr: [Complex<F>; 4]) -> Self {
        Self(arr)
    }
}

impl<F: VisFloat> Deref for Jones<F> {
    type Target = [Complex<F>; 4];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<F: VisFloat> DerefMut for Jones<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<F: VisFloat> Add<Jones<F>> for Jones<F> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self([
            self[0] + rhs[0],
            self[1] + rhs[1],
            self[2] + rhs[2],
            self[3] + rhs[3],
        ])
    }
}

impl<F: VisFloat> AddAssign<Jones<F>> for Jones<F> {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self[0] += rhs[0];
        self[1] += rhs[1];
        self[2] += rhs[2];
        self[3] += rhs[3];
    }
}

impl<F: VisFloat> Sub<Jones<F>> for Jones<F> {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self([
            self[0] - rhs[0],
            self[1] - rhs[1],
            self[2] - rhs[2],
            self[3] - rhs[3],
        ])
    }
}

impl<F: VisFloat> Mul<Jones<F>> for Jones<F> {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self([
            self[0] * rhs[0] + self[1] * rhs[2],
            self[0] * rhs[1] + self[1] * rhs[3],
            self[2] * rhs[0] + self[3] * rhs[2],
            self[2] * rhs[1] + self[3] * rhs[3],
        ])
    }
}

impl<F: VisFloat> MulAssign<Jones<F>> for Jones<F> {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<F: VisFloat> Mul<Complex<F>> for Jones<F> {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Complex<F>) -> Self {
        Self([self[0] * rhs, self[1] * rhs, self[2] * rhs, self[3] * rhs])
    }
}

impl<F: VisFloat> Mul<F> for Jones<F> {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: F) -> Self {
        Self([
            self[0].scale(rhs),
            self[1].scale(rhs),
            self[2].scale(rhs),
            self[3].scale(rhs),
        ])
    }
}

impl<F: VisFloat> Div<F> for Jones<F> {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: F) -> Self {
        Self([
            self[0].unscale(rhs),
            self[1].unscale(rhs),
            self[2].unscale(rhs),
            self[3].unscale(rhs),
        ])
    }
}

#[cfg(test)]
impl<F: VisFloat> approx::AbsDiffEq for Jones<F> {
    type Epsilon = F;

    fn default_epsilon() -> F {
        F::epsilon()
    }

    #[inline]
    fn abs_diff_eq(&self, other: &Self, epsilon: F) -> bool {
        (self[0] - other[0]).norm() <= epsilon
            && (self[1] - other[1]).norm() <= epsilon
            && (self[2] - other[2]).norm() <= epsilon
            && (self[3] - other[3]).norm() <= epsilon
    }
}
