// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The elements of Jones fields and visibility buffers.
//!
//! In matrix mode every element is a [`Jones`] matrix; in scalar mode it is a
//! single complex number (i.e. only Stokes I is simulated). Code that
//! evaluates the measurement equation is written once, generic over
//! [`JonesElement`].

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul};

use num_complex::Complex;

use super::{Jones, JonesMode, VisFloat};

/// The Stokes coherency of a source, in Jy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coherency {
    pub i: f64,
    pub q: f64,
    pub u: f64,
    pub v: f64,
}

impl Coherency {
    /// The brightness matrix `[[I+Q, U+iV], [U-iV, I-Q]]`.
    pub fn to_jones(self) -> Jones<f64> {
        Jones::from([
            Complex::new(self.i + self.q, 0.0),
            Complex::new(self.u, self.v),
            Complex::new(self.u, -self.v),
            Complex::new(self.i - self.q, 0.0),
        ])
    }

    pub fn scaled(self, factor: f64) -> Coherency {
        Coherency {
            i: self.i * factor,
            q: self.q * factor,
            u: self.u * factor,
            v: self.v * factor,
        }
    }
}

pub trait JonesElement:
    Copy + Default + Debug + PartialEq + Send + Sync + Add<Output = Self> + AddAssign + 'static
{
    /// The working precision.
    type Float: VisFloat;

    /// The double-precision counterpart that correlation sums are kept in.
    type Wide: Copy + Default + Debug + Send + Sync + AddAssign + Mul<f64, Output = Self::Wide>;

    const MODE: JonesMode;

    /// The number of complex numbers in this element.
    const NUM_COMPONENTS: usize;

    fn identity() -> Self;

    /// Convert a double-precision response matrix. Scalar elements keep only
    /// the XX response.
    fn from_matrix(j: Jones<f64>) -> Self;

    /// Convert a double-precision scalar response. Matrix elements put it on
    /// both diagonals.
    fn from_scalar(g: Complex<f64>) -> Self;

    /// `self · rhs`.
    fn join(self, rhs: Self) -> Self;

    /// Multiply every component by a complex scalar.
    fn scale_by(self, k: Complex<Self::Float>) -> Self;

    /// Multiply every component by a real scalar.
    fn scale_real(self, f: Self::Float) -> Self;

    /// `J_p · B · J_q^H`, evaluated in double precision. In scalar mode, B
    /// is Stokes I.
    fn correlate(jp: Self, brightness: &Coherency, jq: Self) -> Self::Wide;

    fn widen(self) -> Self::Wide;

    fn narrow(w: Self::Wide) -> Self;

    fn components(&self) -> &[Complex<Self::Float>];

    fn components_mut(&mut self) -> &mut [Complex<Self::Float>];
}

impl<F: VisFloat> JonesElement for Complex<F> {
    type Float = F;
    type Wide = Complex<f64>;

    const MODE: JonesMode = JonesMode::Scalar;
    const NUM_COMPONENTS: usize = 1;

    #[inline(always)]
    fn identity() -> Self {
        Complex::new(F::one(), F::zero())
    }

    #[inline(always)]
    fn from_matrix(j: Jones<f64>) -> Self {
        Self::from_scalar(j[0])
    }

    #[inline(always)]
    fn from_scalar(g: Complex<f64>) -> Self {
        Complex::new(F::from_double(g.re), F::from_double(g.im))
    }

    #[inline(always)]
    fn join(self, rhs: Self) -> Self {
        self * rhs
    }

    #[inline(always)]
    fn scale_by(self, k: Complex<F>) -> Self {
        k * self
    }

    #[inline(always)]
    fn scale_real(self, f: F) -> Self {
        self.scale(f)
    }

    #[inline(always)]
    fn correlate(jp: Self, brightness: &Coherency, jq: Self) -> Complex<f64> {
        jp.widen() * jq.widen().conj() * brightness.i
    }

    #[inline(always)]
    fn widen(self) -> Complex<f64> {
        Complex::new(self.re.to_double(), self.im.to_double())
    }

    #[inline(always)]
    fn narrow(w: Complex<f64>) -> Self {
        Self::from_scalar(w)
    }

    fn components(&self) -> &[Complex<F>] {
        std::slice::from_ref(self)
    }

    fn components_mut(&mut self) -> &mut [Complex<F>] {
        std::slice::from_mut(self)
    }
}

impl<F: VisFloat> JonesElement for Jones<F> {
    type Float = F;
    type Wide = Jones<f64>;

    const MODE: JonesMode = JonesMode::Matrix;
    const NUM_COMPONENTS: usize = 4;

    #[inline(always)]
    fn identity() -> Self {
        Jones::identity()
    }

    #[inline(always)]
    fn from_matrix(j: Jones<f64>) -> Self {
        Jones::from_double(j)
    }

    #[inline(always)]
    fn from_scalar(g: Complex<f64>) -> Self {
        Jones::from_double(Jones::diagonal(g))
    }

    #[inline(always)]
    fn join(self, rhs: Self) -> Self {
        self * rhs
    }

    #[inline(always)]
    fn scale_by(self, k: Complex<F>) -> Self {
        self * k
    }

    #[inline(always)]
    fn scale_real(self, f: F) -> Self {
        self * f
    }

    #[inline(always)]
    fn correlate(jp: Self, brightness: &Coherency, jq: Self) -> Jones<f64> {
        (jp.to_double() * brightness.to_jones()).mul_hermitian(&jq.to_double())
    }

    #[inline(always)]
    fn widen(self) -> Jones<f64> {
        self.to_double()
    }

    #[inline(always)]
    fn narrow(w: Jones<f64>) -> Self {
        Jones::from_double(w)
    }

    fn components(&self) -> &[Complex<F>] {
        &self[..]
    }

    fn components_mut(&mut self) -> &mut [Complex<F>] {
        &mut self[..]
    }
}
