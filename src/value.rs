//! Exact complex weights over the ring ℚ[√2, i].
//!
//! Every scalar that arises from the supported gate set can be written as
//! `(a + b√2) + (c + d√2)·i` with rational `a`, `b`, `c`, `d`. A [`Value`]
//! stores exactly that: two [`Irrational`]s (real and imaginary part), each
//! a pair of [`Rational64`]s. No floating point is involved anywhere, so
//! equality of weights is decidable and exact, which is the property the whole
//! canonical-form machinery rests on.
//!
//! All operations are pure: they return a new value and leave their
//! operands untouched. `Rational64` keeps numerator and denominator coprime
//! with a positive denominator after every operation, so componentwise
//! equality is value equality.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_rational::Rational64;
use num_traits::{One, Zero};

/// An element of ℚ[√2]: the number `a + b·√2`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Irrational {
    /// Rational part.
    pub a: Rational64,
    /// Coefficient of √2.
    pub b: Rational64,
}

impl Irrational {
    pub fn new(a: Rational64, b: Rational64) -> Self {
        Self { a, b }
    }

    pub fn from_integer(n: i64) -> Self {
        Self::new(Rational64::from_integer(n), Rational64::zero())
    }

    /// The rational `n/d` (no √2 component).
    pub fn ratio(n: i64, d: i64) -> Self {
        Self::new(Rational64::new(n, d), Rational64::zero())
    }

    /// The number `(n/d)·√2`.
    pub fn sqrt2_ratio(n: i64, d: i64) -> Self {
        Self::new(Rational64::zero(), Rational64::new(n, d))
    }

    /// The number √2.
    pub fn sqrt2() -> Self {
        Self::sqrt2_ratio(1, 1)
    }

    /// Exact sign test: is `a + b·√2 < 0`?
    ///
    /// With mixed-sign components the comparison reduces to `a²` vs `2b²`,
    /// which stays rational.
    pub fn is_negative(&self) -> bool {
        let zero = Rational64::zero();
        match (self.a >= zero, self.b >= zero) {
            (true, true) => false,
            (false, false) => !self.is_zero(),
            // a >= 0, b < 0: negative iff a² < 2b²
            (true, false) => self.a * self.a < self.b * self.b * Rational64::from_integer(2),
            // a < 0, b >= 0: negative iff a² > 2b²
            (false, true) => self.a * self.a > self.b * self.b * Rational64::from_integer(2),
        }
    }
}

impl Add for Irrational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.a + rhs.a, self.b + rhs.b)
    }
}

impl Sub for Irrational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.a - rhs.a, self.b - rhs.b)
    }
}

impl Neg for Irrational {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.a, -self.b)
    }
}

impl Mul for Irrational {
    type Output = Self;

    /// `(a + b√2)(c + d√2) = (ac + 2bd) + (ad + bc)√2`
    fn mul(self, rhs: Self) -> Self {
        let two = Rational64::from_integer(2);
        Self::new(
            self.a * rhs.a + two * self.b * rhs.b,
            self.a * rhs.b + self.b * rhs.a,
        )
    }
}

impl Div for Irrational {
    type Output = Self;

    /// Multiplication by the conjugate `c - d√2` over `c² - 2d²`.
    ///
    /// A zero numerator yields zero without touching the divisor. A zero
    /// divisor otherwise is a programmer error.
    fn div(self, rhs: Self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        assert!(!rhs.is_zero(), "division of {} by zero", self);
        let two = Rational64::from_integer(2);
        // c² - 2d² = 0 only when c = d = 0, since √2 is irrational
        let q = rhs.a * rhs.a - two * rhs.b * rhs.b;
        Self::new(
            (self.a * rhs.a - two * self.b * rhs.b) / q,
            (self.b * rhs.a - self.a * rhs.b) / q,
        )
    }
}

impl Zero for Irrational {
    fn zero() -> Self {
        Self::new(Rational64::zero(), Rational64::zero())
    }

    fn is_zero(&self) -> bool {
        self.a.is_zero() && self.b.is_zero()
    }
}

impl One for Irrational {
    fn one() -> Self {
        Self::from_integer(1)
    }
}

fn write_sqrt2(f: &mut fmt::Formatter<'_>, b: Rational64) -> fmt::Result {
    if b == Rational64::from_integer(1) {
        write!(f, "√2")
    } else if b == Rational64::from_integer(-1) {
        write!(f, "-√2")
    } else if b.is_integer() {
        write!(f, "{}√2", b)
    } else {
        write!(f, "({})√2", b)
    }
}

impl fmt::Display for Irrational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.b.is_zero() {
            write!(f, "{}", self.a)
        } else if self.a.is_zero() {
            write_sqrt2(f, self.b)
        } else if self.b > Rational64::zero() {
            write!(f, "{}+", self.a)?;
            write_sqrt2(f, self.b)
        } else {
            write!(f, "{}-", self.a)?;
            write_sqrt2(f, -self.b)
        }
    }
}

/// An exact complex weight: `re + im·i` with both parts in ℚ[√2].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Value {
    pub re: Irrational,
    pub im: Irrational,
}

impl Value {
    pub fn new(re: Irrational, im: Irrational) -> Self {
        Self { re, im }
    }

    pub fn from_integer(n: i64) -> Self {
        Self::new(Irrational::from_integer(n), Irrational::zero())
    }

    /// The value 0.
    pub fn zero() -> Self {
        Zero::zero()
    }

    /// The value 1.
    pub fn one() -> Self {
        One::one()
    }

    /// The imaginary unit i.
    pub fn i() -> Self {
        Self::new(Irrational::zero(), Irrational::one())
    }

    /// The value √2.
    pub fn sqrt2() -> Self {
        Self::new(Irrational::sqrt2(), Irrational::zero())
    }
}

impl Add for Value {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Value {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Neg for Value {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl Mul for Value {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Div for Value {
    type Output = Self;

    /// `(a + bi)/(c + di) = ((ac + bd) + (bc - ad)i) / (c² + d²)`
    ///
    /// A zero numerator yields zero without touching the divisor. A zero
    /// divisor otherwise is a programmer error.
    fn div(self, rhs: Self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        assert!(!rhs.is_zero(), "division of {} by zero", self);
        // c² + d² = 0 only when c = d = 0 (both are real)
        let q = rhs.re * rhs.re + rhs.im * rhs.im;
        Self::new(
            (self.re * rhs.re + self.im * rhs.im) / q,
            (self.im * rhs.re - self.re * rhs.im) / q,
        )
    }
}

impl Zero for Value {
    fn zero() -> Self {
        Self::new(Irrational::zero(), Irrational::zero())
    }

    fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }
}

impl One for Value {
    fn one() -> Self {
        Self::new(Irrational::one(), Irrational::zero())
    }
}

fn write_imaginary(f: &mut fmt::Formatter<'_>, im: Irrational) -> fmt::Result {
    if im == Irrational::one() {
        write!(f, "i")
    } else if im == -Irrational::one() {
        write!(f, "-i")
    } else if im.b.is_zero() && im.a.is_integer() {
        write!(f, "{}i", im.a)
    } else if im.a.is_zero() && im.b == Rational64::from_integer(1) {
        write!(f, "√2i")
    } else if im.a.is_zero() && im.b == Rational64::from_integer(-1) {
        write!(f, "-√2i")
    } else {
        write!(f, "({})i", im)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im.is_zero() {
            write!(f, "{}", self.re)
        } else if self.re.is_zero() {
            write_imaginary(f, self.im)
        } else if self.im.is_negative() {
            write!(f, "{}-", self.re)?;
            write_imaginary(f, -self.im)
        } else {
            write!(f, "{}+", self.re)?;
            write_imaginary(f, self.im)
        }
    }
}
