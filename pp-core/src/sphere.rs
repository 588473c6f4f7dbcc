//! Complex numbers on the Riemann sphere.
//!
//! An `ExtendedComplex` is either a finite complex number or the single, unsigned point at
//! infinity. Arithmetic follows the one-point compactification: `z + oo = oo`, `1/oo = 0`,
//! `1/0 = oo`; the operations that remain undefined (`0 x oo`, `z/0`, `log 0`, ...) return a
//! `DomainError` instead of a value.

use std::{
    f64::consts::{FRAC_PI_2, PI},
    fmt,
    hash::{Hash, Hasher},
};

use crate::error::{ConstructionError, DomainError};

/// Hash written for every infinite value.
const INFINITY_HASH: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Copy, Clone, Debug)]
enum Point {
    Finite { re: f64, im: f64 },
    Infinite,
}

/// A point of the extended complex plane.
///
/// The representation is private: a finite value never carries an undefined (NaN) or infinite
/// component, and any arithmetic result whose squared modulus overflows is absorbed into
/// `ExtendedComplex::INFINITY`.
#[derive(Copy, Clone, Debug)]
pub struct ExtendedComplex(Point);

impl ExtendedComplex {
    /// The point at infinity.
    pub const INFINITY: Self = Self(Point::Infinite);
    pub const ZERO: Self = Self(Point::Finite { re: 0.0, im: 0.0 });
    pub const ONE: Self = Self(Point::Finite { re: 1.0, im: 0.0 });
    pub const I: Self = Self(Point::Finite { re: 0.0, im: 1.0 });

    /// Builds the value `re + i im`.
    ///
    /// Fails if either component is NaN. A value whose squared modulus overflows the `f64` range
    /// silently becomes `INFINITY`.
    pub fn new(re: f64, im: f64) -> Result<Self, ConstructionError> {
        if re.is_nan() || im.is_nan() {
            return Err(ConstructionError::UndefinedComponent { re, im });
        }
        Ok(Self::absorb(re, im))
    }

    /// Builds a real value.
    pub fn from_real(re: f64) -> Result<Self, ConstructionError> {
        Self::new(re, 0.0)
    }

    /// Builds a value from its stored form: components plus the "infinite" flag.
    ///
    /// The flag and the components must agree: an infinite value has NaN components, a finite one
    /// has none.
    pub fn from_parts(re: f64, im: f64, infinite: bool) -> Result<Self, ConstructionError> {
        if infinite {
            if !re.is_nan() || !im.is_nan() {
                return Err(ConstructionError::DefinedInfinite { re, im });
            }
            return Ok(Self::INFINITY);
        }
        Self::new(re, im)
    }

    /// Inverse of `from_parts`.
    pub fn to_parts(&self) -> (f64, f64, bool) {
        match self.0 {
            Point::Finite { re, im } => (re, im, false),
            Point::Infinite => (f64::NAN, f64::NAN, true),
        }
    }

    /// Maps any non-finite result of floating-point arithmetic to the point at infinity.
    pub(crate) fn absorb(re: f64, im: f64) -> Self {
        if !re.is_finite() || !im.is_finite() || (re * re + im * im).is_infinite() {
            Self::INFINITY
        } else {
            Self(Point::Finite { re, im })
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.0, Point::Infinite)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self.0, Point::Finite { re, im } if re == 0.0 && im == 0.0)
    }

    /// The finite components, or None at infinity.
    pub fn finite(&self) -> Option<(f64, f64)> {
        match self.0 {
            Point::Finite { re, im } => Some((re, im)),
            Point::Infinite => None,
        }
    }

    pub fn re(&self) -> Option<f64> {
        self.finite().map(|(re, _)| re)
    }

    pub fn im(&self) -> Option<f64> {
        self.finite().map(|(_, im)| im)
    }

    pub fn add(&self, rhs: &Self) -> Self {
        match (self.0, rhs.0) {
            (Point::Finite { re: a, im: b }, Point::Finite { re: c, im: d }) => {
                Self::absorb(a + c, b + d)
            }
            _ => Self::INFINITY,
        }
    }

    /// Subtraction. The point at infinity is unsigned, so `z - oo = oo`.
    pub fn sub(&self, rhs: &Self) -> Self {
        self.add(&rhs.neg())
    }

    pub fn neg(&self) -> Self {
        match self.0 {
            Point::Finite { re, im } => Self(Point::Finite { re: -re, im: -im }),
            Point::Infinite => Self::INFINITY,
        }
    }

    pub fn mul(&self, rhs: &Self) -> Result<Self, DomainError> {
        match (self.0, rhs.0) {
            (Point::Finite { re: a, im: b }, Point::Finite { re: c, im: d }) => {
                // (a + ib) * (c + id) = (ac - bd) + i(ad + bc)
                Ok(Self::absorb(a * c - b * d, a * d + b * c))
            }
            _ if self.is_zero() || rhs.is_zero() => Err(DomainError::ZeroTimesInfinity),
            _ => Ok(Self::INFINITY),
        }
    }

    pub fn div(&self, rhs: &Self) -> Result<Self, DomainError> {
        if rhs.is_zero() {
            return Err(DomainError::DivisionByZero);
        }
        self.mul(&rhs.inverse())
    }

    /// `1 / z`, with `1/0 = oo` and `1/oo = 0`.
    pub fn inverse(&self) -> Self {
        match self.0 {
            Point::Infinite => Self::ZERO,
            Point::Finite { re, im } => {
                let m = self.modulus();
                if self.is_zero() || (1.0 / m).is_infinite() {
                    return Self::INFINITY;
                }
                Self::absorb(re / m / m, -im / m / m)
            }
        }
    }

    pub fn conjugate(&self) -> Self {
        match self.0 {
            Point::Finite { re, im } => Self(Point::Finite { re, im: -im }),
            Point::Infinite => Self::INFINITY,
        }
    }

    /// Principal argument, in (-pi, pi].
    pub fn argument(&self) -> Result<f64, DomainError> {
        let (re, im) = self.finite().ok_or(DomainError::ArgumentOfInfinity)?;
        if self.is_zero() {
            return Err(DomainError::ArgumentOfZero);
        }
        Ok(if re > 0.0 {
            (im / re).atan()
        } else if re < 0.0 {
            if im >= 0.0 {
                PI + (im / re).atan()
            } else {
                -PI + (im / re).atan()
            }
        } else if im > 0.0 {
            FRAC_PI_2
        } else {
            -FRAC_PI_2
        })
    }

    /// `|z|`; infinite at infinity.
    pub fn modulus(&self) -> f64 {
        match self.0 {
            Point::Finite { re, im } => re.hypot(im),
            Point::Infinite => f64::INFINITY,
        }
    }

    /// `e^z`.
    ///
    /// `exp(oo)` is taken to be `oo`. This is a convention: since the point at infinity is
    /// unsigned, the limit of `e^z` as `|z|` grows depends on the direction of approach.
    pub fn exp(&self) -> Self {
        match self.0 {
            Point::Finite { re, im } => {
                let m = re.exp();
                Self::absorb(m * im.cos(), m * im.sin())
            }
            Point::Infinite => Self::INFINITY,
        }
    }

    /// Principal logarithm; `log(oo) = oo`.
    pub fn ln(&self) -> Result<Self, DomainError> {
        if self.is_zero() {
            return Err(DomainError::LogarithmOfZero);
        }
        if self.is_infinite() {
            return Ok(Self::INFINITY);
        }
        Ok(Self::absorb(self.modulus().ln(), self.argument()?))
    }

    /// Integer power by repeated multiplication.
    ///
    /// `z^0 = 1` for every `z`; negative powers invert the positive one.
    pub fn powi(&self, n: i64) -> Result<Self, DomainError> {
        let mut p = Self::ONE;
        for _ in 0..n.unsigned_abs() {
            p = p.mul(self)?;
        }
        Ok(if n < 0 { p.inverse() } else { p })
    }

    /// `z^alpha = exp(alpha log z)`.
    pub fn pow(&self, exponent: &Self) -> Result<Self, DomainError> {
        if self.is_zero() {
            return Err(DomainError::ZeroToPower);
        }
        if self.is_infinite() {
            if exponent.is_zero() {
                return Err(DomainError::InfinityToZero);
            }
            return Ok(Self::INFINITY);
        }
        Ok(exponent.mul(&self.ln()?)?.exp())
    }

    /// `z^alpha` for a real exponent.
    pub fn powf(&self, exponent: f64) -> Result<Self, DomainError> {
        self.pow(&Self::absorb(exponent, 0.0))
    }
}

impl PartialEq for ExtendedComplex {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Point::Infinite, Point::Infinite) => true,
            (Point::Finite { re: a, im: b }, Point::Finite { re: c, im: d }) => a == c && b == d,
            _ => false,
        }
    }
}

// Finite components are never NaN, so equality is reflexive.
impl Eq for ExtendedComplex {}

impl Hash for ExtendedComplex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.0 {
            Point::Infinite => state.write_u64(INFINITY_HASH),
            Point::Finite { re, im } => {
                // 0.0 == -0.0, so both must hash alike.
                let normalize = |v: f64| if v == 0.0 { 0.0f64 } else { v };
                state.write_u64(normalize(re).to_bits());
                state.write_u64(normalize(im).to_bits());
            }
        }
    }
}

impl fmt::Display for ExtendedComplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (re, im) = match self.0 {
            Point::Infinite => return write!(f, "oo"),
            Point::Finite { re, im } => (re, im),
        };
        match (re == 0.0, im) {
            (true, im) if im == 0.0 => write!(f, "0"),
            (true, im) if im == 1.0 => write!(f, "i"),
            (true, im) if im == -1.0 => write!(f, "-i"),
            (true, im) => write!(f, "{} i", im),
            (false, im) if im == 0.0 => write!(f, "{}", re),
            (false, im) if im > 0.0 => write!(f, "{} + {} i", re, im),
            (false, im) => write!(f, "{} - {} i", re, -im),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn c(re: f64, im: f64) -> ExtendedComplex {
        ExtendedComplex::new(re, im).unwrap()
    }

    fn hash_of(z: &ExtendedComplex) -> u64 {
        let mut h = DefaultHasher::new();
        z.hash(&mut h);
        h.finish()
    }

    fn close(a: &ExtendedComplex, b: &ExtendedComplex) -> bool {
        a.sub(b).modulus() <= 1e-9
    }

    const OO: ExtendedComplex = ExtendedComplex::INFINITY;

    #[test]
    fn test_construction() {
        assert!(matches!(
            ExtendedComplex::new(f64::NAN, 0.0),
            Err(ConstructionError::UndefinedComponent { .. })
        ));
        assert!(matches!(
            ExtendedComplex::from_parts(1.0, f64::NAN, true),
            Err(ConstructionError::DefinedInfinite { .. })
        ));
        assert!(matches!(
            ExtendedComplex::from_parts(f64::NAN, f64::NAN, false),
            Err(ConstructionError::UndefinedComponent { .. })
        ));
        assert_eq!(
            ExtendedComplex::from_parts(f64::NAN, f64::NAN, true).unwrap(),
            OO
        );
        assert_eq!(c(1.0, 2.0).finite(), Some((1.0, 2.0)));
    }

    #[test]
    fn test_overflow_absorbed() {
        assert!(c(1e200, 1e200).is_infinite());
        assert!(c(f64::INFINITY, 0.0).is_infinite());
        assert!(!c(1e150, 0.0).is_infinite());
        // The product is representable, its squared modulus is not.
        let big = c(1e150, 1e150);
        assert!(big.mul(&big).unwrap().is_infinite());
    }

    #[test]
    fn test_infinity_absorbs_addition() {
        for z in [c(0.0, 0.0), c(1.0, -2.0), c(-3.5, 1e10)] {
            assert_eq!(z.add(&OO), OO);
            assert_eq!(OO.add(&z), OO);
            assert_eq!(z.sub(&OO), OO);
            assert_eq!(OO.sub(&z), OO);
        }
        assert_eq!(OO.add(&OO), OO);
    }

    #[test]
    fn test_infinity_times_nonzero() {
        for w in [c(1.0, 0.0), c(0.0, -1e-300), c(-2.0, 3.0), OO] {
            assert_eq!(OO.mul(&w).unwrap(), OO);
            assert_eq!(w.mul(&OO).unwrap(), OO);
        }
    }

    #[test]
    fn test_zero_times_infinity() {
        let zero = ExtendedComplex::ZERO;
        assert_eq!(zero.mul(&OO), Err(DomainError::ZeroTimesInfinity));
        assert_eq!(OO.mul(&zero), Err(DomainError::ZeroTimesInfinity));
    }

    #[test]
    fn test_multiply() {
        // (1 + 2i)(3 - i) = 5 + 5i
        assert_eq!(c(1.0, 2.0).mul(&c(3.0, -1.0)).unwrap(), c(5.0, 5.0));
        assert_eq!(ExtendedComplex::I.mul(&ExtendedComplex::I).unwrap(), c(-1.0, 0.0));
    }

    #[test]
    fn test_inverse_and_division() {
        assert_eq!(OO.inverse(), c(0.0, 0.0));
        assert_eq!(ExtendedComplex::ZERO.inverse(), OO);
        assert!(close(&c(0.0, 2.0).inverse(), &c(0.0, -0.5)));
        assert_eq!(
            c(1.0, 1.0).div(&ExtendedComplex::ZERO),
            Err(DomainError::DivisionByZero)
        );
        assert_eq!(c(1.0, 1.0).div(&OO).unwrap(), ExtendedComplex::ZERO);
        assert_eq!(OO.div(&c(2.0, 0.0)).unwrap(), OO);
        assert_eq!(OO.div(&OO), Err(DomainError::ZeroTimesInfinity));
        assert!(close(&c(5.0, 5.0).div(&c(3.0, -1.0)).unwrap(), &c(1.0, 2.0)));
    }

    #[test]
    fn test_argument() {
        assert!((c(1.0, 2.0).argument().unwrap() - 2f64.atan()).abs() < 1e-12);
        assert!((c(-1.0, 0.0).argument().unwrap() - PI).abs() < 1e-12);
        assert!((c(-1.0, -1.0).argument().unwrap() + 3.0 * PI / 4.0).abs() < 1e-12);
        assert_eq!(c(0.0, 3.0).argument().unwrap(), FRAC_PI_2);
        assert_eq!(c(0.0, -3.0).argument().unwrap(), -FRAC_PI_2);
        assert_eq!(ExtendedComplex::ZERO.argument(), Err(DomainError::ArgumentOfZero));
        assert_eq!(OO.argument(), Err(DomainError::ArgumentOfInfinity));
    }

    #[test]
    fn test_conjugate_and_modulus() {
        assert_eq!(c(1.0, 2.0).conjugate(), c(1.0, -2.0));
        assert_eq!(OO.conjugate(), OO);
        assert_eq!(c(3.0, 4.0).modulus(), 5.0);
        assert_eq!(OO.modulus(), f64::INFINITY);
    }

    #[test]
    fn test_tiny_values() {
        let tiny = c(1e-170, 0.0);
        assert_eq!(tiny.modulus(), 1e-170);
        assert_eq!(c(0.0, -3e-200).modulus(), 3e-200);

        let (re, im) = tiny.ln().unwrap().finite().unwrap();
        assert!((re - 1e-170f64.ln()).abs() < 1e-9);
        assert_eq!(im, 0.0);

        let square = tiny.powf(2.0).unwrap();
        assert!(!square.is_infinite());
        assert!(square.modulus() < 1e-300);
        let (re, _) = tiny.powf(0.5).unwrap().finite().unwrap();
        assert!((re - 1e-85).abs() < 1e-94);

        // The inverse's squared modulus overflows.
        assert!(tiny.inverse().is_infinite());
        let small = c(3e-100, 4e-100);
        assert!(close(&small.inverse().mul(&small).unwrap(), &ExtendedComplex::ONE));
    }

    #[test]
    fn test_exp_and_log() {
        assert_eq!(ExtendedComplex::ZERO.exp(), ExtendedComplex::ONE);
        assert_eq!(OO.exp(), OO);
        assert!(c(800.0, 0.0).exp().is_infinite());
        assert!(close(&c(0.0, PI).exp(), &c(-1.0, 0.0)));
        assert_eq!(ExtendedComplex::ZERO.ln(), Err(DomainError::LogarithmOfZero));
        assert_eq!(OO.ln().unwrap(), OO);
        let z = c(0.3, -1.7);
        assert!(close(&z.ln().unwrap().exp(), &z));
    }

    #[test]
    fn test_powers() {
        let z = c(1.0, 1.0);
        assert_eq!(z.powi(0).unwrap(), ExtendedComplex::ONE);
        assert_eq!(z.powi(2).unwrap(), c(0.0, 2.0));
        assert!(close(&z.powi(-2).unwrap(), &c(0.0, -0.5)));
        assert_eq!(OO.powi(3).unwrap(), OO);
        assert_eq!(ExtendedComplex::ZERO.powi(-1).unwrap(), OO);

        assert!(close(&z.powf(2.0).unwrap(), &c(0.0, 2.0)));
        assert_eq!(ExtendedComplex::ZERO.powf(2.0), Err(DomainError::ZeroToPower));
        assert_eq!(OO.powf(0.0), Err(DomainError::InfinityToZero));
        assert_eq!(OO.pow(&c(0.5, 1.0)).unwrap(), OO);
        // i^i = e^(-pi/2)
        let ii = ExtendedComplex::I.pow(&ExtendedComplex::I).unwrap();
        assert!(close(&ii, &c((-FRAC_PI_2).exp(), 0.0)));
    }

    #[test]
    fn test_equality_and_hash() {
        let a = ExtendedComplex::from_parts(f64::NAN, f64::NAN, true).unwrap();
        let b = c(1e300, 1e300);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(hash_of(&c(0.0, -0.0)), hash_of(&c(-0.0, 0.0)));
        assert_eq!(c(0.0, -0.0), c(-0.0, 0.0));
        assert_ne!(c(1.0, 0.0), OO);
    }

    #[test]
    fn test_display() {
        assert_eq!(OO.to_string(), "oo");
        assert_eq!(c(0.0, 0.0).to_string(), "0");
        assert_eq!(c(0.0, -1.0).to_string(), "-i");
        assert_eq!(c(1.0, 1.2).to_string(), "1 + 1.2 i");
        assert_eq!(c(0.5, -2.0).to_string(), "0.5 - 2 i");
    }
}
