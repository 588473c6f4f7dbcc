//! Classical special functions on the Riemann sphere.
//!
//! All of them take and return `ExtendedComplex` values and fail with a `DomainError` where the
//! function, or one of the intermediate operations, is undefined.

use std::{
    f64::consts::{FRAC_PI_2, PI},
    sync::OnceLock,
};

use num::{BigRational, ToPrimitive};

use crate::{error::DomainError, sphere::ExtendedComplex};

type Value = Result<ExtendedComplex, DomainError>;

/// Translation applied to the argument of Gamma before using the asymptotic series.
const GAMMA_SHIFT: u32 = 10;

/// Default number of exact decimals for zeta.
pub const ZETA_DIGITS: u32 = 10;

/// Coefficients of the Stirling series of Gamma (DLMF 5.11.3).
const STIRLING: [f64; 7] = [
    1.0,
    1.0 / 12.0,
    1.0 / 288.0,
    -139.0 / 51840.0,
    -571.0 / 2488320.0,
    163879.0 / 209018880.0,
    5246819.0 / 75246796800.0,
];

/// Number of Bernoulli numbers available to the zeta series.
const BERNOULLI_COUNT: usize = 151;

fn real(x: f64) -> ExtendedComplex {
    ExtendedComplex::absorb(x, 0.0)
}

/// `base^s` for a positive real base.
fn real_pow(base: f64, s: &ExtendedComplex) -> Value {
    Ok(s.mul(&real(base.ln()))?.exp())
}

pub fn identity(z: &ExtendedComplex) -> Value {
    Ok(*z)
}

/// `1 / z`.
pub fn inverse(z: &ExtendedComplex) -> Value {
    Ok(z.inverse())
}

pub fn exp(z: &ExtendedComplex) -> Value {
    Ok(z.exp())
}

pub fn ln(z: &ExtendedComplex) -> Value {
    z.ln()
}

/// Principal branch of the square root.
pub fn sqrt(z: &ExtendedComplex) -> Value {
    if z.is_infinite() {
        return Ok(ExtendedComplex::INFINITY);
    }
    if z.is_zero() {
        return Ok(ExtendedComplex::ZERO);
    }
    let theta = z.argument()? / 2.0;
    let r = z.modulus().sqrt();
    Ok(ExtendedComplex::absorb(r * theta.cos(), r * theta.sin()))
}

/// `cos z = (e^(iz) + e^(-iz)) / 2`
pub fn cos(z: &ExtendedComplex) -> Value {
    let iz = ExtendedComplex::I.mul(z)?;
    iz.exp().add(&iz.neg().exp()).div(&real(2.0))
}

/// `sin z = (e^(iz) - e^(-iz)) / 2i`
pub fn sin(z: &ExtendedComplex) -> Value {
    let iz = ExtendedComplex::I.mul(z)?;
    iz.exp()
        .sub(&iz.neg().exp())
        .div(&ExtendedComplex::absorb(0.0, 2.0))
}

/// The Gamma function.
///
/// On `Re z >= 1/2`, the argument is first shifted right with the functional equation
/// `Gamma(z) = Gamma(z + n) / (z (z + 1) ... (z + n - 1))`, then Gamma(z + n) is approximated by
/// the Stirling series. Elsewhere the reflection formula `Gamma(z) Gamma(1 - z) = pi / sin(pi z)`
/// applies; the poles (zeros of `sin(pi z)`) map to infinity.
///
/// Gamma has an essential singularity at infinity, where it is undefined.
pub fn gamma(z: &ExtendedComplex) -> Value {
    gamma_shifted(z, GAMMA_SHIFT)
}

fn gamma_shifted(z: &ExtendedComplex, n: u32) -> Value {
    let re = z
        .re()
        .ok_or_else(|| DomainError::Undefined("Gamma is not defined at oo".to_string()))?;
    if re < 0.5 {
        let value = gamma_shifted(&ExtendedComplex::ONE.sub(z), n)?;
        let s = sin(&real(PI).mul(z)?)?;
        if s.is_zero() {
            return ExtendedComplex::INFINITY.div(&value);
        }
        return real(PI).div(&s.mul(&value)?);
    }

    let shifted = z.add(&real(n.into()));
    let exponential = shifted.exp().inverse();
    let power = shifted.pow(&shifted)?;
    let root = sqrt(&real(2.0 * PI).div(&shifted)?)?;
    let mut series = ExtendedComplex::ZERO;
    let mut shifted_k = ExtendedComplex::ONE;
    for g in STIRLING {
        series = series.add(&real(g).div(&shifted_k)?);
        shifted_k = shifted_k.mul(&shifted)?;
    }
    let approximation = exponential.mul(&power)?.mul(&root)?.mul(&series)?;

    let mut denominator = ExtendedComplex::ONE;
    for i in 0..n {
        denominator = denominator.mul(&z.add(&real(i.into())))?;
    }
    approximation.div(&denominator)
}

/// Bernoulli numbers B_0 ... B_150, computed exactly (Akiyama-Tanigawa) and then rounded.
///
/// The algorithm yields B_1 = +1/2; only even indices are used.
fn bernoulli() -> &'static [f64] {
    static TABLE: OnceLock<Vec<f64>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut a: Vec<BigRational> = Vec::with_capacity(BERNOULLI_COUNT);
        let mut table = Vec::with_capacity(BERNOULLI_COUNT);
        for m in 0..BERNOULLI_COUNT {
            a.push(BigRational::new(1.into(), (m + 1).into()));
            for j in (1..=m).rev() {
                let diff = &a[j - 1] - &a[j];
                a[j - 1] = diff * BigRational::from_integer(j.into());
            }
            table.push(a[0].to_f64().unwrap_or(f64::NAN));
        }
        table
    })
}

/// The Riemann zeta function, to `ZETA_DIGITS` exact decimals.
pub fn zeta(s: &ExtendedComplex) -> Value {
    zeta_digits(s, ZETA_DIGITS)
}

/// The Riemann zeta function with `digits` exact decimals.
///
/// The computation is reduced to the quadrant `Re s >= 1/2, Im s >= 0` with the functional
/// equation and the symmetry `zeta(conj s) = conj zeta(s)`. By convention `zeta(oo) = 0`.
pub fn zeta_digits(s: &ExtendedComplex, digits: u32) -> Value {
    let (u, t) = match s.finite() {
        Some(parts) => parts,
        None => return Ok(ExtendedComplex::ZERO),
    };
    if u < 0.5 {
        let one_minus_s = ExtendedComplex::ONE.sub(s);
        let two_pow_s = real_pow(2.0, s)?;
        let pi_pow = real_pow(PI, &s.sub(&ExtendedComplex::ONE))?;
        let sine = sin(&s.mul(&real(FRAC_PI_2))?)?;
        let gamma_value = gamma(&one_minus_s)?;
        let reflected = zeta_digits(&one_minus_s, digits)?;
        let product = two_pow_s
            .mul(&pi_pow)
            .and_then(|v| v.mul(&sine))
            .and_then(|v| v.mul(&gamma_value))
            .and_then(|v| v.mul(&reflected));
        return match product {
            Ok(v) => Ok(v),
            // sin(0) x zeta(1): the limit is known.
            Err(_) if s.is_zero() => Ok(real(-0.5)),
            Err(err) => {
                tracing::warn!(%s, %err, "zeta functional equation undefined; using 0");
                Ok(ExtendedComplex::ZERO)
            }
        };
    }
    if t < 0.0 {
        return Ok(zeta_digits(&s.conjugate(), digits)?.conjugate());
    }
    if s.sub(&ExtendedComplex::ONE).is_zero() {
        return Ok(ExtendedComplex::INFINITY);
    }
    zeta_quadrant(s, u, t, digits)
}

/// Euler-Maclaurin summation after H. Cohen and M. Olivier, "Calcul des valeurs de la fonction
/// zeta de Riemann en multiprecision", C. R. Acad. Sci. Paris 314 (1992).
///
/// Valid for `Re s >= 1/2`, `Im s >= 0`, `s != 1`.
fn zeta_quadrant(s: &ExtendedComplex, u: f64, t: f64, digits: u32) -> Value {
    let d = f64::from(digits) * 10f64.ln();
    let modulus = s.modulus();
    let tail_only = || (d / u).exp() * ((modulus / (2.0 * u)).ln() / u).exp();

    // p: number of Bernoulli terms; n: number of terms summed directly.
    let (p, n) = {
        let threshold = if t == 0.0 {
            (d + 0.61 + u * (2.0 * PI / u).ln()) / 2.0
        } else {
            let alpha = d - 0.39 + u * (2.0 * PI).ln() - (u - 1.0) * modulus.ln() - u.ln();
            let gamma = (alpha + u) / t - (u / t).atan();
            // Newton's method for x - atan(x) = gamma.
            let x = if gamma <= 0.0 {
                0.0
            } else {
                let mut x = 1.0f64;
                for _ in 0..10 {
                    x -= (x - gamma - x.atan()) / (1.0 - 1.0 / (1.0 + x * x));
                }
                x
            };
            (1.0 - u + t * x) / 2.0
        };
        if threshold <= 0.0 {
            (0, tail_only().ceil())
        } else {
            let p = threshold.ceil();
            let n = s.add(&real(2.0 * p - 1.0)).modulus() / (2.0 * PI);
            (p as usize, n.ceil())
        }
    };
    let n = n.max(1.0);
    let bernoulli = bernoulli();
    if 2 * p >= bernoulli.len() {
        return Err(DomainError::Undefined(format!(
            "zeta({}) to {} digits needs B_{}",
            s,
            digits,
            2 * p
        )));
    }

    let one = ExtendedComplex::ONE;
    let mut sum = ExtendedComplex::ZERO;
    for k in 1..=(n as u64) {
        sum = sum.add(&real_pow(k as f64, s)?.inverse());
    }
    let s_minus_one = s.sub(&one);
    sum = sum.add(&real_pow(n, &s_minus_one)?.inverse().mul(&s_minus_one.inverse())?);
    sum = sum.add(&real(-0.5).div(&real_pow(n, s)?)?);

    let mut product = *s;
    let mut factorial = 2.0;
    let power = real_pow(n, &s.add(&one))?;
    sum = sum.add(&real(bernoulli[2] / factorial).mul(&product)?.div(&power)?);
    for k in 2..=p {
        let k2 = 2.0 * k as f64;
        product = product
            .mul(&s.add(&real(k2 - 3.0)))?
            .mul(&s.add(&real(k2 - 2.0)))?;
        factorial *= (k2 - 1.0) * k2;
        let power = real_pow(n, &s.add(&real(k2 - 1.0)))?.inverse();
        let term = real(bernoulli[2 * k] / factorial).mul(&product)?.mul(&power)?;
        sum = sum.add(&term);
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-7;

    fn c(re: f64, im: f64) -> ExtendedComplex {
        ExtendedComplex::new(re, im).unwrap()
    }

    fn close(a: &ExtendedComplex, b: &ExtendedComplex, epsilon: f64) -> bool {
        a.sub(b).modulus() <= epsilon
    }

    #[test]
    fn test_elementary() {
        let oo = ExtendedComplex::INFINITY;
        assert_eq!(identity(&c(1.0, 1.2)).unwrap(), c(1.0, 1.2));
        assert_eq!(identity(&oo).unwrap(), oo);
        assert_eq!(sqrt(&ExtendedComplex::ZERO).unwrap(), ExtendedComplex::ZERO);
        assert_eq!(sqrt(&oo).unwrap(), oo);
        let root = sqrt(&c(1.0, 1.0)).unwrap();
        assert!(close(&root.mul(&root).unwrap(), &c(1.0, 1.0), EPSILON));
        assert!(close(&sqrt(&c(-4.0, 0.0)).unwrap(), &c(0.0, 2.0), EPSILON));
    }

    #[test]
    fn test_trigonometric() {
        let oo = ExtendedComplex::INFINITY;
        assert_eq!(cos(&ExtendedComplex::ZERO).unwrap(), ExtendedComplex::ONE);
        assert_eq!(sin(&ExtendedComplex::ZERO).unwrap(), ExtendedComplex::ZERO);
        assert_eq!(cos(&oo).unwrap(), oo);
        assert_eq!(sin(&oo).unwrap(), oo);

        let e = 1f64.exp();
        let (ch, sh) = ((e + 1.0 / e) / 2.0, (e - 1.0 / e) / 2.0);
        let z = c(1.0, 1.0);
        assert!(close(
            &cos(&z).unwrap(),
            &c(ch * 1f64.cos(), -sh * 1f64.sin()),
            EPSILON
        ));
        assert!(close(
            &sin(&z).unwrap(),
            &c(ch * 1f64.sin(), sh * 1f64.cos()),
            EPSILON
        ));
    }

    #[test]
    fn test_gamma() {
        assert_eq!(gamma(&ExtendedComplex::ZERO).unwrap(), ExtendedComplex::INFINITY);
        assert!(close(&gamma(&c(2.0, 0.0)).unwrap(), &c(1.0, 0.0), EPSILON));
        assert!(close(&gamma(&c(4.0, 0.0)).unwrap(), &c(6.0, 0.0), EPSILON));
        assert!(close(
            &gamma(&c(0.5, 0.0)).unwrap(),
            &c(PI.sqrt(), 0.0),
            EPSILON
        ));
        let pole = gamma(&c(-1.0, 0.0)).unwrap();
        assert!(pole.is_infinite() || pole.inverse().modulus() <= EPSILON);
        assert!(gamma(&ExtendedComplex::INFINITY).is_err());
    }

    #[test]
    fn test_gamma_reflection() {
        let z = c(2.0, 1.0);
        let one_minus_z = ExtendedComplex::ONE.sub(&z);
        let g = gamma(&z).unwrap();
        let g_reflected = gamma(&one_minus_z).unwrap();
        assert!(close(&g, &c(0.6529654964, 0.3430658398), EPSILON));
        assert!(close(&g_reflected, &c(-0.1715329199, -0.3264827482), EPSILON));

        let pi_z = real(PI).mul(&z).unwrap();
        let expected = real(PI).div(&sin(&pi_z).unwrap()).unwrap();
        assert!(close(&g.mul(&g_reflected).unwrap(), &expected, EPSILON));
    }

    #[test]
    fn test_bernoulli() {
        let b = bernoulli();
        assert_eq!(b[0], 1.0);
        assert!((b[2] - 1.0 / 6.0).abs() < 1e-15);
        assert!((b[4] + 1.0 / 30.0).abs() < 1e-15);
        assert_eq!(b[3], 0.0);
        assert!((b[20] + 529.1242424242424).abs() < 1e-9);
    }

    #[test]
    fn test_zeta_known_values() {
        let cases = [
            (c(2.0, 0.0), c(1.6449340668482264365, 0.0)),
            (c(4.0, 0.0), c(1.0823232337111381916, 0.0)),
            (c(0.0, 0.0), c(-0.5, 0.0)),
            (c(-2.0, 0.0), c(0.0, 0.0)),
            (c(-4.0, 0.0), c(0.0, 0.0)),
            (c(2.0, 1.0), c(1.15035570325490267, -0.437530865919607881)),
            (c(-1.0, -1.0), c(0.016876151788174814, 0.11415648043238475)),
            (c(0.5, 4.0), c(0.606783764522437269, 0.0911121399725150297)),
            (c(0.5, -4.0), c(0.606783764522437269, -0.0911121399725150297)),
        ];
        for (s, expected) in cases {
            let value = zeta(&s).unwrap();
            assert!(close(&value, &expected, EPSILON), "zeta({}) = {}", s, value);
        }
        assert_eq!(zeta(&c(1.0, 0.0)).unwrap(), ExtendedComplex::INFINITY);
        assert_eq!(
            zeta(&ExtendedComplex::INFINITY).unwrap(),
            ExtendedComplex::ZERO
        );
    }

    #[test]
    fn test_zeta_conjugate_symmetry() {
        let s = c(0.5, 4.0);
        let a = zeta(&s).unwrap();
        let b = zeta(&s.conjugate()).unwrap();
        assert_eq!(a.re(), b.re());
        assert_eq!(a.im().map(|v| -v), b.im());
    }

    #[test]
    fn test_zeta_nontrivial_zeros() {
        let heights = [
            14.134725, 21.022040, 25.010856, 30.424878, 32.935057, 37.586176, 40.918720,
            43.327073, 48.005150, 49.773832,
        ];
        for t in heights {
            let value = zeta(&c(0.5, t)).unwrap();
            assert!(value.modulus() <= 1e-4, "zeta(1/2 + {} i) = {}", t, value);
        }
    }
}
