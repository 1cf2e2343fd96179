//! Polynomial type over Z_Q[X]/(X^N + 1) with big-integer coefficients.

use std::ops::{Add, Mul, Neg, Sub};

use itertools::iproduct;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

/// f(x) = coeffs[0] + coeffs[1]·x + ... + coeffs[N-1]·x^(N-1)  (always mod `modulus`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial {
    pub coeffs: Vec<BigInt>,
    pub modulus: BigInt,
}

impl Polynomial {
    pub fn new(coeffs: Vec<BigInt>, modulus: BigInt) -> Self {
        assert!(modulus.is_positive(), "modulus must be positive");
        let coeffs = coeffs.into_iter().map(|x| x.mod_floor(&modulus)).collect();
        Self { coeffs, modulus }
    }

    /// Construct zero polynomial of ring degree `n`
    pub fn zero(n: usize, modulus: BigInt) -> Self {
        assert!(n > 0, "ring degree must be positive");
        Self {
            coeffs: vec![BigInt::zero(); n],
            modulus,
        }
    }

    /// `value` in the constant coefficient, zeros elsewhere
    pub fn constant(value: BigInt, n: usize, modulus: BigInt) -> Self {
        let mut p = Self::zero(n, modulus);
        p.coeffs[0] = value.mod_floor(&p.modulus);
        p
    }

    /// Coefficients lifted into (-Q/2, Q/2].
    pub fn centered(&self) -> Vec<BigInt> {
        self.coeffs
            .iter()
            .map(|c| center(c, &self.modulus))
            .collect()
    }

    /// Re-reduce the centered lift under a new modulus.
    ///
    /// Exact when `new_modulus` divides the current one; when it is larger the
    /// small-norm representative is kept.
    pub fn with_modulus(&self, new_modulus: &BigInt) -> Self {
        Self::new(self.centered(), new_modulus.clone())
    }

    /// round(self / divisor), reduced under `new_modulus`.
    pub fn div_round(&self, divisor: &BigInt, new_modulus: BigInt) -> Self {
        let coeffs = self
            .centered()
            .iter()
            .map(|c| div_round(c, divisor))
            .collect();
        Self::new(coeffs, new_modulus)
    }

    pub fn mul_scalar(&self, k: &BigInt) -> Self {
        Self::new(
            self.coeffs.iter().map(|c| c * k).collect(),
            self.modulus.clone(),
        )
    }
}

/// Lift `c ∈ [0, q)` into (-q/2, q/2].
pub fn center(c: &BigInt, q: &BigInt) -> BigInt {
    let c = c.mod_floor(q);
    if (&c << 1u32) > *q {
        c - q
    } else {
        c
    }
}

/// Rounded division, ties toward zero.
pub fn div_round(a: &BigInt, b: &BigInt) -> BigInt {
    let (quo, rem) = a.div_rem(b);
    let twice = (&rem << 1u32).abs();
    if !rem.is_zero() && twice > b.abs() {
        if a.is_negative() == b.is_negative() {
            quo + 1
        } else {
            quo - 1
        }
    } else {
        quo
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: Self) -> Self::Output {
        assert_eq!(self.modulus, rhs.modulus, "modulus mismatch in add");
        assert_eq!(self.coeffs.len(), rhs.coeffs.len(), "degree mismatch in add");
        let coeffs = self
            .coeffs
            .iter()
            .zip(&rhs.coeffs)
            .map(|(a, b)| (a + b).mod_floor(&self.modulus))
            .collect();
        Polynomial {
            coeffs,
            modulus: self.modulus.clone(),
        }
    }
}

impl Add for Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Add<&Polynomial> for Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: &Polynomial) -> Self::Output {
        &self + rhs
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: Self) -> Self::Output {
        assert_eq!(self.modulus, rhs.modulus, "modulus mismatch in sub");
        assert_eq!(self.coeffs.len(), rhs.coeffs.len(), "degree mismatch in sub");
        let coeffs = self
            .coeffs
            .iter()
            .zip(&rhs.coeffs)
            .map(|(a, b)| (a - b).mod_floor(&self.modulus))
            .collect();
        Polynomial {
            coeffs,
            modulus: self.modulus.clone(),
        }
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Sub<&Polynomial> for Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: &Polynomial) -> Self::Output {
        &self - rhs
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Self::Output {
        Polynomial {
            coeffs: self
                .coeffs
                .iter()
                .map(|x| (-x).mod_floor(&self.modulus))
                .collect(),
            modulus: self.modulus.clone(),
        }
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Self::Output {
        -&self
    }
}

impl<'a, 'b> Mul<&'b Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    /// Negacyclic schoolbook product: x^N = -1.
    fn mul(self, rhs: &'b Polynomial) -> Polynomial {
        assert_eq!(self.modulus, rhs.modulus, "moduli must match");
        let n = self.coeffs.len();
        assert_eq!(n, rhs.coeffs.len(), "degree mismatch in mul");

        let mut prod = vec![BigInt::zero(); n];
        for (i, j) in iproduct!(0..n, 0..n) {
            if self.coeffs[i].is_zero() || rhs.coeffs[j].is_zero() {
                continue;
            }
            let term = &self.coeffs[i] * &rhs.coeffs[j];
            let k = i + j;
            if k < n {
                prod[k] += term;
            } else {
                prod[k - n] -= term;
            }
        }
        Polynomial::new(prod, self.modulus.clone())
    }
}

impl<'a> Mul<&'a Polynomial> for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: &'a Polynomial) -> Polynomial {
        (&self).mul(rhs)
    }
}

impl Mul<Polynomial> for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: Polynomial) -> Polynomial {
        (&self).mul(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coeffs: &[i64], q: i64) -> Polynomial {
        Polynomial::new(
            coeffs.iter().map(|&c| BigInt::from(c)).collect(),
            BigInt::from(q),
        )
    }

    fn values(p: &Polynomial) -> Vec<i64> {
        p.coeffs.iter().map(|c| i64::try_from(c).unwrap()).collect()
    }

    #[test]
    fn test_basic_ops() {
        let p1 = poly(&[1, 2, 3, 4], 17);
        let p2 = poly(&[4, 5, 6, 7], 17);

        assert_eq!(values(&(&p1 + &p2)), vec![5, 7, 9, 11]);
        assert_eq!(values(&(&p1 - &p2)), vec![14, 14, 14, 14]);
        assert_eq!(values(&(-p1.clone())), vec![16, 15, 14, 13]);
    }

    #[test]
    fn test_negacyclic_wrap() {
        // x^3 · x = x^4 = -1 in Z[x]/(x^4 + 1)
        let a = poly(&[0, 0, 0, 1], 97);
        let b = poly(&[0, 1, 0, 0], 97);
        assert_eq!(values(&(&a * &b)), vec![96, 0, 0, 0]);
    }

    #[test]
    fn test_mul_small() {
        // (1 + 2x)(3 + x) = 3 + 7x + 2x^2
        let a = poly(&[1, 2, 0, 0], 101);
        let b = poly(&[3, 1, 0, 0], 101);
        assert_eq!(values(&(a * b)), vec![3, 7, 2, 0]);
    }

    #[test]
    fn test_new_reduces_negative() {
        let p = poly(&[-1, -18, 18, 0], 17);
        assert_eq!(values(&p), vec![16, 16, 1, 0]);
    }

    #[test]
    fn test_centered() {
        let p = poly(&[0, 8, 9, 16], 17);
        let c: Vec<i64> = p.centered().iter().map(|c| i64::try_from(c).unwrap()).collect();
        assert_eq!(c, vec![0, 8, -8, -1]);
    }

    #[test]
    fn test_div_round() {
        let b = BigInt::from(4);
        let cases = [(9, 2), (10, 2), (11, 3), (-9, -2), (-11, -3), (0, 0), (2, 0)];
        for (a, expected) in cases {
            assert_eq!(div_round(&BigInt::from(a), &b), BigInt::from(expected), "a = {a}");
        }
    }

    #[test]
    fn test_poly_div_round_and_modulus() {
        // -8 mod 64 = 56, centered -8, /4 -> -2 mod 16 = 14
        let p = poly(&[56, 20, 0, 0], 64);
        let q = p.div_round(&BigInt::from(4), BigInt::from(16));
        assert_eq!(values(&q), vec![14, 5, 0, 0]);

        let widened = poly(&[63, 1, 0, 0], 64).with_modulus(&BigInt::from(1024));
        assert_eq!(values(&widened), vec![1023, 1, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "moduli must match")]
    fn test_mul_modulus_mismatch() {
        let _ = &poly(&[1, 0], 17) * &poly(&[1, 0], 19);
    }
}
