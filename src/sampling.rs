//! Randomness for key generation and encryption.
//!
//! - secrets and ephemeral masks: ternary {-1, 0, 1}
//! - errors: rounded gaussian with the configured σ
//! - masks `a`: uniform in Z_Q

use num_bigint::{BigInt, RandBigInt};
use num_traits::Zero;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{HeError, Result};
use crate::polynomial::Polynomial;

/// Each coefficient uniform in {-1, 0, 1}, reduced mod `modulus`.
pub fn sample_ternary<R: Rng>(n: usize, modulus: &BigInt, rng: &mut R) -> Polynomial {
    let coeffs = (0..n)
        .map(|_| BigInt::from(rng.gen_range(-1i32..=1)))
        .collect();
    Polynomial::new(coeffs, modulus.clone())
}

/// Rounded gaussian with standard deviation `std`.
pub fn sample_gaussian<R: Rng>(
    n: usize,
    modulus: &BigInt,
    std: f64,
    rng: &mut R,
) -> Result<Polynomial> {
    let normal = Normal::new(0.0, std)
        .map_err(|e| HeError::InvalidParameters(format!("error distribution: {e}")))?;
    let coeffs = (0..n)
        .map(|_| BigInt::from(normal.sample(rng).round() as i64))
        .collect();
    Ok(Polynomial::new(coeffs, modulus.clone()))
}

/// Uniform polynomial in Z_modulus[X]/(X^N + 1).
pub fn sample_uniform<R: Rng>(n: usize, modulus: &BigInt, rng: &mut R) -> Polynomial {
    let coeffs = (0..n)
        .map(|_| rng.gen_bigint_range(&BigInt::zero(), modulus))
        .collect();
    Polynomial {
        coeffs,
        modulus: modulus.clone(),
    }
}
