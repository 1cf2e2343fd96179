//! Scalar encryptor: one real in, one fresh ciphertext out.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::cipher::Ciphertext;
use crate::context::SchemeContext;
use crate::error::{HeError, Result};

/// Encode `value` at the default scale and top level, then encrypt it.
pub fn encrypt_constant(ctx: &SchemeContext, value: f64) -> Result<Ciphertext> {
    let plain = ctx.encoder().encode(value)?;
    ctx.encryptor().encrypt(&plain)
}

/// Uniform draw from `[low, high)`.
///
/// Bounds are never swapped: `low >= high`, or a range that is not finite,
/// is reported as [`HeError::InvalidRange`].
pub fn uniform_real<R: Rng>(low: f64, high: f64, rng: &mut R) -> Result<f64> {
    check_range(low, high)?;
    Ok(Uniform::new(low, high).sample(rng))
}

/// One fresh draw from `[low, high)`, encrypted.
pub fn random_scalar<R: Rng>(
    ctx: &SchemeContext,
    low: f64,
    high: f64,
    rng: &mut R,
) -> Result<Ciphertext> {
    let value = uniform_real(low, high, rng)?;
    let plain = ctx.encoder().encode(value)?;
    ctx.encryptor().encrypt_with_rng(&plain, rng)
}

pub(crate) fn check_range(low: f64, high: f64) -> Result<()> {
    if !(low.is_finite() && high.is_finite() && (high - low).is_finite()) || low >= high {
        return Err(HeError::InvalidRange { low, high });
    }
    Ok(())
}
