//! Encrypted activation: sigmoid stand-in x ↦ x², its derivative y(1 − y),
//! and the level/scale governor that keeps squaring inside the modulus chain.
//!
//! Every entry point takes its ciphertext by reference and works on a clone,
//! so callers keep their inputs intact.

use log::debug;

use crate::cipher::Ciphertext;
use crate::context::SchemeContext;
use crate::error::{HeError, Result};
use crate::tensor::EncryptedVector;

/// Rescale `ct` until its scale is at or below the context's ceiling.
///
/// Returns the number of rescales performed. Fails with
/// [`HeError::LevelExhausted`] as soon as the ceiling is still exceeded at
/// level 0, so the loop runs at most `level` times.
pub fn normalize_scale(ctx: &SchemeContext, ct: &mut Ciphertext) -> Result<usize> {
    let ceiling = ctx.scale_ceiling();
    let mut steps = 0;
    while ct.scale() > ceiling {
        if ct.level() == 0 {
            return Err(HeError::LevelExhausted {
                level: 0,
                scale: ct.scale(),
            });
        }
        ctx.evaluator().rescale_to_next_inplace(ct)?;
        steps += 1;
        debug!(
            "governor step {steps}: scale 2^{:.2}, level {}",
            ct.scale().log2(),
            ct.level()
        );
    }
    Ok(steps)
}

/// Encrypted activation of a weighted-sum ciphertext.
///
/// relinearize → rescale down to the ceiling → square → relinearize →
/// rescale once. An input `k` rescales above the ceiling comes back `k + 1`
/// levels lower, at scale s²/q where `s` is the scale left by the governor
/// and `q` the factor of the level the square ran at. That lands back on Δ
/// only when s = Δ; otherwise it may sit above the ceiling until the next
/// call normalizes it.
pub fn activate(ctx: &SchemeContext, x: &Ciphertext) -> Result<Ciphertext> {
    let evaluator = ctx.evaluator();
    let rlk = ctx.relin_keys();

    let mut ct = x.clone();
    evaluator.relinearize_inplace(&mut ct, rlk)?;
    let steps = normalize_scale(ctx, &mut ct)?;

    if ct.level() == 0 {
        return Err(HeError::LevelExhausted {
            level: 0,
            scale: ct.scale(),
        });
    }
    evaluator.square_inplace(&mut ct)?;
    evaluator.relinearize_inplace(&mut ct, rlk)?;
    debug!(
        "squared after {steps} rescales: scale 2^{:.2}, level {}",
        ct.scale().log2(),
        ct.level()
    );
    evaluator.rescale_to_next_inplace(&mut ct)?;
    Ok(ct)
}

/// y·(1 − y) for an activated ciphertext `y`.
///
/// The constant 1 is encoded at `y`'s own parameters and scale. The product
/// is relinearized before it is returned; its scale is `y.scale()²` and no
/// level is consumed.
pub fn activate_derivative(ctx: &SchemeContext, y: &Ciphertext) -> Result<Ciphertext> {
    let evaluator = ctx.evaluator();
    let one = ctx.encoder().encode_at(1.0, y.parms_id(), y.scale())?;
    let mut ct = ctx.encryptor().encrypt(&one)?;

    evaluator.sub_inplace(&mut ct, y)?;
    evaluator.multiply_inplace(&mut ct, y)?;
    evaluator.relinearize_inplace(&mut ct, ctx.relin_keys())?;
    debug!(
        "derivative: scale 2^{:.2}, level {}",
        ct.scale().log2(),
        ct.level()
    );
    Ok(ct)
}

/// Σ xᵢ·wᵢ, relinearized but not rescaled.
pub fn weighted_sum(
    ctx: &SchemeContext,
    inputs: &[Ciphertext],
    weights: &[Ciphertext],
) -> Result<Ciphertext> {
    if inputs.len() != weights.len() {
        return Err(HeError::ShapeMismatch(format!(
            "{} inputs against {} weights",
            inputs.len(),
            weights.len()
        )));
    }
    let evaluator = ctx.evaluator();
    let mut terms = inputs.iter().zip(weights).map(|(x, w)| -> Result<Ciphertext> {
        let mut term = x.clone();
        evaluator.multiply_inplace(&mut term, w)?;
        Ok(term)
    });

    let mut acc = match terms.next() {
        Some(first) => first?,
        None => return Err(HeError::ShapeMismatch("empty weighted sum".into())),
    };
    for term in terms {
        evaluator.add_inplace(&mut acc, &term?)?;
    }
    evaluator.relinearize_inplace(&mut acc, ctx.relin_keys())?;
    Ok(acc)
}

/// [`activate`] applied to every cell of a layer.
pub fn activate_layer(ctx: &SchemeContext, xs: &[Ciphertext]) -> Result<EncryptedVector> {
    xs.iter()
        .map(|x| activate(ctx, x))
        .collect::<Result<Vec<_>>>()
        .map(EncryptedVector::from)
}

/// [`activate_derivative`] applied to every cell of a layer.
pub fn activate_derivative_layer(
    ctx: &SchemeContext,
    ys: &[Ciphertext],
) -> Result<EncryptedVector> {
    ys.iter()
        .map(|y| activate_derivative(ctx, y))
        .collect::<Result<Vec<_>>>()
        .map(EncryptedVector::from)
}
