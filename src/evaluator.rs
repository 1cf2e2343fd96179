//! Homomorphic add / sub / multiply, relinearization and rescaling.
//!
//! Every operation mutates its first argument in place and reports
//! parameter, scale and level violations as typed errors instead of
//! producing an undecryptable result.

use log::trace;

use crate::cipher::{Ciphertext, Plaintext};
use crate::error::{HeError, Result};
use crate::keys::RelinKeys;
use crate::params::{ModulusChain, ParmsId};

/// Relative tolerance when comparing operand scales.
const SCALE_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Debug)]
pub struct Evaluator {
    chain: ModulusChain,
}

impl Evaluator {
    pub fn new(chain: ModulusChain) -> Self {
        Self { chain }
    }

    fn same_parms(left: ParmsId, right: ParmsId) -> Result<()> {
        if left != right {
            return Err(HeError::ParamsMismatch { left, right });
        }
        Ok(())
    }

    fn same_scale(left: f64, right: f64) -> Result<()> {
        if (left - right).abs() > SCALE_TOLERANCE * left.abs().max(right.abs()) {
            return Err(HeError::ScaleMismatch { left, right });
        }
        Ok(())
    }

    fn known(&self, id: ParmsId) -> Result<()> {
        if !self.chain.contains(id) {
            return Err(HeError::ParamsMismatch {
                left: id,
                right: self.chain.top_parms_id(),
            });
        }
        Ok(())
    }

    /// a += b
    pub fn add_inplace(&self, a: &mut Ciphertext, b: &Ciphertext) -> Result<()> {
        Self::same_parms(a.parms_id, b.parms_id)?;
        Self::same_scale(a.scale, b.scale)?;
        for (i, bi) in b.components.iter().enumerate() {
            match a.components.get_mut(i) {
                Some(ai) => *ai = &*ai + bi,
                None => a.components.push(bi.clone()),
            }
        }
        Ok(())
    }

    /// a -= b
    pub fn sub_inplace(&self, a: &mut Ciphertext, b: &Ciphertext) -> Result<()> {
        Self::same_parms(a.parms_id, b.parms_id)?;
        Self::same_scale(a.scale, b.scale)?;
        for (i, bi) in b.components.iter().enumerate() {
            match a.components.get_mut(i) {
                Some(ai) => *ai = &*ai - bi,
                None => a.components.push(-bi),
            }
        }
        Ok(())
    }

    pub fn negate_inplace(&self, a: &mut Ciphertext) -> Result<()> {
        for ai in a.components.iter_mut() {
            *ai = -&*ai;
        }
        Ok(())
    }

    pub fn add_plain_inplace(&self, a: &mut Ciphertext, p: &Plaintext) -> Result<()> {
        Self::same_parms(a.parms_id, p.parms_id)?;
        Self::same_scale(a.scale, p.scale)?;
        a.components[0] = &a.components[0] + &p.poly;
        Ok(())
    }

    pub fn sub_plain_inplace(&self, a: &mut Ciphertext, p: &Plaintext) -> Result<()> {
        Self::same_parms(a.parms_id, p.parms_id)?;
        Self::same_scale(a.scale, p.scale)?;
        a.components[0] = &a.components[0] - &p.poly;
        Ok(())
    }

    pub fn multiply_plain_inplace(&self, a: &mut Ciphertext, p: &Plaintext) -> Result<()> {
        Self::same_parms(a.parms_id, p.parms_id)?;
        let scale = a.scale * p.scale;
        self.chain.check_scale(scale, a.parms_id)?;
        for ai in a.components.iter_mut() {
            *ai = &*ai * &p.poly;
        }
        a.scale = scale;
        Ok(())
    }

    /// a *= b. Both operands must be relinearized; the result has three components.
    pub fn multiply_inplace(&self, a: &mut Ciphertext, b: &Ciphertext) -> Result<()> {
        Self::same_parms(a.parms_id, b.parms_id)?;
        for c in [&*a, b] {
            if c.size() != 2 {
                return Err(HeError::NotRelinearized { size: c.size() });
            }
        }
        let scale = a.scale * b.scale;
        self.chain.check_scale(scale, a.parms_id)?;

        let (a0, a1) = (&a.components[0], &a.components[1]);
        let (b0, b1) = (&b.components[0], &b.components[1]);
        let d0 = a0 * b0;
        let d1 = &(a0 * b1) + &(a1 * b0);
        let d2 = a1 * b1;
        a.components = vec![d0, d1, d2];
        a.scale = scale;
        trace!("multiply: level {} scale 2^{:.2}", a.level(), a.scale.log2());
        Ok(())
    }

    pub fn square_inplace(&self, a: &mut Ciphertext) -> Result<()> {
        let b = a.clone();
        self.multiply_inplace(a, &b)
    }

    /// Fold c₂ back into (c₀, c₁) by key switching through the special modulus P.
    pub fn relinearize_inplace(&self, a: &mut Ciphertext, rlk: &RelinKeys) -> Result<()> {
        match a.size() {
            2 => return Ok(()),
            3 => {}
            size => {
                return Err(HeError::InvalidParameters(format!(
                    "cannot relinearize a ciphertext of size {size}"
                )))
            }
        }
        self.known(a.parms_id)?;

        let q = self.chain.modulus(a.parms_id).clone();
        let pq = self.chain.key_switch_modulus(a.parms_id);
        let (rb, ra) = rlk.at(&self.chain, a.parms_id);

        let d2 = a.components[2].with_modulus(&pq);
        let k0 = (&d2 * &rb).div_round(self.chain.special(), q.clone());
        let k1 = (&d2 * &ra).div_round(self.chain.special(), q);

        a.components.truncate(2);
        a.components[0] = &a.components[0] + &k0;
        a.components[1] = &a.components[1] + &k1;
        Ok(())
    }

    /// Divide out q_l: scale shrinks by q_l and one level is consumed.
    pub fn rescale_to_next_inplace(&self, a: &mut Ciphertext) -> Result<()> {
        self.known(a.parms_id)?;
        let (next, bits, factor) = match (
            self.chain.next_parms_id(a.parms_id),
            self.chain.rescale_bits(a.parms_id),
            self.chain.rescale_factor(a.parms_id),
        ) {
            (Some(next), Some(bits), Some(factor)) => (next, bits, factor),
            _ => {
                return Err(HeError::LevelExhausted {
                    level: a.level(),
                    scale: a.scale,
                })
            }
        };
        let q_next = self.chain.modulus(next);
        for ai in a.components.iter_mut() {
            *ai = ai.div_round(&factor, q_next.clone());
        }
        a.scale /= 2f64.powi(bits as i32);
        a.parms_id = next;
        trace!("rescale: level {} scale 2^{:.2}", a.level(), a.scale.log2());
        Ok(())
    }

    /// Rescale repeatedly until `target` is reached.
    pub fn rescale_to_inplace(&self, a: &mut Ciphertext, target: ParmsId) -> Result<()> {
        if target > a.parms_id {
            return Err(HeError::ParamsMismatch {
                left: a.parms_id,
                right: target,
            });
        }
        while a.parms_id != target {
            self.rescale_to_next_inplace(a)?;
        }
        Ok(())
    }

    /// a ← a^power by square-and-multiply, relinearizing after every product.
    /// No rescaling happens, so the scale becomes scale^power.
    pub fn exponentiate_inplace(
        &self,
        a: &mut Ciphertext,
        power: u64,
        rlk: &RelinKeys,
    ) -> Result<()> {
        if power == 0 {
            return Err(HeError::InvalidParameters("exponent must be positive".into()));
        }
        self.relinearize_inplace(a, rlk)?;
        let mut base = a.clone();
        let mut acc: Option<Ciphertext> = None;
        let mut p = power;
        while p > 0 {
            if p & 1 == 1 {
                acc = Some(match acc {
                    None => base.clone(),
                    Some(mut r) => {
                        self.multiply_inplace(&mut r, &base)?;
                        self.relinearize_inplace(&mut r, rlk)?;
                        r
                    }
                });
            }
            p >>= 1;
            if p > 0 {
                self.square_inplace(&mut base)?;
                self.relinearize_inplace(&mut base, rlk)?;
            }
        }
        if let Some(r) = acc {
            *a = r;
        }
        Ok(())
    }
}
