//! CKKS plaintext and ciphertext containers.

use crate::params::ParmsId;
use crate::polynomial::Polynomial;

/// Encoded (not encrypted) value, bound to one point of the modulus chain.
#[derive(Clone, Debug)]
pub struct Plaintext {
    pub poly: Polynomial,
    pub scale: f64,
    pub parms_id: ParmsId,
}

/// (c₀, c₁[, c₂]) with Σ cᵢ·sⁱ ≈ scale·m  (mod Q_level)
///
/// `clone()` is the explicit duplication: every clone is an independent
/// ciphertext, so in-place evaluator calls on one never reach another.
#[derive(Clone, Debug)]
pub struct Ciphertext {
    pub(crate) components: Vec<Polynomial>,
    pub(crate) scale: f64,
    pub(crate) parms_id: ParmsId,
}

impl Ciphertext {
    pub(crate) fn new(components: Vec<Polynomial>, scale: f64, parms_id: ParmsId) -> Self {
        Self {
            components,
            scale,
            parms_id,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn parms_id(&self) -> ParmsId {
        self.parms_id
    }

    /// Remaining multiplicative depth (rescales left).
    pub fn level(&self) -> usize {
        self.parms_id.level()
    }

    /// 2 for a fresh or relinearized ciphertext, 3 right after a multiply.
    pub fn size(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[Polynomial] {
        &self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_clone_is_independent() {
        let q = BigInt::from(1u8) << 80u32;
        let c0 = Polynomial::constant(BigInt::from(7), 4, q.clone());
        let c1 = Polynomial::zero(4, q);
        let a = Ciphertext::new(vec![c0, c1], 2f64.powi(40), ParmsId::new(2));

        let mut b = a.clone();
        b.components[0] = -&b.components[0];
        b.parms_id = ParmsId::new(1);

        assert_eq!(a.size(), 2);
        assert_eq!(a.level(), 2);
        assert_eq!(a.components()[0].coeffs[0], BigInt::from(7));
        assert_ne!(a.components()[0], b.components()[0]);
    }
}
