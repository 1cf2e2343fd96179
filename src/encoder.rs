//! Single-slot CKKS encoding: one real in the constant coefficient.

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};

use crate::cipher::Plaintext;
use crate::error::{HeError, Result};
use crate::params::{ModulusChain, ParmsId};
use crate::polynomial::{center, Polynomial};

#[derive(Clone, Debug)]
pub struct CkksEncoder {
    chain: ModulusChain,
    default_scale: f64,
}

impl CkksEncoder {
    pub fn new(chain: ModulusChain, default_scale: f64) -> Self {
        Self {
            chain,
            default_scale,
        }
    }

    pub fn default_scale(&self) -> f64 {
        self.default_scale
    }

    /// Encode at the default scale and the top of the chain.
    pub fn encode(&self, value: f64) -> Result<Plaintext> {
        self.encode_at(value, self.chain.top_parms_id(), self.default_scale)
    }

    /// Encode at a caller-chosen point of the chain and scale, so that the
    /// result can be combined with an existing ciphertext.
    pub fn encode_at(&self, value: f64, parms_id: ParmsId, scale: f64) -> Result<Plaintext> {
        if !self.chain.contains(parms_id) {
            return Err(HeError::ParamsMismatch {
                left: parms_id,
                right: self.chain.top_parms_id(),
            });
        }
        if !value.is_finite() {
            return Err(HeError::InvalidParameters(format!(
                "cannot encode non-finite value {value}"
            )));
        }
        self.chain.check_scale(scale, parms_id)?;

        let scaled = (value * scale).round();
        // one spare bit for the sign
        let modulus_bits = self.chain.modulus_bits(parms_id);
        if scaled != 0.0 && scaled.abs().log2() + 1.0 >= f64::from(modulus_bits) {
            return Err(HeError::ScaleOutOfBounds {
                scale_bits: scale.log2(),
                modulus_bits,
            });
        }
        let m = BigInt::from_f64(scaled).ok_or_else(|| {
            HeError::InvalidParameters(format!("cannot encode {value} at scale {scale}"))
        })?;

        let poly = Polynomial::constant(
            m,
            self.chain.poly_degree,
            self.chain.modulus(parms_id).clone(),
        );
        Ok(Plaintext {
            poly,
            scale,
            parms_id,
        })
    }

    pub fn decode(&self, plain: &Plaintext) -> f64 {
        decode_constant(plain)
    }
}

/// Centered constant coefficient divided by the scale.
pub(crate) fn decode_constant(plain: &Plaintext) -> f64 {
    let c = center(&plain.poly.coeffs[0], &plain.poly.modulus);
    c.to_f64().unwrap_or(f64::NAN) / plain.scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CkksParams;

    fn encoder() -> CkksEncoder {
        let params = CkksParams::toy();
        let chain = ModulusChain::new(&params).unwrap();
        CkksEncoder::new(chain, params.default_scale())
    }

    #[test]
    fn test_encode_decode() {
        let enc = encoder();
        for v in [0.0, 0.5, -0.8, 1234.5678, -1e-6] {
            let pt = enc.encode(v).unwrap();
            assert_eq!(pt.parms_id, ParmsId::new(6));
            assert!((enc.decode(&pt) - v).abs() < 1e-9, "v = {v}");
        }
    }

    #[test]
    fn test_encode_at_matches_params() {
        let enc = encoder();
        let scale = 2f64.powi(80);
        let pt = enc.encode_at(1.0, ParmsId::new(3), scale).unwrap();
        assert_eq!(pt.parms_id, ParmsId::new(3));
        assert_eq!(pt.scale, scale);
        assert_eq!(pt.poly.modulus, BigInt::from(1u8) << 180u32);
        assert_eq!(enc.decode(&pt), 1.0);
    }

    #[test]
    fn test_encode_rejects_oversized_scale() {
        let enc = encoder();
        // Q_0 has 60 bits
        let err = enc.encode_at(1.0, ParmsId::new(0), 2f64.powi(60)).unwrap_err();
        assert!(matches!(err, HeError::ScaleOutOfBounds { .. }));
        // fits the scale but not the value
        let err = enc.encode_at(2f64.powi(20), ParmsId::new(0), 2f64.powi(40)).unwrap_err();
        assert!(matches!(err, HeError::ScaleOutOfBounds { .. }));
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        let enc = encoder();
        assert!(enc.encode(f64::NAN).is_err());
        assert!(enc.encode_at(1.0, ParmsId::new(7), 2f64.powi(40)).is_err());
        assert!(enc.encode_at(1.0, ParmsId::new(2), -1.0).is_err());
    }
}
