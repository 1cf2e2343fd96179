//! CKKS parameter sets and the modulus chain derived from them.
//!
//! The chain is power-of-two: level `l` uses
//! Q_l = 2^(base_bits + level_bits[0] + ... + level_bits[l-1]),
//! so every rescale divides by an exact power of two and scales stay exact.

use std::path::Path;

use num_bigint::BigInt;
use num_traits::One;
use serde::{Deserialize, Serialize};

use crate::error::{HeError, Result};

/// Identifies a point of the modulus chain (one per level).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParmsId(usize);

impl ParmsId {
    pub fn new(level: usize) -> Self {
        Self(level)
    }

    /// Remaining rescales available from this point.
    pub fn level(self) -> usize {
        self.0
    }
}

fn default_error_std() -> f64 {
    3.2
}

fn default_ceiling_bits() -> u32 {
    64
}

/// User-facing configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CkksParams {
    /// Ring degree N (power of two).
    pub poly_degree: usize,
    /// Bits of the base modulus Q_0.
    pub base_bits: u32,
    /// Bits divided out by each rescale, lowest level first.
    pub level_bits: Vec<u32>,
    /// Bits of the key-switching modulus P. Defaults to the bits of Q_L.
    #[serde(default)]
    pub special_bits: Option<u32>,
    /// Default encoding scale is 2^scale_bits.
    pub scale_bits: u32,
    /// Governor ceiling is 2^scale_ceiling_bits.
    #[serde(default = "default_ceiling_bits")]
    pub scale_ceiling_bits: u32,
    #[serde(default = "default_error_std")]
    pub error_std: f64,
}

impl CkksParams {
    /// Small ring, six 40-bit levels, Δ = 2^40, ceiling 2^64.
    /// Fast enough for tests; not a secure parameter set.
    pub fn toy() -> Self {
        Self {
            poly_degree: 16,
            base_bits: 60,
            level_bits: vec![40; 6],
            special_bits: None,
            scale_bits: 40,
            scale_ceiling_bits: 64,
            error_std: default_error_std(),
        }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poly_degree < 2 || !self.poly_degree.is_power_of_two() {
            return Err(HeError::InvalidParameters(format!(
                "poly_degree must be a power of two >= 2, got {}",
                self.poly_degree
            )));
        }
        if self.level_bits.is_empty() || self.level_bits.contains(&0) {
            return Err(HeError::InvalidParameters(
                "level_bits must be non-empty and positive".into(),
            ));
        }
        let total_bits = self.total_bits()?;
        if self.scale_bits == 0 || self.base_bits <= self.scale_bits {
            return Err(HeError::InvalidParameters(format!(
                "base_bits ({}) must exceed scale_bits ({})",
                self.base_bits, self.scale_bits
            )));
        }
        if self.scale_ceiling_bits < self.scale_bits {
            return Err(HeError::InvalidParameters(format!(
                "scale ceiling 2^{} is below the default scale 2^{}",
                self.scale_ceiling_bits, self.scale_bits
            )));
        }
        if let Some(p) = self.special_bits {
            if p < total_bits {
                return Err(HeError::InvalidParameters(format!(
                    "special_bits ({p}) must cover the top modulus ({total_bits} bits)"
                )));
            }
        }
        if !(self.error_std.is_finite() && self.error_std > 0.0) {
            return Err(HeError::InvalidParameters(format!(
                "error_std must be positive, got {}",
                self.error_std
            )));
        }
        Ok(())
    }

    /// Bits of the top modulus Q_L.
    pub fn total_bits(&self) -> Result<u32> {
        self.level_bits
            .iter()
            .try_fold(self.base_bits, |acc, &b| acc.checked_add(b))
            .ok_or_else(|| HeError::InvalidParameters("modulus bit count overflows u32".into()))
    }

    pub fn default_scale(&self) -> f64 {
        2f64.powi(self.scale_bits as i32)
    }

    pub fn scale_ceiling(&self) -> f64 {
        2f64.powi(self.scale_ceiling_bits as i32)
    }
}

/// Materialized moduli for every level plus the special modulus.
#[derive(Clone, Debug)]
pub struct ModulusChain {
    pub poly_degree: usize,
    /// moduli[l] = Q_l
    moduli: Vec<BigInt>,
    bits: Vec<u32>,
    level_bits: Vec<u32>,
    special: BigInt,
    special_bits: u32,
}

impl ModulusChain {
    pub fn new(params: &CkksParams) -> Result<Self> {
        params.validate()?;
        let mut bits = Vec::with_capacity(params.level_bits.len() + 1);
        let mut acc = params.base_bits;
        bits.push(acc);
        for &b in &params.level_bits {
            acc += b;
            bits.push(acc);
        }
        let moduli = bits.iter().map(|&b| BigInt::one() << b).collect();
        let special_bits = params.special_bits.unwrap_or(acc);
        Ok(Self {
            poly_degree: params.poly_degree,
            moduli,
            bits,
            level_bits: params.level_bits.clone(),
            special: BigInt::one() << special_bits,
            special_bits,
        })
    }

    pub fn max_level(&self) -> usize {
        self.moduli.len() - 1
    }

    pub fn top_parms_id(&self) -> ParmsId {
        ParmsId::new(self.max_level())
    }

    /// Q_l for the given point of the chain.
    pub fn modulus(&self, id: ParmsId) -> &BigInt {
        &self.moduli[id.level()]
    }

    pub fn modulus_bits(&self, id: ParmsId) -> u32 {
        self.bits[id.level()]
    }

    /// Bits of q_l, the factor removed when rescaling away from `id`. `None` at level 0.
    pub fn rescale_bits(&self, id: ParmsId) -> Option<u32> {
        match id.level() {
            0 => None,
            l => Some(self.level_bits[l - 1]),
        }
    }

    pub fn rescale_factor(&self, id: ParmsId) -> Option<BigInt> {
        self.rescale_bits(id).map(|b| BigInt::one() << b)
    }

    /// A scale must be positive, finite and strictly narrower than Q_l.
    pub fn check_scale(&self, scale: f64, id: ParmsId) -> Result<()> {
        let modulus_bits = self.modulus_bits(id);
        let scale_bits = scale.log2();
        if !(scale.is_finite() && scale > 0.0) || scale_bits >= f64::from(modulus_bits) {
            return Err(HeError::ScaleOutOfBounds {
                scale_bits,
                modulus_bits,
            });
        }
        Ok(())
    }

    /// Next point down the chain, `None` at level 0.
    pub fn next_parms_id(&self, id: ParmsId) -> Option<ParmsId> {
        id.level().checked_sub(1).map(ParmsId::new)
    }

    pub fn contains(&self, id: ParmsId) -> bool {
        id.level() <= self.max_level()
    }

    pub fn special(&self) -> &BigInt {
        &self.special
    }

    pub fn special_bits(&self) -> u32 {
        self.special_bits
    }

    /// P·Q_l, the key-switching modulus at this level.
    pub fn key_switch_modulus(&self, id: ParmsId) -> BigInt {
        &self.special * self.modulus(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toy_chain() {
        let params = CkksParams::toy();
        let chain = ModulusChain::new(&params).unwrap();
        assert_eq!(chain.max_level(), 6);
        assert_eq!(chain.modulus_bits(chain.top_parms_id()), 300);
        assert_eq!(chain.modulus_bits(ParmsId::new(0)), 60);
        assert_eq!(chain.special_bits(), 300);
        assert_eq!(
            chain.rescale_factor(ParmsId::new(1)),
            Some(BigInt::one() << 40)
        );
        assert_eq!(chain.rescale_factor(ParmsId::new(0)), None);
        assert_eq!(chain.rescale_bits(ParmsId::new(6)), Some(40));
        assert_eq!(chain.next_parms_id(ParmsId::new(0)), None);
        assert_eq!(chain.next_parms_id(ParmsId::new(4)), Some(ParmsId::new(3)));
    }

    #[test]
    fn test_scales() {
        let params = CkksParams::toy();
        assert_eq!(params.default_scale(), (1u64 << 40) as f64);
        assert_eq!(params.scale_ceiling(), 2f64.powi(64));
    }

    #[test]
    fn test_check_scale() {
        let chain = ModulusChain::new(&CkksParams::toy()).unwrap();
        let bottom = ParmsId::new(0);
        assert!(chain.check_scale(2f64.powi(59), bottom).is_ok());
        assert!(matches!(
            chain.check_scale(2f64.powi(60), bottom),
            Err(HeError::ScaleOutOfBounds { modulus_bits: 60, .. })
        ));
        assert!(chain.check_scale(0.0, bottom).is_err());
        assert!(chain.check_scale(f64::INFINITY, chain.top_parms_id()).is_err());
        assert!(chain.check_scale(2f64.powi(160), chain.top_parms_id()).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_degree() {
        let mut params = CkksParams::toy();
        params.poly_degree = 12;
        assert!(matches!(
            params.validate(),
            Err(HeError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_validate_rejects_small_special() {
        let mut params = CkksParams::toy();
        params.special_bits = Some(100);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "poly_degree": 8,
            "base_bits": 50,
            "level_bits": [30, 30],
            "scale_bits": 30
        }"#;
        let params = CkksParams::from_json(json).unwrap();
        assert_eq!(params.error_std, 3.2);
        assert_eq!(params.scale_ceiling_bits, 64);
        assert_eq!(params.special_bits, None);
        assert_eq!(params.total_bits().unwrap(), 110);
    }

    #[test]
    fn test_validate_rejects_bit_overflow() {
        let json = r#"{
            "poly_degree": 8,
            "base_bits": 50,
            "level_bits": [4294967295, 30],
            "scale_bits": 30
        }"#;
        assert!(matches!(
            CkksParams::from_json(json),
            Err(HeError::InvalidParameters(_))
        ));

        let mut params = CkksParams::toy();
        params.base_bits = u32::MAX;
        assert!(params.total_bits().is_err());
        assert!(ModulusChain::new(&params).is_err());
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            CkksParams::from_json("{ not json"),
            Err(HeError::Config(_))
        ));
        let json = r#"{"poly_degree": 8, "base_bits": 20, "level_bits": [30], "scale_bits": 30}"#;
        assert!(matches!(
            CkksParams::from_json(json),
            Err(HeError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_shape() {
        let params = CkksParams::toy();
        let s = serde_json::to_string(&params).unwrap();
        assert_eq!(CkksParams::from_json(&s).unwrap(), params);
    }
}
