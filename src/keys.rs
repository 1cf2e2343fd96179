//! Key material: ternary secret, RLWE public key and the relinearization key.

use num_bigint::BigInt;
use rand::Rng;

use crate::error::Result;
use crate::params::{ModulusChain, ParmsId};
use crate::polynomial::Polynomial;
use crate::sampling::{sample_gaussian, sample_ternary, sample_uniform};

/// Ternary s, stored under P·Q_L so it can be lifted to any modulus.
#[derive(Clone, Debug)]
pub struct SecretKey {
    pub(crate) s: Polynomial,
}

impl SecretKey {
    /// s reduced under `modulus` (coefficients are small, so this is exact).
    pub(crate) fn at(&self, modulus: &BigInt) -> Polynomial {
        self.s.with_modulus(modulus)
    }
}

/// (b, a) = (-a·s + e, a)  mod Q_L
#[derive(Clone, Debug)]
pub struct PublicKey {
    pub(crate) b: Polynomial,
    pub(crate) a: Polynomial,
}

impl PublicKey {
    pub(crate) fn at(&self, modulus: &BigInt) -> (Polynomial, Polynomial) {
        (self.b.with_modulus(modulus), self.a.with_modulus(modulus))
    }
}

/// (b, a) = (-a·s + e + P·s², a)  mod P·Q_L
#[derive(Clone, Debug)]
pub struct RelinKeys {
    pub(crate) b: Polynomial,
    pub(crate) a: Polynomial,
}

impl RelinKeys {
    /// The key restricted to P·Q_l.
    pub(crate) fn at(&self, chain: &ModulusChain, id: ParmsId) -> (Polynomial, Polynomial) {
        let modulus = chain.key_switch_modulus(id);
        (self.b.with_modulus(&modulus), self.a.with_modulus(&modulus))
    }
}

/// Samples the secret once, then derives the public and relinearization keys from it.
pub struct KeyGenerator<'a> {
    chain: &'a ModulusChain,
    error_std: f64,
    secret: SecretKey,
}

impl<'a> KeyGenerator<'a> {
    pub fn new<R: Rng>(chain: &'a ModulusChain, error_std: f64, rng: &mut R) -> Self {
        let top = chain.key_switch_modulus(chain.top_parms_id());
        let s = sample_ternary(chain.poly_degree, &top, rng);
        Self {
            chain,
            error_std,
            secret: SecretKey { s },
        }
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public_key<R: Rng>(&self, rng: &mut R) -> Result<PublicKey> {
        let n = self.chain.poly_degree;
        let q = self.chain.modulus(self.chain.top_parms_id());
        let s = self.secret.at(q);
        let a = sample_uniform(n, q, rng);
        let e = sample_gaussian(n, q, self.error_std, rng)?;
        let b = e - &(&a * &s);
        Ok(PublicKey { b, a })
    }

    pub fn relin_keys<R: Rng>(&self, rng: &mut R) -> Result<RelinKeys> {
        let n = self.chain.poly_degree;
        let pq = self.chain.key_switch_modulus(self.chain.top_parms_id());
        let s = self.secret.at(&pq);
        let s2 = (&s * &s).mul_scalar(self.chain.special());
        let a = sample_uniform(n, &pq, rng);
        let e = sample_gaussian(n, &pq, self.error_std, rng)?;
        let b = (e - &(&a * &s)) + &s2;
        Ok(RelinKeys { b, a })
    }
}
