//! Encryption & decryption.

use rand::Rng;

use crate::cipher::{Ciphertext, Plaintext};
use crate::encoder::decode_constant;
use crate::error::{HeError, Result};
use crate::keys::{PublicKey, SecretKey};
use crate::params::ModulusChain;
use crate::polynomial::Polynomial;
use crate::sampling::{sample_gaussian, sample_ternary};

/// Public-key encryptor. Holds no mutable state.
#[derive(Clone, Debug)]
pub struct Encryptor {
    chain: ModulusChain,
    public_key: PublicKey,
    error_std: f64,
}

impl Encryptor {
    pub fn new(chain: ModulusChain, public_key: PublicKey, error_std: f64) -> Self {
        Self {
            chain,
            public_key,
            error_std,
        }
    }

    /// Encrypt with the thread-local RNG.
    pub fn encrypt(&self, plain: &Plaintext) -> Result<Ciphertext> {
        self.encrypt_with_rng(plain, &mut rand::thread_rng())
    }

    /// (v·b + e₀ + m, v·a + e₁)  mod Q_l, at the plaintext's level.
    pub fn encrypt_with_rng<R: Rng>(&self, plain: &Plaintext, rng: &mut R) -> Result<Ciphertext> {
        if !self.chain.contains(plain.parms_id) {
            return Err(HeError::ParamsMismatch {
                left: plain.parms_id,
                right: self.chain.top_parms_id(),
            });
        }
        let q = self.chain.modulus(plain.parms_id);
        let n = self.chain.poly_degree;
        let (pk_b, pk_a) = self.public_key.at(q);

        let v = sample_ternary(n, q, rng);
        let e0 = sample_gaussian(n, q, self.error_std, rng)?;
        let e1 = sample_gaussian(n, q, self.error_std, rng)?;

        let m = plain.poly.with_modulus(q);
        let c0 = &(&(&v * &pk_b) + &e0) + &m;
        let c1 = &(&v * &pk_a) + &e1;
        Ok(Ciphertext::new(vec![c0, c1], plain.scale, plain.parms_id))
    }
}

/// Secret-key holder. Only the owner of the network decrypts.
#[derive(Clone, Debug)]
pub struct Decryptor {
    chain: ModulusChain,
    secret: SecretKey,
}

impl Decryptor {
    pub fn new(chain: ModulusChain, secret: SecretKey) -> Self {
        Self { chain, secret }
    }

    /// Σ cᵢ·sⁱ  mod Q_l. Handles un-relinearized ciphertexts too.
    pub fn decrypt(&self, c: &Ciphertext) -> Plaintext {
        let q = self.chain.modulus(c.parms_id);
        let s = self.secret.at(q);

        let mut acc = c.components[0].clone();
        let mut s_pow = s.clone();
        for (i, ci) in c.components.iter().enumerate().skip(1) {
            acc = &acc + &(ci * &s_pow);
            if i + 1 < c.components.len() {
                s_pow = &s_pow * &s;
            }
        }
        Plaintext {
            poly: acc,
            scale: c.scale,
            parms_id: c.parms_id,
        }
    }

    /// Decrypt and decode the single slot.
    pub fn decrypt_value(&self, c: &Ciphertext) -> f64 {
        decode_constant(&self.decrypt(c))
    }

    /// Magnitude of the non-constant coefficients relative to the scale.
    /// The message lives in the constant term, everything else is noise.
    pub fn noise_estimate(&self, c: &Ciphertext) -> f64 {
        let plain = self.decrypt(c);
        let noise = Polynomial {
            coeffs: plain.poly.coeffs[1..].to_vec(),
            modulus: plain.poly.modulus.clone(),
        };
        noise
            .centered()
            .iter()
            .map(|x| num_traits::ToPrimitive::to_f64(x).unwrap_or(f64::INFINITY).abs())
            .fold(0.0, f64::max)
            / c.scale
    }
}
