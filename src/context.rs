//! Read-only bundle of scheme capabilities threaded through every operation.

use rand::Rng;

use crate::encoder::CkksEncoder;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::keys::{KeyGenerator, RelinKeys, SecretKey};
use crate::params::{CkksParams, ModulusChain};
use crate::scheme::{Decryptor, Encryptor};

/// Encoder, encryptor, evaluator and relinearization keys for one parameter set.
///
/// Nothing in this crate mutates a context after [`SchemeContext::generate`]
/// returns, so a shared reference can be handed to any number of callers.
#[derive(Clone, Debug)]
pub struct SchemeContext {
    params: CkksParams,
    chain: ModulusChain,
    encoder: CkksEncoder,
    encryptor: Encryptor,
    evaluator: Evaluator,
    relin_keys: RelinKeys,
}

impl SchemeContext {
    /// Validate `params`, sample a fresh key set and build the context.
    /// The secret key is handed back separately; the context never holds it.
    pub fn generate<R: Rng>(params: CkksParams, rng: &mut R) -> Result<(Self, SecretKey)> {
        let chain = ModulusChain::new(&params)?;
        let keygen = KeyGenerator::new(&chain, params.error_std, rng);
        let public_key = keygen.public_key(rng)?;
        let relin_keys = keygen.relin_keys(rng)?;
        let secret = keygen.secret_key().clone();

        let ctx = Self {
            encoder: CkksEncoder::new(chain.clone(), params.default_scale()),
            encryptor: Encryptor::new(chain.clone(), public_key, params.error_std),
            evaluator: Evaluator::new(chain.clone()),
            relin_keys,
            chain,
            params,
        };
        Ok((ctx, secret))
    }

    pub fn params(&self) -> &CkksParams {
        &self.params
    }

    pub fn chain(&self) -> &ModulusChain {
        &self.chain
    }

    pub fn encoder(&self) -> &CkksEncoder {
        &self.encoder
    }

    pub fn encryptor(&self) -> &Encryptor {
        &self.encryptor
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn relin_keys(&self) -> &RelinKeys {
        &self.relin_keys
    }

    /// Scale above which the governor rescales before squaring.
    pub fn scale_ceiling(&self) -> f64 {
        self.params.scale_ceiling()
    }

    pub fn decryptor(&self, secret: &SecretKey) -> Decryptor {
        Decryptor::new(self.chain.clone(), secret.clone())
    }
}
