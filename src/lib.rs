//! fheml: encrypted neural-network arithmetic over a leveled CKKS scheme
//!
//! Weight and bias tensors, an x² sigmoid stand-in with its y(1 − y)
//! derivative, and the rescale discipline that keeps every result inside the
//! modulus chain. The scheme underneath is a small single-slot CKKS
//! (power-of-two modulus chain, big-integer coefficients); it is meant for
//! experiments, not for protecting real data.

#![forbid(unsafe_code)]

pub mod error;
pub mod params;
pub mod polynomial;
pub mod sampling;
pub mod cipher;
pub mod encoder;
pub mod keys;
pub mod scheme;
pub mod evaluator;
pub mod context;
pub mod scalar;
pub mod tensor;
pub mod activation;

pub use activation::{
    activate, activate_derivative, activate_derivative_layer, activate_layer, normalize_scale,
    weighted_sum,
};
pub use cipher::{Ciphertext, Plaintext};
pub use context::SchemeContext;
pub use encoder::CkksEncoder;
pub use error::{HeError, Result};
pub use evaluator::Evaluator;
pub use keys::{KeyGenerator, PublicKey, RelinKeys, SecretKey};
pub use params::{CkksParams, ModulusChain, ParmsId};
pub use polynomial::Polynomial;
pub use scalar::{encrypt_constant, random_scalar, uniform_real};
pub use scheme::{Decryptor, Encryptor};
pub use tensor::{
    build_constant_matrix, build_constant_vector, build_random_matrix, EncryptedMatrix,
    EncryptedVector,
};
