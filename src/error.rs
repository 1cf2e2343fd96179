//! Error taxonomy shared by the scheme and the neural arithmetic layer.

use thiserror::Error;

use crate::params::ParmsId;

/// Every failure is fatal for the in-flight computation; nothing here is retried.
#[derive(Debug, Error)]
pub enum HeError {
    /// Operands sit at different points of the modulus chain.
    #[error("parameter mismatch: {left:?} vs {right:?}")]
    ParamsMismatch { left: ParmsId, right: ParmsId },

    /// Add/sub operands carry different scales.
    #[error("scale mismatch: {left} vs {right}")]
    ScaleMismatch { left: f64, right: f64 },

    /// A rescale was requested on a ciphertext with no level left.
    #[error("level exhausted: cannot rescale below level {level} (scale {scale})")]
    LevelExhausted { level: usize, scale: f64 },

    /// The scale does not fit in the coefficient modulus at this level.
    #[error("scale out of bounds: 2^{scale_bits:.2} does not fit in a {modulus_bits}-bit modulus")]
    ScaleOutOfBounds { scale_bits: f64, modulus_bits: u32 },

    /// Ciphertext must be relinearized before this operation.
    #[error("ciphertext of size {size} must be relinearized first")]
    NotRelinearized { size: usize },

    /// Empty or non-finite uniform range.
    #[error("invalid range [{low}, {high})")]
    InvalidRange { low: f64, high: f64 },

    /// Operand collections of incompatible shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HeError>;
