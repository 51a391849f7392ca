use thiserror::Error;

pub type Result<T> = std::result::Result<T, NameGenError>;

/// Failures a generation call can report. All of them are synchronous and
/// deterministic for a given input; a failed call produces no output.
#[derive(Error, Debug)]
pub enum NameGenError {
    /// A seed character, country code, or gender tag that is absent from
    /// its lookup table. Never silently substituted.
    #[error("'{0}' is not a known symbol")]
    UnknownSymbol(String),

    /// The requested maximum length cannot even hold the seed.
    #[error("maximum length {max_len} is shorter than the seed ({seed_len} characters)")]
    InvalidLength { max_len: usize, seed_len: usize },

    /// The model returned a logits vector that doesn't cover the
    /// vocabulary. A collaborator bug, fatal for the call.
    #[error("model returned {actual} logits, expected {expected}")]
    ModelContractViolation { expected: usize, actual: usize },

    #[error(transparent)]
    Model(#[from] candle_core::Error),

    #[error("failed to sample from the candidate distribution: {0}")]
    Sampling(#[from] rand::distr::weighted::Error),
}
