//! error types for shroud

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// coarse category of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// threshold or count parameters are inconsistent
    Configuration,
    /// the entropy source failed
    Randomness,
    /// field degeneracy: zero inverse, duplicate coordinate, bad interpolation input
    Arithmetic,
    /// decoys or slots cannot be fitted
    Capacity,
}

#[derive(Debug, Error)]
pub enum Error {
    // === configuration errors ===
    #[error("absolute threshold {threshold} exceeds subsecret count {subsecrets}")]
    ThresholdExceedsSubsecrets { threshold: usize, subsecrets: usize },

    #[error("absolute threshold must be at least 1")]
    ZeroThreshold,

    #[error("percentage threshold {0} outside (0, 100]")]
    InvalidPercentage(u32),

    #[error("at least one trustee is required")]
    NoTrustees,

    #[error("at least one subsecret is required")]
    NoSubsecrets,

    #[error("secret has {have} field elements, backend expects {need}")]
    SecretWidth { have: usize, need: usize },

    // === randomness errors ===
    #[error("randomness source failed: {0}")]
    Randomness(String),

    // === arithmetic errors ===
    #[error("zero has no multiplicative inverse")]
    ZeroInverse,

    #[error("x-coordinate zero would expose the constant term")]
    ZeroCoordinate,

    #[error("x-coordinate {0} issued twice")]
    DuplicateCoordinate(u32),

    #[error("not enough points: have {have}, need {need}")]
    NotEnoughPoints { have: usize, need: usize },

    #[error("invalid field element encoding")]
    InvalidEncoding,

    // === capacity errors ===
    #[error("anonymity set of {anonymity} cannot hold {trustees} trustees")]
    AnonymitySetTooSmall { anonymity: usize, trustees: usize },

    #[error("x-coordinate space of {limit} exhausted")]
    CoordinateSpaceExhausted { limit: u32 },

    #[error("trustee packet holds {have} shares, slot count is {slots}")]
    SlotOverflow { have: usize, slots: usize },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ThresholdExceedsSubsecrets { .. }
            | Error::ZeroThreshold
            | Error::InvalidPercentage(_)
            | Error::NoTrustees
            | Error::NoSubsecrets
            | Error::SecretWidth { .. } => ErrorKind::Configuration,
            Error::Randomness(_) => ErrorKind::Randomness,
            Error::ZeroInverse
            | Error::ZeroCoordinate
            | Error::DuplicateCoordinate(_)
            | Error::NotEnoughPoints { .. }
            | Error::InvalidEncoding => ErrorKind::Arithmetic,
            Error::AnonymitySetTooSmall { .. }
            | Error::CoordinateSpaceExhausted { .. }
            | Error::SlotOverflow { .. } => ErrorKind::Capacity,
        }
    }
}

impl From<rand::Error> for Error {
    fn from(e: rand::Error) -> Self {
        Error::Randomness(e.to_string())
    }
}
