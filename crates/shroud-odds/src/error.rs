//! error types for shroud-odds

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// coarse category of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// parameters are inconsistent or unsupported
    Configuration,
    /// the sampler could not lay out a batch
    Capacity,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("hinted scheme contacts adaptively, no closed-form contact model")]
    AdaptiveContactOrder,

    #[error("batch layout has {have} slots, expected {need}")]
    Layout { have: usize, need: usize },

    #[error("monte carlo batch {batch} failed: {source}")]
    Batch {
        batch: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParameter(_) | Error::AdaptiveContactOrder => ErrorKind::Configuration,
            Error::Layout { .. } => ErrorKind::Capacity,
            Error::Batch { source, .. } => source.kind(),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }
}
