//! # shroud-odds
//!
//! how many people must be contacted before a shrouded secret can be rebuilt.
//!
//! - [`exact_recovery_cdf`]: exact odds per number of responding trustees,
//!   weighting each share composition by the slot subsets behind it
//! - [`contact_recovery_cdf`]: the same odds per number of contacted
//!   anonymity-set members, through a hypergeometric contact model
//! - [`MonteCarlo`]: parallel sampling for parameter sets too big to count,
//!   optionally with an informed or obstructed recoverer ([`Approach`])
//! - [`exposure_curve`]: odds that k contacted members all stay silent
//!
//! the engine only needs scheme parameters, never shares or packets.

pub mod composition;
pub mod contact;
pub mod error;
pub mod exact;
pub mod exposure;
pub mod montecarlo;
pub mod params;

pub use composition::{binomial, count_all_capped, BoundedCompositionCounter};
pub use contact::{contact_recovery_cdf, FactoredRatio};
pub use error::{Error, ErrorKind, Result};
pub use exact::{exact_recovery_cdf, Weighting};
pub use exposure::exposure_curve;
pub use montecarlo::{Approach, Histogram, Knowledge, MonteCarlo};
pub use params::{RecoveryParams, Requirement, Scheme};
