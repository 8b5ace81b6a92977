//! scheme parameters and the recovery predicate they resolve to

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// the abstract shape of one distribution round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryParams {
    /// `nT`
    pub trustees: usize,
    /// `a`, trustees plus decoys
    pub anonymity: usize,
    /// `β`
    pub subsecrets: usize,
    /// `AT`
    pub absolute_threshold: usize,
    /// `TH`
    pub leaf_threshold_percent: u32,
}

impl RecoveryParams {
    pub fn validate(&self) -> Result<()> {
        if self.trustees == 0 {
            return Err(Error::invalid("at least one trustee is required"));
        }
        if self.anonymity < self.trustees {
            return Err(Error::invalid(format!(
                "anonymity set {} smaller than {} trustees",
                self.anonymity, self.trustees
            )));
        }
        if self.absolute_threshold == 0 || self.absolute_threshold > self.subsecrets {
            return Err(Error::invalid(format!(
                "absolute threshold {} outside 1..={}",
                self.absolute_threshold, self.subsecrets
            )));
        }
        check_percent("leaf threshold", self.leaf_threshold_percent)
    }

    /// `m = floor(100·AT / TH)`
    pub fn shares_per_subsecret(&self) -> usize {
        100 * self.absolute_threshold / self.leaf_threshold_percent as usize
    }

    /// `m·β`
    pub fn genuine_shares(&self) -> usize {
        self.shares_per_subsecret() * self.subsecrets
    }

    /// `γ = ceil(m·β / nT)`
    pub fn shares_per_trustee(&self) -> usize {
        self.genuine_shares().div_ceil(self.trustees)
    }

    /// filler slots over all trustees, `nT·γ − m·β`
    pub fn filler(&self) -> usize {
        self.trustees * self.shares_per_trustee() - self.genuine_shares()
    }
}

fn check_percent(what: &str, p: u32) -> Result<()> {
    if p == 0 || p > 100 {
        return Err(Error::invalid(format!("{what} {p}% outside (0, 100]")));
    }
    Ok(())
}

/// parent-layer combiner
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scheme {
    /// any `AT` of the `β` subsecrets
    #[default]
    Additive,
    /// `floor(UT·β/100)` subsecrets
    Thresholded { upper_percent: u32 },
    /// `AT` subsecrets, contacted trustees reveal pointers to `HT` hint holders
    Hinted { hints: usize },
    /// single-layer comparison: a share of trustees, no subsecrets
    Baseline { threshold_percent: u32 },
}

/// a [`Scheme`] resolved against concrete parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// this many recovered subsecrets
    Subsecrets(usize),
    /// this many recovered subsecrets, contact order steered by hints
    Hinted { subsecrets: usize, hints: usize },
    /// this many responding trustees
    Trustees(usize),
}

impl Scheme {
    /// validate against `params` and fix the recovery predicate
    pub fn resolve(&self, params: &RecoveryParams) -> Result<Requirement> {
        params.validate()?;
        match *self {
            Scheme::Additive => Ok(Requirement::Subsecrets(params.absolute_threshold)),
            Scheme::Thresholded { upper_percent } => {
                check_percent("upper threshold", upper_percent)?;
                let k = upper_percent as usize * params.subsecrets / 100;
                if k == 0 {
                    return Err(Error::invalid(format!(
                        "upper threshold {upper_percent}% of {} subsecrets rounds to zero",
                        params.subsecrets
                    )));
                }
                Ok(Requirement::Subsecrets(k))
            }
            Scheme::Hinted { hints } => {
                if hints == 0 || hints > params.trustees {
                    return Err(Error::invalid(format!(
                        "hint count {hints} outside 1..={}",
                        params.trustees
                    )));
                }
                Ok(Requirement::Hinted {
                    subsecrets: params.absolute_threshold,
                    hints,
                })
            }
            Scheme::Baseline { threshold_percent } => {
                check_percent("baseline threshold", threshold_percent)?;
                let k = threshold_percent as usize * params.trustees / 100;
                if k == 0 {
                    return Err(Error::invalid(format!(
                        "baseline threshold {threshold_percent}% of {} trustees rounds to zero",
                        params.trustees
                    )));
                }
                Ok(Requirement::Trustees(k))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scheme::Additive => "additive",
            Scheme::Thresholded { .. } => "thresholded",
            Scheme::Hinted { .. } => "hinted",
            Scheme::Baseline { .. } => "baseline",
        }
    }
}
