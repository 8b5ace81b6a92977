//! simulation parameters: built-in defaults, then a toml file, then flags

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use serde::Deserialize;
use shroud_odds::{Approach, Knowledge, MonteCarlo, RecoveryParams, Scheme};

/// parent-layer combiner selection
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    /// any AT of the β subsecrets
    #[default]
    Additive,
    /// an upper percentage of the subsecrets
    Thresholded,
    /// AT subsecrets with hint pointers steering contact order
    Hinted,
    /// single-layer, leaf threshold percent of the trustees
    Baseline,
}

/// everything a config file may set
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub trustees: Option<usize>,
    pub anonymity: Option<usize>,
    pub subsecrets: Option<usize>,
    pub absolute_threshold: Option<usize>,
    pub leaf_threshold_percent: Option<u32>,
    pub scheme: Option<SchemeKind>,
    pub upper_threshold_percent: Option<u32>,
    pub hints: Option<usize>,
    pub batches: Option<usize>,
    pub trials_per_batch: Option<usize>,
    pub seed: Option<u64>,
    pub trustee_miss_percent: Option<u32>,
    pub decoy_hit_percent: Option<u32>,
    pub obtain_percent: Option<u32>,
    pub report_percent: Option<u32>,
}

impl SimConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("in {}", path.display()))
    }

    /// fields set in `flags` win over fields set here
    pub fn overlay(self, flags: SimConfig) -> SimConfig {
        SimConfig {
            trustees: flags.trustees.or(self.trustees),
            anonymity: flags.anonymity.or(self.anonymity),
            subsecrets: flags.subsecrets.or(self.subsecrets),
            absolute_threshold: flags.absolute_threshold.or(self.absolute_threshold),
            leaf_threshold_percent: flags.leaf_threshold_percent.or(self.leaf_threshold_percent),
            scheme: flags.scheme.or(self.scheme),
            upper_threshold_percent: flags.upper_threshold_percent.or(self.upper_threshold_percent),
            hints: flags.hints.or(self.hints),
            batches: flags.batches.or(self.batches),
            trials_per_batch: flags.trials_per_batch.or(self.trials_per_batch),
            seed: flags.seed.or(self.seed),
            trustee_miss_percent: flags.trustee_miss_percent.or(self.trustee_miss_percent),
            decoy_hit_percent: flags.decoy_hit_percent.or(self.decoy_hit_percent),
            obtain_percent: flags.obtain_percent.or(self.obtain_percent),
            report_percent: flags.report_percent.or(self.report_percent),
        }
    }

    pub fn params(&self) -> RecoveryParams {
        let trustees = self.trustees.unwrap_or(10);
        RecoveryParams {
            trustees,
            anonymity: self.anonymity.unwrap_or(trustees * 3),
            subsecrets: self.subsecrets.unwrap_or(4),
            absolute_threshold: self.absolute_threshold.unwrap_or(2),
            leaf_threshold_percent: self.leaf_threshold_percent.unwrap_or(50),
        }
    }

    pub fn scheme(&self) -> Result<Scheme> {
        Ok(match self.scheme.unwrap_or_default() {
            SchemeKind::Additive => Scheme::Additive,
            SchemeKind::Thresholded => match self.upper_threshold_percent {
                Some(upper_percent) => Scheme::Thresholded { upper_percent },
                None => bail!("thresholded scheme needs upper_threshold_percent"),
            },
            SchemeKind::Hinted => match self.hints {
                Some(hints) => Scheme::Hinted { hints },
                None => bail!("hinted scheme needs hints"),
            },
            SchemeKind::Baseline => Scheme::Baseline {
                threshold_percent: self.params().leaf_threshold_percent,
            },
        })
    }

    pub fn monte_carlo(&self) -> MonteCarlo {
        let defaults = MonteCarlo::default();
        MonteCarlo {
            batches: self.batches.unwrap_or(defaults.batches),
            trials_per_batch: self.trials_per_batch.unwrap_or(defaults.trials_per_batch),
            seed: self.seed.unwrap_or(defaults.seed),
            approach: self.approach(),
        }
    }

    /// an informed recoverer once either misjudgement rate is set
    pub fn approach(&self) -> Approach {
        let defaults = Approach::default();
        let knowledge = match (self.trustee_miss_percent, self.decoy_hit_percent) {
            (None, None) => None,
            (miss, hit) => Some(Knowledge {
                trustee_miss_percent: miss.unwrap_or(0),
                decoy_hit_percent: hit.unwrap_or(0),
            }),
        };
        Approach {
            knowledge,
            obtain_percent: self.obtain_percent.unwrap_or(defaults.obtain_percent),
            report_percent: self.report_percent.unwrap_or(defaults.report_percent),
        }
    }
}

/// scheme parameter flags shared by every engine subcommand
#[derive(Debug, Clone, Default, Args)]
pub struct ParamArgs {
    /// number of trustees holding genuine shares
    #[arg(short = 'n', long)]
    pub trustees: Option<usize>,

    /// anonymity set size, trustees plus decoys
    #[arg(short, long)]
    pub anonymity: Option<usize>,

    /// number of subsecrets (β)
    #[arg(short = 'b', long)]
    pub subsecrets: Option<usize>,

    /// subsecrets needed for the secret, and shares needed per subsecret (AT)
    #[arg(short = 't', long)]
    pub absolute_threshold: Option<usize>,

    /// leaf threshold as a percentage of a subsecret's shares (TH)
    #[arg(short = 'p', long)]
    pub leaf_threshold_percent: Option<u32>,

    /// parent-layer combiner
    #[arg(long, value_enum)]
    pub scheme: Option<SchemeKind>,

    /// upper threshold percentage for the thresholded scheme
    #[arg(long)]
    pub upper_threshold_percent: Option<u32>,

    /// hint holders for the hinted scheme
    #[arg(long)]
    pub hints: Option<usize>,
}

impl ParamArgs {
    pub fn to_config(&self) -> SimConfig {
        SimConfig {
            trustees: self.trustees,
            anonymity: self.anonymity,
            subsecrets: self.subsecrets,
            absolute_threshold: self.absolute_threshold,
            leaf_threshold_percent: self.leaf_threshold_percent,
            scheme: self.scheme,
            upper_threshold_percent: self.upper_threshold_percent,
            hints: self.hints,
            ..SimConfig::default()
        }
    }
}
