//! shroud-sim - split secrets into anonymity sets and measure recovery odds
//!
//! usage:
//!   shroud-sim exact -n 20 -a 150 -b 6 -t 3 -p 50      # exact trustee table and contact curve
//!   shroud-sim simulate --config sim.toml --json       # parallel monte carlo
//!   shroud-sim simulate --trustee-miss-percent 10 --report-percent 5
//!   shroud-sim split -n 10 -a 30 --field gf16          # one distribution round, end to end
//!   shroud-sim exposure --report-probability 0.05      # odds nobody reports a contact
//!
//! logs go to stderr, results to stdout.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use shroud::{FieldBackend, Reconstructor, Secret, SplitParams};
use shroud_odds::{Histogram, MonteCarlo, RecoveryParams, Scheme};
use tracing::{info, warn};

use config::{ParamArgs, SimConfig};

/// shroud-sim - split secrets into anonymity sets and measure recovery odds
#[derive(Parser)]
#[command(name = "shroud-sim")]
#[command(about = "split secrets into anonymity sets and measure recovery odds")]
#[command(version)]
struct Cli {
    /// toml file with default parameters, flags override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// print results as json
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// exact recovery odds by trustees reached and by members contacted
    Exact {
        #[command(flatten)]
        params: ParamArgs,
    },
    /// monte carlo estimate of the recovery distribution
    Simulate {
        #[command(flatten)]
        params: ParamArgs,

        /// independent batches, run in parallel
        #[arg(long)]
        batches: Option<usize>,

        /// trials per batch
        #[arg(long)]
        trials_per_batch: Option<usize>,

        /// base seed, batch b uses stream b
        #[arg(long)]
        seed: Option<u64>,

        /// informed recoverer: per-cent odds a trustee is taken for a decoy
        #[arg(long)]
        trustee_miss_percent: Option<u32>,

        /// informed recoverer: per-cent odds a decoy is taken for a trustee
        #[arg(long)]
        decoy_hit_percent: Option<u32>,

        /// per-cent odds an approached member hands over their packet
        #[arg(long)]
        obtain_percent: Option<u32>,

        /// per-cent odds an approached member reports the attempt
        #[arg(long)]
        report_percent: Option<u32>,
    },
    /// run one split, build and expand round, then recover from the packets
    Split {
        #[command(flatten)]
        params: ParamArgs,

        /// field backend
        #[arg(long, value_enum, default_value = "gf16")]
        field: Field,

        /// seed for a reproducible round, fresh entropy otherwise
        #[arg(long)]
        seed: Option<u64>,
    },
    /// odds that k contacted members all stay silent
    Exposure {
        /// chance each contacted member reports the contact
        #[arg(long, default_value = "0.05")]
        report_probability: f64,

        /// largest k to tabulate
        #[arg(long, default_value = "50")]
        max_contacts: usize,
    },
}

/// field backend selection
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum Field {
    /// GF(2^16) with exp/log tables
    Gf16,
    /// ristretto255 scalars
    Ristretto255,
}

// === reports ===

#[derive(Serialize)]
struct ExactReport {
    params: RecoveryParams,
    scheme: Scheme,
    trustee_cdf: Vec<f64>,
    /// absent for schemes that pick contacts adaptively
    contact_cdf: Option<Vec<f64>>,
}

#[derive(Serialize)]
struct SimulateReport {
    params: RecoveryParams,
    scheme: Scheme,
    monte_carlo: MonteCarlo,
    histogram: Histogram,
    trustee_cdf: Vec<f64>,
    contact_cdf: Vec<f64>,
}

#[derive(Serialize)]
struct SplitReport {
    field: &'static str,
    trustees: usize,
    anonymity: usize,
    decoys: usize,
    max_slots: usize,
    packet_bytes: usize,
    relevant_bytes: usize,
    irrelevant_bytes: usize,
    coordinates: usize,
    /// packets absorbed, in random order, before the secret came back
    recovered_after: Option<usize>,
}

#[derive(Serialize)]
struct ExposureReport {
    report_probability: f64,
    curve: Vec<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shroud_sim=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    info!("shroud-sim v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Command::Exact { params } => {
            let cfg = file.overlay(params.to_config());
            run_exact(&cfg, cli.json)
        }
        Command::Simulate {
            params,
            batches,
            trials_per_batch,
            seed,
            trustee_miss_percent,
            decoy_hit_percent,
            obtain_percent,
            report_percent,
        } => {
            let cfg = file.overlay(SimConfig {
                batches: *batches,
                trials_per_batch: *trials_per_batch,
                seed: *seed,
                trustee_miss_percent: *trustee_miss_percent,
                decoy_hit_percent: *decoy_hit_percent,
                obtain_percent: *obtain_percent,
                report_percent: *report_percent,
                ..params.to_config()
            });
            run_simulate(&cfg, cli.json)
        }
        Command::Split { params, field, seed } => {
            let cfg = file.overlay(SimConfig {
                seed: *seed,
                ..params.to_config()
            });
            match field {
                Field::Gf16 => run_split::<shroud::Gf16>(&cfg, cli.json),
                Field::Ristretto255 => run_split::<shroud::Scalar>(&cfg, cli.json),
            }
        }
        Command::Exposure {
            report_probability,
            max_contacts,
        } => {
            let curve = shroud_odds::exposure_curve(*report_probability, *max_contacts)?;
            let report = ExposureReport {
                report_probability: *report_probability,
                curve,
            };
            if cli.json {
                return print_json(&report);
            }
            println!("contacts  p(no report)");
            for (k, v) in report.curve.iter().enumerate() {
                println!("{k:>8}  {v:.6}");
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to encode report")?;
    println!("{out}");
    Ok(())
}

fn print_params(params: &RecoveryParams, scheme: &Scheme) {
    println!(
        "trustees={} anonymity={} subsecrets={} at={} th={}% scheme={}",
        params.trustees,
        params.anonymity,
        params.subsecrets,
        params.absolute_threshold,
        params.leaf_threshold_percent,
        scheme.name()
    );
}

fn run_exact(cfg: &SimConfig, json: bool) -> Result<()> {
    let params = cfg.params();
    let scheme = cfg.scheme()?;
    let trustee_cdf = shroud_odds::exact_recovery_cdf(&params, &scheme)?;
    let contact_cdf = match shroud_odds::contact_recovery_cdf(&params, &scheme) {
        Ok(curve) => Some(curve),
        Err(shroud_odds::Error::AdaptiveContactOrder) => {
            warn!("no contact curve for the hinted scheme");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let report = ExactReport {
        params,
        scheme,
        trustee_cdf,
        contact_cdf,
    };
    if json {
        return print_json(&report);
    }

    print_params(&report.params, &report.scheme);
    println!("trustees  p(recover)");
    for (t, p) in report.trustee_cdf.iter().enumerate() {
        println!("{t:>8}  {p:.6}");
    }
    if let Some(curve) = &report.contact_cdf {
        println!("contacts  p(recover)");
        for (c, p) in curve.iter().enumerate() {
            println!("{c:>8}  {p:.6}");
        }
    }
    Ok(())
}

fn run_simulate(cfg: &SimConfig, json: bool) -> Result<()> {
    let params = cfg.params();
    let scheme = cfg.scheme()?;
    let monte_carlo = cfg.monte_carlo();
    let histogram = monte_carlo.run(&params, &scheme)?;

    let report = SimulateReport {
        params,
        scheme,
        monte_carlo,
        trustee_cdf: histogram.trustee_cdf(),
        contact_cdf: histogram.contact_cdf(),
        histogram,
    };
    if json {
        return print_json(&report);
    }

    print_params(&report.params, &report.scheme);
    println!(
        "trials={} recovered={}",
        report.histogram.trials,
        report.histogram.recovered()
    );
    println!("trustees  p(recover)");
    for (t, p) in report.trustee_cdf.iter().enumerate() {
        println!("{t:>8}  {p:.6}");
    }
    println!("contacts  p(recover)");
    for (c, p) in report.contact_cdf.iter().enumerate() {
        println!("{c:>8}  {p:.6}");
    }
    Ok(())
}

fn run_split<F: FieldBackend>(cfg: &SimConfig, json: bool) -> Result<()> {
    let params = cfg.params();
    let mut rng = match cfg.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };

    let split_params = SplitParams {
        trustees: params.trustees,
        absolute_threshold: params.absolute_threshold,
        subsecrets: params.subsecrets,
        leaf_threshold_percent: params.leaf_threshold_percent,
    };
    let secret = Secret::<F>::random(&mut rng)?;
    let mut out = shroud::split(&split_params, &secret, &mut rng)?;
    let built = shroud::build_trustee_packets(&secret, &mut out, &mut rng)?;
    let mut set = shroud::expand_to_anonymity_set(built, params.anonymity, &mut out.ledger, &mut rng)?;

    let (relevant_bytes, irrelevant_bytes) = set
        .packets
        .iter()
        .enumerate()
        .map(|(i, p)| set.index.measure(i, p))
        .fold((0, 0), |(r, i), s| (r + s.relevant, i + s.irrelevant));
    let packet_bytes = set.packets.first().map(|p| p.encoded_len()).unwrap_or(0);
    let decoys = set.index.decoy_count();
    let max_slots = set.max_slots;

    // contact everyone in random order until the secret comes back
    set.packets.shuffle(&mut rng);
    let mut rec = Reconstructor::new(out.scheme.clone())?;
    let mut recovered_after = None;
    for packet in set.packets {
        if let Some(found) = rec.absorb(packet)? {
            if found != secret {
                anyhow::bail!("reconstructed secret does not match");
            }
            recovered_after = Some(rec.contacted());
            break;
        }
    }

    let report = SplitReport {
        field: F::NAME,
        trustees: params.trustees,
        anonymity: params.anonymity,
        decoys,
        max_slots,
        packet_bytes,
        relevant_bytes,
        irrelevant_bytes,
        coordinates: out.ledger.len(),
        recovered_after,
    };
    if json {
        return print_json(&report);
    }

    println!(
        "field={} trustees={} anonymity={} decoys={}",
        report.field, report.trustees, report.anonymity, report.decoys
    );
    println!(
        "slots={} packet_bytes={} relevant={} irrelevant={} coordinates={}",
        report.max_slots,
        report.packet_bytes,
        report.relevant_bytes,
        report.irrelevant_bytes,
        report.coordinates
    );
    match report.recovered_after {
        Some(n) => println!("recovered after {n} of {} packets", report.anonymity),
        None => println!("not recovered"),
    }
    Ok(())
}
