//! parallel monte carlo estimate of the recovery distribution
//!
//! each batch lays the genuine shares out over the trustees once, then runs
//! its trials against that layout with a private rng stream. batches share
//! nothing and their histograms are summed after all of them finish, so the
//! result does not depend on completion order.
//!
//! an [`Approach`] models a recoverer who is not neutral: one with a noisy
//! guess of who the trustees are, and members who may withhold their packet
//! or report the attempt.

use std::collections::VecDeque;

use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::params::{RecoveryParams, Requirement, Scheme};
use crate::{Error, Result};

/// recovery counts by trustees reached and by people contacted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    /// index is the number of trustees contacted at the moment of recovery
    pub by_trustees: Vec<u64>,
    /// index is the number of people contacted at the moment of recovery
    pub by_contacts: Vec<u64>,
    pub trials: u64,
}

impl Histogram {
    pub fn new(trustees: usize, anonymity: usize) -> Self {
        Self {
            by_trustees: vec![0; trustees + 1],
            by_contacts: vec![0; anonymity + 1],
            trials: 0,
        }
    }

    /// one finished trial, `None` if it never recovered
    pub fn record(&mut self, outcome: Option<(usize, usize)>) {
        self.trials += 1;
        if let Some((trustees, contacts)) = outcome {
            self.by_trustees[trustees] += 1;
            self.by_contacts[contacts] += 1;
        }
    }

    pub fn merge(&mut self, other: &Histogram) {
        for (a, b) in self.by_trustees.iter_mut().zip(&other.by_trustees) {
            *a += b;
        }
        for (a, b) in self.by_contacts.iter_mut().zip(&other.by_contacts) {
            *a += b;
        }
        self.trials += other.trials;
    }

    pub fn recovered(&self) -> u64 {
        self.by_trustees.iter().sum()
    }

    /// fraction of trials recovered with at most `t` trustees
    pub fn trustee_cdf(&self) -> Vec<f64> {
        cumulative(&self.by_trustees, self.trials)
    }

    /// fraction of trials recovered with at most `c` contacts
    pub fn contact_cdf(&self) -> Vec<f64> {
        cumulative(&self.by_contacts, self.trials)
    }
}

fn cumulative(bins: &[u64], trials: u64) -> Vec<f64> {
    if trials == 0 {
        return vec![0.0; bins.len()];
    }
    let mut running = 0u64;
    bins.iter()
        .map(|&b| {
            running += b;
            running as f64 / trials as f64
        })
        .collect()
}

/// who holds which subsecrets, fixed for one batch
struct Layout {
    /// subsecret id of each genuine share, per trustee
    holdings: Vec<Vec<usize>>,
    /// hint holder each trustee points to, empty unless hinted
    pointers: Vec<usize>,
}

impl Layout {
    fn build(params: &RecoveryParams, requirement: Requirement, rng: &mut ChaCha20Rng) -> Result<Self> {
        let gamma = params.shares_per_trustee();
        let m = params.shares_per_subsecret();
        let need = params.trustees * gamma;

        let mut slots: Vec<Option<usize>> = (0..params.subsecrets)
            .flat_map(|s| std::iter::repeat(Some(s)).take(m))
            .chain(std::iter::repeat(None).take(params.filler()))
            .collect();
        if slots.len() != need || gamma == 0 {
            return Err(Error::Layout {
                have: slots.len(),
                need,
            });
        }
        slots.shuffle(rng);

        let holdings = slots
            .chunks(gamma)
            .map(|c| c.iter().flatten().copied().collect())
            .collect();

        let pointers = match requirement {
            Requirement::Hinted { hints, .. } => {
                if hints == 0 || hints > params.trustees {
                    return Err(Error::invalid(format!("{hints} hint holders")));
                }
                let holders = index::sample(rng, params.trustees, hints).into_vec();
                // a lone holder points at itself; it is already contacted by
                // the time it reveals, so its hint queues nobody
                (0..params.trustees)
                    .map(|i| {
                        let h = holders[i % hints];
                        if h == i {
                            holders[(i + 1) % hints]
                        } else {
                            h
                        }
                    })
                    .collect()
            }
            _ => Vec::new(),
        };

        Ok(Self { holdings, pointers })
    }

    /// approach people in `order`; returns (trustees, contacts) at recovery
    fn walk(
        &self,
        order: &[usize],
        params: &RecoveryParams,
        requirement: Requirement,
        responses: &Responses,
    ) -> Option<(usize, usize)> {
        let at = params.absolute_threshold;
        let mut counts = vec![0usize; params.subsecrets];
        let (mut recovered, mut trustees, mut contacts) = (0, 0, 0);

        for &person in order {
            if !responses.withheld[person] {
                contacts += 1;
                // trustees are people 0..nT, everyone else holds nothing
                if let Some(held) = self.holdings.get(person) {
                    trustees += 1;
                    for &s in held {
                        counts[s] += 1;
                        if counts[s] == at {
                            recovered += 1;
                        }
                    }
                }
                let done = match requirement {
                    Requirement::Subsecrets(k) | Requirement::Hinted { subsecrets: k, .. } => recovered >= k,
                    Requirement::Trustees(k) => trustees >= k,
                };
                if done {
                    return Some((trustees, contacts));
                }
            }
            if responses.reported[person] {
                return None;
            }
        }
        None
    }

    /// like `walk`, but revealed hints jump the queue
    fn hinted_walk(
        &self,
        order: &[usize],
        params: &RecoveryParams,
        k: usize,
        responses: &Responses,
    ) -> Option<(usize, usize)> {
        let at = params.absolute_threshold;
        let nt = params.trustees;
        let mut counts = vec![0usize; params.subsecrets];
        let mut helpers: Vec<Vec<usize>> = vec![Vec::new(); params.subsecrets];
        let mut contacted = vec![false; params.anonymity];
        let mut revealed = vec![false; nt];
        let mut queue = VecDeque::new();
        let mut rest = order.iter();

        let (mut recovered, mut trustees, mut contacts) = (0, 0, 0);
        let mut reveals = Vec::new();

        loop {
            let person = match queue.pop_front() {
                Some(p) => p,
                None => match rest.by_ref().find(|&&p| !contacted[p]) {
                    Some(&p) => p,
                    None => return None,
                },
            };
            if contacted[person] {
                continue;
            }
            contacted[person] = true;

            if !responses.withheld[person] {
                contacts += 1;
                if person < nt {
                    trustees += 1;
                    for &s in &self.holdings[person] {
                        if counts[s] >= at {
                            reveals.push(person);
                            continue;
                        }
                        counts[s] += 1;
                        helpers[s].push(person);
                        if counts[s] == at {
                            recovered += 1;
                            reveals.extend_from_slice(&helpers[s]);
                        }
                    }
                }

                for t in reveals.drain(..) {
                    if !revealed[t] {
                        revealed[t] = true;
                        let target = self.pointers[t];
                        if !contacted[target] {
                            queue.push_back(target);
                        }
                    }
                }

                if recovered >= k {
                    return Some((trustees, contacts));
                }
            }
            if responses.reported[person] {
                return None;
            }
        }
    }
}

/// per-trial member reactions, indexed by person
struct Responses {
    withheld: Vec<bool>,
    reported: Vec<bool>,
}

impl Responses {
    fn new(people: usize) -> Self {
        Self {
            withheld: vec![false; people],
            reported: vec![false; people],
        }
    }

    /// reroll for one trial; cooperative members draw nothing from `rng`
    fn roll(&mut self, approach: &Approach, rng: &mut ChaCha20Rng) {
        if approach.obtain_percent < 100 {
            for w in &mut self.withheld {
                *w = rng.gen_range(0..100) >= approach.obtain_percent;
            }
        }
        if approach.report_percent > 0 {
            for r in &mut self.reported {
                *r = rng.gen_range(0..100) < approach.report_percent;
            }
        }
    }
}

/// the recoverer's noisy guess of who the trustees are
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knowledge {
    /// per-cent odds a trustee is taken for a decoy
    pub trustee_miss_percent: u32,
    /// per-cent odds a decoy is taken for a trustee
    pub decoy_hit_percent: u32,
}

impl Knowledge {
    /// suspected trustees first, then everyone else, each group shuffled
    fn arrange(&self, trustees: usize, order: &mut Vec<usize>, later: &mut Vec<usize>, rng: &mut ChaCha20Rng) {
        let people = order.len();
        order.clear();
        later.clear();
        for person in 0..people {
            let (is_trustee, flip) = if person < trustees {
                (true, self.trustee_miss_percent)
            } else {
                (false, self.decoy_hit_percent)
            };
            if is_trustee != (rng.gen_range(0..100) < flip) {
                order.push(person);
            } else {
                later.push(person);
            }
        }
        order.shuffle(rng);
        later.shuffle(rng);
        order.extend_from_slice(later);
    }
}

/// how the recoverer works through the anonymity set
///
/// the default approaches everyone in uniformly random order and every
/// member hands their packet over. a member who reports the attempt ends the
/// trial unrecovered, after their own packet (if handed over) is counted.
/// members who withhold are not counted as contacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Approach {
    /// guess of the trustees, `None` for uniformly random order
    pub knowledge: Option<Knowledge>,
    /// per-cent odds an approached member hands over their packet
    pub obtain_percent: u32,
    /// per-cent odds an approached member reports the attempt
    pub report_percent: u32,
}

impl Default for Approach {
    fn default() -> Self {
        Self {
            knowledge: None,
            obtain_percent: 100,
            report_percent: 0,
        }
    }
}

impl Approach {
    pub fn validate(&self) -> Result<()> {
        let mut odds = vec![("obtain", self.obtain_percent), ("report", self.report_percent)];
        if let Some(k) = self.knowledge {
            odds.push(("trustee miss", k.trustee_miss_percent));
            odds.push(("decoy hit", k.decoy_hit_percent));
        }
        for (what, p) in odds {
            if p > 100 {
                return Err(Error::invalid(format!("{what} odds {p}% above 100%")));
            }
        }
        Ok(())
    }
}

/// batch configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonteCarlo {
    pub batches: usize,
    pub trials_per_batch: usize,
    pub seed: u64,
    #[serde(default)]
    pub approach: Approach,
}

impl Default for MonteCarlo {
    fn default() -> Self {
        Self {
            batches: 10,
            trials_per_batch: 10_000,
            seed: 0,
            approach: Approach::default(),
        }
    }
}

impl MonteCarlo {
    /// run every batch and sum the histograms; any failing batch aborts
    pub fn run(&self, params: &RecoveryParams, scheme: &Scheme) -> Result<Histogram> {
        let requirement = scheme.resolve(params)?;
        if self.batches == 0 || self.trials_per_batch == 0 {
            return Err(Error::invalid("monte carlo needs at least one batch and one trial"));
        }
        self.approach.validate()?;

        info!(
            scheme = scheme.name(),
            batches = self.batches,
            trials_per_batch = self.trials_per_batch,
            informed = self.approach.knowledge.is_some(),
            obtain_percent = self.approach.obtain_percent,
            report_percent = self.approach.report_percent,
            "monte carlo start"
        );

        let run_one = |b: usize| {
            self.run_batch(b, params, requirement).map_err(|e| Error::Batch {
                batch: b,
                source: Box::new(e),
            })
        };

        #[cfg(feature = "parallel")]
        let parts: Vec<Histogram> = {
            use rayon::prelude::*;
            (0..self.batches)
                .into_par_iter()
                .map(run_one)
                .collect::<Result<Vec<_>>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let parts: Vec<Histogram> = (0..self.batches).map(run_one).collect::<Result<Vec<_>>>()?;

        let mut total = Histogram::new(params.trustees, params.anonymity);
        for part in &parts {
            total.merge(part);
        }

        info!(
            trials = total.trials,
            recovered = total.recovered(),
            "monte carlo done"
        );
        Ok(total)
    }

    fn run_batch(&self, batch: usize, params: &RecoveryParams, requirement: Requirement) -> Result<Histogram> {
        let mut rng = ChaCha20Rng::seed_from_u64(self.seed);
        rng.set_stream(batch as u64);

        let layout = Layout::build(params, requirement, &mut rng)?;
        let mut hist = Histogram::new(params.trustees, params.anonymity);
        let mut order: Vec<usize> = (0..params.anonymity).collect();
        let mut later = Vec::with_capacity(params.anonymity);
        let mut responses = Responses::new(params.anonymity);

        for _ in 0..self.trials_per_batch {
            match &self.approach.knowledge {
                Some(knowledge) => knowledge.arrange(params.trustees, &mut order, &mut later, &mut rng),
                None => order.shuffle(&mut rng),
            }
            responses.roll(&self.approach, &mut rng);
            let outcome = match requirement {
                Requirement::Hinted { subsecrets, .. } => {
                    layout.hinted_walk(&order, params, subsecrets, &responses)
                }
                _ => layout.walk(&order, params, requirement, &responses),
            };
            hist.record(outcome);
        }

        debug!(batch, recovered = hist.recovered(), "batch done");
        Ok(hist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RecoveryParams {
        RecoveryParams {
            trustees: 10,
            anonymity: 30,
            subsecrets: 4,
            absolute_threshold: 2,
            leaf_threshold_percent: 50,
        }
    }

    fn mc(seed: u64) -> MonteCarlo {
        MonteCarlo {
            batches: 4,
            trials_per_batch: 500,
            seed,
            approach: Approach::default(),
        }
    }

    fn informed(seed: u64, trustee_miss_percent: u32, decoy_hit_percent: u32) -> MonteCarlo {
        MonteCarlo {
            approach: Approach {
                knowledge: Some(Knowledge {
                    trustee_miss_percent,
                    decoy_hit_percent,
                }),
                ..Approach::default()
            },
            ..mc(seed)
        }
    }

    #[test]
    fn test_every_trial_recovers() {
        for scheme in [
            Scheme::Additive,
            Scheme::Thresholded { upper_percent: 100 },
            Scheme::Hinted { hints: 3 },
            Scheme::Baseline { threshold_percent: 60 },
        ] {
            let hist = mc(1).run(&params(), &scheme).unwrap();
            assert_eq!(hist.trials, 2000);
            assert_eq!(hist.recovered(), 2000, "{scheme:?}");
            assert_eq!(hist.trustee_cdf()[10], 1.0);
            assert_eq!(hist.contact_cdf()[30], 1.0);
            assert_eq!(hist.trustee_cdf()[0], 0.0);
        }
    }

    #[test]
    fn test_same_seed_same_histogram() {
        let a = mc(7).run(&params(), &Scheme::Additive).unwrap();
        let b = mc(7).run(&params(), &Scheme::Additive).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_baseline_recovers_at_threshold() {
        let hist = mc(2).run(&params(), &Scheme::Baseline { threshold_percent: 30 }).unwrap();
        // recovery always lands exactly on the third trustee
        assert_eq!(hist.by_trustees[3], hist.trials);
    }

    #[test]
    fn test_layout_shapes() {
        let p = params();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let layout = Layout::build(&p, Requirement::Hinted { subsecrets: 2, hints: 3 }, &mut rng).unwrap();
        assert_eq!(layout.holdings.len(), 10);
        assert_eq!(layout.holdings.iter().map(|h| h.len()).sum::<usize>(), 16);
        assert!(layout.holdings.iter().all(|h| h.len() <= 2));
        for (i, &ptr) in layout.pointers.iter().enumerate() {
            assert_ne!(i, ptr);
        }
    }

    #[test]
    fn test_zero_batches_rejected() {
        let bad = MonteCarlo {
            batches: 0,
            ..mc(0)
        };
        assert!(bad.run(&params(), &Scheme::Additive).is_err());
    }

    #[test]
    fn test_odds_above_hundred_rejected() {
        let bad = MonteCarlo {
            approach: Approach {
                report_percent: 101,
                ..Approach::default()
            },
            ..mc(0)
        };
        assert!(bad.run(&params(), &Scheme::Additive).is_err());
        assert!(informed(0, 0, 150).run(&params(), &Scheme::Additive).is_err());
    }

    #[test]
    fn test_perfect_knowledge_contacts_only_trustees() {
        for scheme in [Scheme::Additive, Scheme::Hinted { hints: 3 }] {
            let hist = informed(4, 0, 0).run(&params(), &scheme).unwrap();
            assert_eq!(hist.recovered(), hist.trials);
            // every contact before recovery was a trustee
            assert_eq!(&hist.by_contacts[..=10], &hist.by_trustees[..]);
            assert!(hist.by_contacts[11..].iter().all(|&c| c == 0));
        }
    }

    #[test]
    fn test_inverted_knowledge_exhausts_decoys_first() {
        let hist = informed(5, 100, 100).run(&params(), &Scheme::Additive).unwrap();
        assert_eq!(hist.recovered(), hist.trials);
        assert_eq!(hist.contact_cdf()[20], 0.0);
    }

    #[test]
    fn test_good_guess_beats_random_order() {
        let p = params();
        let blind = mc(6).run(&p, &Scheme::Additive).unwrap();
        let guess = informed(6, 10, 10).run(&p, &Scheme::Additive).unwrap();
        assert!(guess.contact_cdf()[8] > blind.contact_cdf()[8] + 0.5);
    }

    #[test]
    fn test_reporting_and_withholding_stop_recovery() {
        let everyone_reports = MonteCarlo {
            approach: Approach {
                report_percent: 100,
                ..Approach::default()
            },
            ..mc(8)
        };
        let nobody_hands_over = MonteCarlo {
            approach: Approach {
                obtain_percent: 0,
                ..Approach::default()
            },
            ..mc(8)
        };
        for scheme in [Scheme::Additive, Scheme::Hinted { hints: 3 }] {
            for run in [everyone_reports, nobody_hands_over] {
                let hist = run.run(&params(), &scheme).unwrap();
                assert_eq!(hist.trials, 2000);
                assert_eq!(hist.recovered(), 0, "{scheme:?}");
            }
        }
    }

    #[test]
    fn test_half_withholding_sometimes_fails() {
        let half = MonteCarlo {
            approach: Approach {
                obtain_percent: 50,
                ..Approach::default()
            },
            ..mc(9)
        };
        let hist = half.run(&params(), &Scheme::Additive).unwrap();
        assert!(hist.recovered() > 0);
        assert!(hist.recovered() < hist.trials);
    }

    #[test]
    fn test_lone_hint_holder() {
        let p = params();
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        let layout = Layout::build(&p, Requirement::Hinted { subsecrets: 2, hints: 1 }, &mut rng).unwrap();
        let holder = layout.pointers.iter().copied().find(|&h| layout.pointers[h] == h).unwrap();
        assert!(layout.pointers.iter().all(|&ptr| ptr == holder));

        let hist = mc(10).run(&p, &Scheme::Hinted { hints: 1 }).unwrap();
        assert_eq!(hist.recovered(), hist.trials);
    }

    #[test]
    fn test_cdf_of_empty_histogram() {
        let h = Histogram::new(2, 3);
        assert_eq!(h.trustee_cdf(), vec![0.0; 3]);
        assert_eq!(h.contact_cdf(), vec![0.0; 4]);
    }
}
