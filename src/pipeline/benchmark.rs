//! Difficulty benchmark: SAT rate and solve time per tier

use super::problem::{LockOutcome, LockProblem};
use crate::config::SolverBackend;
use crate::generator::{Difficulty, InstanceGenerator};
use crate::sat::detached_workers;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::time::Duration;

/// Seed distance between tiers so tiers never share trial seeds
const TIER_SEED_STRIDE: u64 = 1_000_000;

/// Lower edge of the target SAT rate for the phase-transition tier
pub const TARGET_SAT_RATE_LOW: f64 = 0.4;
/// Upper edge of the target SAT rate for the phase-transition tier
pub const TARGET_SAT_RATE_HIGH: f64 = 0.6;

/// One generated-and-solved instance
#[derive(Debug, Clone)]
pub struct TrialRecord {
    pub trial: usize,
    pub seed: u64,
    pub base_vars: usize,
    pub total_dials: usize,
    pub num_clauses: usize,
    pub num_negations: usize,
    pub clause_base_ratio: f64,
    pub clause_dial_ratio: f64,
    pub solve_time: Duration,
    pub satisfiable: bool,
    pub timed_out: bool,
}

/// Mean, median, extremes and spread of solve times, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

impl TimeStats {
    pub fn from_durations(durations: &[Duration]) -> Self {
        if durations.is_empty() {
            return Self::default();
        }
        let mut secs: Vec<f64> = durations.iter().map(Duration::as_secs_f64).collect();
        secs.sort_by(f64::total_cmp);

        let n = secs.len() as f64;
        let mean = secs.iter().sum::<f64>() / n;
        let median = if secs.len() % 2 == 0 {
            (secs[secs.len() / 2 - 1] + secs[secs.len() / 2]) / 2.0
        } else {
            secs[secs.len() / 2]
        };
        // Sample variance; a single trial has no spread
        let variance = if secs.len() > 1 {
            secs.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };

        Self {
            mean,
            median,
            min: secs[0],
            max: secs[secs.len() - 1],
            std_dev: variance.sqrt(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TierSummary {
    pub difficulty: Difficulty,
    pub trials: usize,
    pub sat_count: usize,
    pub timeouts: usize,
    pub sat_rate: f64,
    pub mean_clause_base_ratio: f64,
    pub mean_clause_dial_ratio: f64,
    pub times: TimeStats,
}

impl TierSummary {
    pub fn from_records(difficulty: Difficulty, records: &[TrialRecord]) -> Self {
        let trials = records.len();
        let n = trials.max(1) as f64;
        let sat_count = records.iter().filter(|r| r.satisfiable).count();
        let durations: Vec<Duration> = records.iter().map(|r| r.solve_time).collect();

        Self {
            difficulty,
            trials,
            sat_count,
            timeouts: records.iter().filter(|r| r.timed_out).count(),
            sat_rate: sat_count as f64 / n,
            mean_clause_base_ratio: records.iter().map(|r| r.clause_base_ratio).sum::<f64>() / n,
            mean_clause_dial_ratio: records.iter().map(|r| r.clause_dial_ratio).sum::<f64>() / n,
            times: TimeStats::from_durations(&durations),
        }
    }
}

/// All trials of one tier
#[derive(Debug, Clone)]
pub struct TierRun {
    pub summary: TierSummary,
    pub records: Vec<TrialRecord>,
}

/// Whether the phase-transition tier sits near a 50% SAT rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationAdvice {
    /// Too few SAT instances; lower the clause density
    TooLow { sat_rate: f64 },
    /// Too many SAT instances; raise the clause density
    TooHigh { sat_rate: f64 },
    Calibrated { sat_rate: f64 },
}

impl CalibrationAdvice {
    pub fn for_sat_rate(sat_rate: f64) -> Self {
        if sat_rate < TARGET_SAT_RATE_LOW {
            CalibrationAdvice::TooLow { sat_rate }
        } else if sat_rate > TARGET_SAT_RATE_HIGH {
            CalibrationAdvice::TooHigh { sat_rate }
        } else {
            CalibrationAdvice::Calibrated { sat_rate }
        }
    }
}

impl std::fmt::Display for CalibrationAdvice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalibrationAdvice::TooLow { sat_rate } => write!(
                f,
                "SAT rate {:.1}% is too low; decrease the phase-transition clause density",
                sat_rate * 100.0
            ),
            CalibrationAdvice::TooHigh { sat_rate } => write!(
                f,
                "SAT rate {:.1}% is too high; increase the phase-transition clause density",
                sat_rate * 100.0
            ),
            CalibrationAdvice::Calibrated { sat_rate } => write!(
                f,
                "SAT rate {:.1}% is well calibrated",
                sat_rate * 100.0
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub base_vars: usize,
    pub trials: usize,
    pub seed: u64,
    pub backend: SolverBackend,
    pub tiers: Vec<TierRun>,
}

impl BenchmarkReport {
    pub fn tier(&self, difficulty: Difficulty) -> Option<&TierRun> {
        self.tiers.iter().find(|run| run.summary.difficulty == difficulty)
    }

    /// Advice for the phase-transition tier, if it was run
    pub fn calibration_advice(&self) -> Option<CalibrationAdvice> {
        self.tier(Difficulty::PhaseTransition)
            .map(|run| CalibrationAdvice::for_sat_rate(run.summary.sat_rate))
    }

    /// Whether mean solve time never drops from one tier to the next harder one
    pub fn is_monotonic(&self) -> bool {
        self.tiers
            .windows(2)
            .all(|pair| pair[0].summary.times.mean <= pair[1].summary.times.mean)
    }
}

/// Seed of trial `trial` of the tier at `tier_index`
pub fn trial_seed(base_seed: u64, tier_index: usize, trial: usize) -> u64 {
    base_seed
        .wrapping_add(tier_index as u64 * TIER_SEED_STRIDE)
        .wrapping_add(trial as u64)
}

/// Run `trials` independent trials of `difficulty` in parallel.
///
/// Every trial owns a generator seeded from `seed`, so results do not
/// depend on scheduling. A trial that hits `timeout` leaves its oracle
/// thread running beside the pool, which slows the trials after it.
pub fn run_tier(
    difficulty: Difficulty,
    base_vars: usize,
    trials: usize,
    seed: u64,
    backend: SolverBackend,
    timeout: Option<Duration>,
) -> Result<TierRun> {
    let tier_index = Difficulty::ALL
        .iter()
        .position(|d| *d == difficulty)
        .unwrap_or_default();

    let records = (0..trials)
        .into_par_iter()
        .map(|trial| {
            let trial_seed = trial_seed(seed, tier_index, trial);
            run_trial(difficulty, base_vars, trial, trial_seed, backend, timeout)
                .with_context(|| format!("{} trial {} (seed {}) failed", difficulty, trial, trial_seed))
        })
        .collect::<Result<Vec<_>>>()?;

    let summary = TierSummary::from_records(difficulty, &records);
    log::info!(
        "{}: {}/{} satisfiable, mean solve {:.4}s",
        difficulty,
        summary.sat_count,
        summary.trials,
        summary.times.mean
    );
    let detached = detached_workers();
    if detached > 0 {
        log::warn!(
            "{} timed-out oracle worker(s) still running after {}; later timings may be inflated",
            detached,
            difficulty
        );
    }
    Ok(TierRun { summary, records })
}

/// Run every tier, easiest first
pub fn run_all(
    base_vars: usize,
    trials: usize,
    seed: u64,
    backend: SolverBackend,
    timeout: Option<Duration>,
) -> Result<BenchmarkReport> {
    let tiers = Difficulty::ALL
        .iter()
        .map(|&difficulty| run_tier(difficulty, base_vars, trials, seed, backend, timeout))
        .collect::<Result<Vec<_>>>()?;

    Ok(BenchmarkReport {
        base_vars,
        trials,
        seed,
        backend,
        tiers,
    })
}

fn run_trial(
    difficulty: Difficulty,
    base_vars: usize,
    trial: usize,
    seed: u64,
    backend: SolverBackend,
    timeout: Option<Duration>,
) -> Result<TrialRecord> {
    let instance = InstanceGenerator::seeded(seed).generate(base_vars, difficulty)?;
    let problem = LockProblem::new(instance)?;
    let report = problem.solve_with_backend(backend, timeout)?;

    let instance = problem.instance();
    let num_clauses = instance.clauses.len();
    Ok(TrialRecord {
        trial,
        seed,
        base_vars,
        total_dials: instance.num_dials,
        num_clauses,
        num_negations: instance.negations.len(),
        clause_base_ratio: num_clauses as f64 / base_vars as f64,
        clause_dial_ratio: num_clauses as f64 / instance.num_dials as f64,
        solve_time: report.solve_time,
        satisfiable: matches!(report.outcome, LockOutcome::Solved(_)),
        timed_out: report.outcome == LockOutcome::Timeout,
    })
}
