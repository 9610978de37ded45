//! End-to-end lock solving: encode, ask an oracle, decode, verify

use super::verifier::verify;
use crate::config::SolverBackend;
use crate::error::{LockError, LockResult};
use crate::generator::{Difficulty, InstanceGenerator};
use crate::lock::{load_instance_from_file, LockInstance, LockSolution};
use crate::sat::{decode, encode, solve_with_timeout, ClauseSet, EncodingStatistics, SatOracle, SolveOutcome};
use rand::Rng;
use std::path::Path;
use std::time::{Duration, Instant};

/// Density shrink applied per failed attempt in [`generate_satisfiable`]
const RETRY_DENSITY_DECAY: f64 = 0.95;

/// A validated instance together with its CNF encoding
#[derive(Debug, Clone)]
pub struct LockProblem {
    instance: LockInstance,
    clauses: ClauseSet,
    statistics: EncodingStatistics,
}

/// What solving a lock produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// A verified solution
    Solved(LockSolution),
    Unsatisfiable,
    Timeout,
}

impl LockOutcome {
    pub fn solution(&self) -> Option<&LockSolution> {
        match self {
            LockOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    pub outcome: LockOutcome,
    pub solve_time: Duration,
    pub statistics: EncodingStatistics,
}

impl LockProblem {
    /// Validate and encode `instance`
    pub fn new(instance: LockInstance) -> LockResult<Self> {
        let clauses = encode(&instance)?;
        let statistics = EncodingStatistics::of(&instance);
        Ok(Self {
            instance,
            clauses,
            statistics,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> LockResult<Self> {
        Self::new(load_instance_from_file(path)?)
    }

    pub fn instance(&self) -> &LockInstance {
        &self.instance
    }

    pub fn clauses(&self) -> &ClauseSet {
        &self.clauses
    }

    pub fn statistics(&self) -> &EncodingStatistics {
        &self.statistics
    }

    /// Solve with an oracle the caller owns, blocking until it answers
    pub fn solve(&self, oracle: &mut dyn SatOracle) -> LockResult<SolveReport> {
        let start_time = Instant::now();
        let outcome = oracle.solve(&self.clauses)?;
        log::debug!("{} oracle answered in {:?}", oracle.name(), start_time.elapsed());
        self.finish(outcome, start_time.elapsed())
    }

    /// Solve with a fresh oracle for `backend`, giving up after `timeout`
    pub fn solve_with_backend(
        &self,
        backend: SolverBackend,
        timeout: Option<Duration>,
    ) -> LockResult<SolveReport> {
        let start_time = Instant::now();
        let outcome = solve_with_timeout(backend, &self.clauses, timeout)?;
        self.finish(outcome, start_time.elapsed())
    }

    fn finish(&self, outcome: SolveOutcome, solve_time: Duration) -> LockResult<SolveReport> {
        let outcome = match outcome {
            SolveOutcome::Satisfiable(model) => {
                let solution = decode(&model, &self.instance);
                let report = verify(&self.instance, &solution);
                if !report.valid {
                    log::error!("Decoded model failed verification:\n{}", report);
                    return Err(LockError::InternalConsistency(format!(
                        "Oracle model does not solve the lock: {}",
                        report
                            .violations()
                            .next()
                            .map(String::as_str)
                            .unwrap_or("unknown violation")
                    )));
                }
                LockOutcome::Solved(solution)
            }
            SolveOutcome::Unsatisfiable => LockOutcome::Unsatisfiable,
            SolveOutcome::Timeout => LockOutcome::Timeout,
        };

        Ok(SolveReport {
            outcome,
            solve_time,
            statistics: self.statistics.clone(),
        })
    }
}

/// A generated instance known to be satisfiable
#[derive(Debug, Clone)]
pub struct SatisfiableInstance {
    pub instance: LockInstance,
    pub solution: LockSolution,
    /// Number of instances generated, including the accepted one
    pub attempts: usize,
}

/// Generate instances until one is satisfiable.
///
/// Each failed attempt scales the tier's clause density by 0.95 for the next
/// one, so repeated UNSAT draws drift toward easier instances. A timed-out
/// attempt counts as a failure. Gives up with
/// [`LockError::RetriesExhausted`] after `max_attempts` instances.
pub fn generate_satisfiable<R: Rng>(
    generator: &mut InstanceGenerator<R>,
    base_vars: usize,
    difficulty: Difficulty,
    backend: SolverBackend,
    timeout: Option<Duration>,
    max_attempts: usize,
) -> LockResult<SatisfiableInstance> {
    let params = difficulty.params();

    for attempt in 0..max_attempts {
        let scaled = params.with_density_scaled(RETRY_DENSITY_DECAY.powi(attempt as i32));
        let instance = generator.generate_with_params(base_vars, &scaled)?;
        let problem = LockProblem::new(instance)?;
        let report = problem.solve_with_backend(backend, timeout)?;

        match report.outcome {
            LockOutcome::Solved(solution) => {
                log::debug!(
                    "Satisfiable {} instance found on attempt {}",
                    difficulty,
                    attempt + 1
                );
                return Ok(SatisfiableInstance {
                    instance: problem.instance,
                    solution,
                    attempts: attempt + 1,
                });
            }
            other => {
                log::warn!(
                    "Attempt {}/{} produced no solution ({:?}), retrying with clause density {:.3}",
                    attempt + 1,
                    max_attempts,
                    other,
                    params.clause_density * RETRY_DENSITY_DECAY.powi(attempt as i32 + 1)
                );
            }
        }
    }

    Err(LockError::RetriesExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::{DpllOracle, Model};

    fn triangle() -> LockInstance {
        LockInstance {
            num_dials: 3,
            binary_pins: vec![1, 2, 3],
            negations: vec![[1, 2], [2, 3], [1, 3]],
            clauses: vec![],
        }
    }

    /// Oracle that always returns the same answer
    struct FixedOracle(SolveOutcome);

    impl SatOracle for FixedOracle {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn solve(&mut self, _clauses: &ClauseSet) -> LockResult<SolveOutcome> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_solve_satisfiable() {
        let instance = LockInstance {
            num_dials: 3,
            binary_pins: vec![1, 2, 3],
            negations: vec![[1, 2]],
            clauses: vec![[1, 2, 3]],
        };
        let problem = LockProblem::new(instance.clone()).unwrap();
        let report = problem.solve(&mut DpllOracle::new()).unwrap();

        let solution = report.outcome.solution().unwrap();
        assert!(verify(&instance, solution).valid);
        assert_eq!(report.statistics.num_clauses, 3);
    }

    #[test]
    fn test_circular_negation_unsat() {
        let problem = LockProblem::new(triangle()).unwrap();
        let report = problem.solve(&mut DpllOracle::new()).unwrap();
        assert_eq!(report.outcome, LockOutcome::Unsatisfiable);

        let report = problem.solve_with_backend(SolverBackend::Dpll, None).unwrap();
        assert_eq!(report.outcome, LockOutcome::Unsatisfiable);
    }

    #[test]
    fn test_invalid_instance_rejected() {
        let instance = LockInstance {
            num_dials: 2,
            binary_pins: vec![],
            negations: vec![[1, 1]],
            clauses: vec![],
        };
        assert!(matches!(LockProblem::new(instance), Err(LockError::InvalidInstance(_))));
    }

    #[test]
    fn test_bad_model_is_internal_error() {
        // Claims SAT with every dial FALSE, which breaks the negation
        let problem = LockProblem::new(triangle()).unwrap();
        let mut oracle = FixedOracle(SolveOutcome::Satisfiable(Model::new()));
        let result = problem.solve(&mut oracle);
        assert!(matches!(result, Err(LockError::InternalConsistency(_))));
    }

    #[test]
    fn test_timeout_passes_through() {
        let problem = LockProblem::new(triangle()).unwrap();
        let report = problem.solve(&mut FixedOracle(SolveOutcome::Timeout)).unwrap();
        assert_eq!(report.outcome, LockOutcome::Timeout);
        assert!(report.outcome.solution().is_none());
    }

    #[test]
    fn test_generate_satisfiable() {
        let mut generator = InstanceGenerator::seeded(17);
        let found = generate_satisfiable(
            &mut generator,
            15,
            Difficulty::Medium,
            SolverBackend::Dpll,
            None,
            25,
        )
        .unwrap();

        assert!(found.attempts >= 1);
        assert!(verify(&found.instance, &found.solution).valid);
    }

    #[test]
    fn test_generate_satisfiable_zero_attempts() {
        let mut generator = InstanceGenerator::seeded(0);
        let result = generate_satisfiable(
            &mut generator,
            10,
            Difficulty::Easy,
            SolverBackend::Dpll,
            None,
            0,
        );
        assert!(matches!(result, Err(LockError::RetriesExhausted { attempts: 0 })));
    }
}
