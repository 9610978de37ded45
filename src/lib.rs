//! Lock puzzles as SAT problems
//!
//! A lock is a set of dials, each at position 1 (FALSE) or 6 (TRUE), tied
//! together by negation links and three-dial OR clauses. This library
//! generates locks at tunable difficulty, solves them through a SAT oracle
//! and verifies solutions against the dial arithmetic.

pub mod config;
pub mod error;
pub mod generator;
pub mod lock;
pub mod pipeline;
pub mod sat;
pub mod utils;

pub use config::Settings;
pub use error::{LockError, LockResult};
pub use generator::{Difficulty, InstanceGenerator};
pub use lock::{LockInstance, LockSolution};
pub use pipeline::{verify, LockOutcome, LockProblem, SolveReport, VerificationReport};

use anyhow::{Context, Result};

/// Solve `instance` with the backend and timeout configured in `settings`
pub fn solve_instance(instance: LockInstance, settings: &Settings) -> Result<SolveReport> {
    let problem = LockProblem::new(instance).context("Failed to encode lock instance")?;
    problem
        .solve_with_backend(settings.solver.backend, settings.solver.timeout())
        .context("Failed to solve lock instance")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverBackend;

    #[test]
    fn test_solve_instance() {
        let mut settings = Settings::default();
        settings.solver.backend = SolverBackend::Dpll;

        let instance = LockInstance {
            num_dials: 3,
            binary_pins: vec![1, 2, 3],
            negations: vec![],
            clauses: vec![[1, 2, 3]],
        };
        let report = solve_instance(instance.clone(), &settings).unwrap();
        let solution = report.outcome.solution().unwrap();
        assert!(verify(&instance, solution).valid);
    }
}
