//! SAT oracle contract and the CaDiCaL backend

use super::constraints::ClauseSet;
use crate::error::{LockError, LockResult};
use cadical::Solver;
use std::collections::HashMap;
use std::time::Duration;

/// Variable assignment returned by an oracle; may be partial
pub type Model = HashMap<i32, bool>;

/// Result of asking an oracle about a clause set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A satisfying, possibly partial, assignment
    Satisfiable(Model),
    /// No assignment exists
    Unsatisfiable,
    /// The caller stopped waiting; nothing is known about satisfiability
    Timeout,
}

impl SolveOutcome {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SolveOutcome::Satisfiable(_))
    }
}

/// A SAT-solving capability.
///
/// Implementations decide satisfiability of clauses over variables
/// `1..=clauses.num_variables` and, when satisfiable, return one model.
/// Variables the model omits are don't-cares.
pub trait SatOracle {
    /// Short backend name for logs and reports
    fn name(&self) -> &'static str;

    /// Decide `clauses`, blocking until an answer is known
    fn solve(&mut self, clauses: &ClauseSet) -> LockResult<SolveOutcome>;
}

/// Oracle backed by the CaDiCaL solver.
///
/// A fresh solver is created for every call so no clauses leak between
/// instances.
#[derive(Debug, Default)]
pub struct CadicalOracle {
    last_solve_time: Option<Duration>,
}

impl CadicalOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wall time of the most recent solve call
    pub fn last_solve_time(&self) -> Option<Duration> {
        self.last_solve_time
    }
}

impl SatOracle for CadicalOracle {
    fn name(&self) -> &'static str {
        "cadical"
    }

    fn solve(&mut self, clauses: &ClauseSet) -> LockResult<SolveOutcome> {
        let mut solver: Solver = Solver::new();
        for clause in clauses {
            if clause.is_empty() {
                return Err(LockError::Solver(
                    "Cannot add empty clause (unsatisfiable)".to_string(),
                ));
            }
            solver.add_clause(clause.literals.iter().copied());
        }

        let start_time = std::time::Instant::now();
        let result = solver.solve();
        self.last_solve_time = Some(start_time.elapsed());

        match result {
            Some(true) => {
                // Only variables that occur in some clause are known to the solver
                let model = (1..=clauses.max_variable() as i32)
                    .filter_map(|var| solver.value(var).map(|value| (var, value)))
                    .collect();
                Ok(SolveOutcome::Satisfiable(model))
            }
            Some(false) => Ok(SolveOutcome::Unsatisfiable),
            None => Err(LockError::Solver(
                "CaDiCaL stopped without an answer".to_string(),
            )),
        }
    }
}
