//! Factory for creating SAT oracles based on configuration

use super::constraints::ClauseSet;
use super::dpll::DpllOracle;
use super::solver::{CadicalOracle, SatOracle, SolveOutcome};
use crate::config::SolverBackend;
use crate::error::{LockError, LockResult};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// Timed-out oracle threads that are still running
static DETACHED_WORKERS: AtomicUsize = AtomicUsize::new(0);

const RUNNING: u8 = 0;
const FINISHED: u8 = 1;
const ABANDONED: u8 = 2;

/// Number of oracle threads that outlived their timeout and have not finished yet
pub fn detached_workers() -> usize {
    DETACHED_WORKERS.load(Ordering::SeqCst)
}

/// Unified oracle interface that can use different backends
#[derive(Debug)]
pub enum UnifiedOracle {
    Cadical(CadicalOracle),
    Dpll(DpllOracle),
}

impl UnifiedOracle {
    /// Create a new oracle for the specified backend
    pub fn new(backend: SolverBackend) -> Self {
        match backend {
            SolverBackend::Cadical => UnifiedOracle::Cadical(CadicalOracle::new()),
            SolverBackend::Dpll => UnifiedOracle::Dpll(DpllOracle::new()),
        }
    }

    /// Get the backend type being used
    pub fn backend(&self) -> SolverBackend {
        match self {
            UnifiedOracle::Cadical(_) => SolverBackend::Cadical,
            UnifiedOracle::Dpll(_) => SolverBackend::Dpll,
        }
    }
}

impl SatOracle for UnifiedOracle {
    fn name(&self) -> &'static str {
        match self {
            UnifiedOracle::Cadical(oracle) => oracle.name(),
            UnifiedOracle::Dpll(oracle) => oracle.name(),
        }
    }

    fn solve(&mut self, clauses: &ClauseSet) -> LockResult<SolveOutcome> {
        match self {
            UnifiedOracle::Cadical(oracle) => oracle.solve(clauses),
            UnifiedOracle::Dpll(oracle) => oracle.solve(clauses),
        }
    }
}

impl Default for UnifiedOracle {
    fn default() -> Self {
        UnifiedOracle::new(SolverBackend::default())
    }
}

/// Solve `clauses` with `backend`, giving up after `timeout`.
///
/// With a timeout the oracle runs on a worker thread. If it has not answered
/// in time the outcome is [`SolveOutcome::Timeout`] and the worker is left to
/// finish on its own; the oracle has no cancellation hook. Such workers keep
/// a core busy until they finish, so short timeouts under heavy parallel
/// load can pile them up. [`detached_workers`] reports how many are live.
pub fn solve_with_timeout(
    backend: SolverBackend,
    clauses: &ClauseSet,
    timeout: Option<Duration>,
) -> LockResult<SolveOutcome> {
    let Some(timeout) = timeout else {
        return UnifiedOracle::new(backend).solve(clauses);
    };

    let (sender, receiver) = mpsc::channel();
    let worker_clauses = clauses.clone();
    let state = Arc::new(AtomicU8::new(RUNNING));
    let worker_state = Arc::clone(&state);
    std::thread::Builder::new()
        .name(format!("{:?}-oracle", backend).to_lowercase())
        .spawn(move || {
            let result = UnifiedOracle::new(backend).solve(&worker_clauses);
            // The receiver is gone if the caller already timed out
            let _ = sender.send(result);
            if worker_state.swap(FINISHED, Ordering::SeqCst) == ABANDONED {
                DETACHED_WORKERS.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .map_err(|e| LockError::Solver(format!("Failed to start oracle thread: {}", e)))?;

    match receiver.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            // Count before publishing ABANDONED so the worker never decrements first
            let detached = DETACHED_WORKERS.fetch_add(1, Ordering::SeqCst) + 1;
            if state.swap(ABANDONED, Ordering::SeqCst) != RUNNING {
                DETACHED_WORKERS.fetch_sub(1, Ordering::SeqCst);
            }
            log::warn!(
                "{:?} oracle gave no answer within {:.3}s ({} detached worker(s) still running)",
                backend,
                timeout.as_secs_f64(),
                detached
            );
            Ok(SolveOutcome::Timeout)
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(LockError::Solver(
            "Oracle thread exited without an answer".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::constraints::Clause;

    fn contradiction() -> ClauseSet {
        let mut clauses = ClauseSet::new(1);
        clauses.push(Clause::unit(1));
        clauses.push(Clause::unit(-1));
        clauses
    }

    /// Pigeonhole formula: `pigeons` pigeons into one fewer hole, unsatisfiable
    /// and exponential for a plain DPLL search
    fn pigeonhole(pigeons: i32) -> ClauseSet {
        let holes = pigeons - 1;
        let var = |p: i32, h: i32| p * holes + h + 1;
        let mut clauses = ClauseSet::new((pigeons * holes) as usize);
        for p in 0..pigeons {
            clauses.push(Clause::new((0..holes).map(|h| var(p, h)).collect()));
        }
        for h in 0..holes {
            for p in 0..pigeons {
                for q in (p + 1)..pigeons {
                    clauses.push(Clause::binary(-var(p, h), -var(q, h)));
                }
            }
        }
        clauses
    }

    #[test]
    fn test_backend_selection() {
        assert_eq!(UnifiedOracle::new(SolverBackend::Cadical).backend(), SolverBackend::Cadical);
        assert_eq!(UnifiedOracle::new(SolverBackend::Dpll).backend(), SolverBackend::Dpll);
        assert_eq!(UnifiedOracle::new(SolverBackend::Dpll).name(), "dpll");
    }

    #[test]
    fn test_backends_agree_on_unsat() {
        for backend in [SolverBackend::Cadical, SolverBackend::Dpll] {
            let mut oracle = UnifiedOracle::new(backend);
            assert_eq!(oracle.solve(&contradiction()).unwrap(), SolveOutcome::Unsatisfiable);
        }
    }

    #[test]
    fn test_simple_satisfiable() {
        let mut clauses = ClauseSet::new(1);
        clauses.push(Clause::unit(1));

        for backend in [SolverBackend::Cadical, SolverBackend::Dpll] {
            match UnifiedOracle::new(backend).solve(&clauses).unwrap() {
                SolveOutcome::Satisfiable(model) => assert_eq!(model.get(&1), Some(&true)),
                other => panic!("expected SAT from {:?}, got {:?}", backend, other),
            }
        }
    }

    #[test]
    fn test_solve_without_timeout() {
        let outcome = solve_with_timeout(SolverBackend::Dpll, &contradiction(), None).unwrap();
        assert_eq!(outcome, SolveOutcome::Unsatisfiable);
    }

    #[test]
    fn test_solve_within_generous_timeout() {
        let outcome = solve_with_timeout(
            SolverBackend::Dpll,
            &contradiction(),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(outcome, SolveOutcome::Unsatisfiable);
    }

    #[test]
    fn test_timeout_detaches_worker() {
        let outcome = solve_with_timeout(
            SolverBackend::Dpll,
            &pigeonhole(10),
            Some(Duration::from_millis(1)),
        )
        .unwrap();
        assert_eq!(outcome, SolveOutcome::Timeout);
        assert!(detached_workers() >= 1);
    }
}
