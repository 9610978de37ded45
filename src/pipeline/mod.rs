//! Solving, verification and benchmarking built on the core modules

pub mod benchmark;
pub mod problem;
pub mod verifier;

pub use benchmark::{
    run_all, run_tier, BenchmarkReport, CalibrationAdvice, TierRun, TierSummary, TimeStats,
    TrialRecord,
};
pub use problem::{generate_satisfiable, LockOutcome, LockProblem, SatisfiableInstance, SolveReport};
pub use verifier::{verify, CheckKind, CheckResult, VerificationReport};
