//! SAT encoding and solving components

pub mod constraints;
pub mod dpll;
pub mod encoder;
pub mod solver;
pub mod solver_factory;

pub use constraints::{Clause, ClauseSet};
pub use dpll::DpllOracle;
pub use encoder::{decode, encode, EncodingStatistics};
pub use solver::{CadicalOracle, Model, SatOracle, SolveOutcome};
pub use solver_factory::{detached_workers, solve_with_timeout, UnifiedOracle};
