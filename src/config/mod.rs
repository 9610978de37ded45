//! Configuration management for the lock/SAT toolkit

pub mod settings;

pub use settings::{
    BenchmarkConfig, CliOverrides, GeneratorConfig, OutputConfig, Settings, SolverBackend,
    SolverConfig,
};
