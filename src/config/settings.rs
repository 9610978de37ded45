//! Configuration settings for the lock generator, solver and benchmark

use crate::generator::Difficulty;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub generator: GeneratorConfig,
    pub solver: SolverConfig,
    pub benchmark: BenchmarkConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub base_vars: usize,
    pub difficulty: Difficulty,
    pub seed: Option<u64>,
    pub require_sat: bool,
    pub max_sat_retries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    #[default]
    Cadical,
    Dpll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub base_vars: usize,
    pub trials: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub instances_directory: PathBuf,
    pub solutions_directory: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig {
                base_vars: 20,
                difficulty: Difficulty::Medium,
                seed: None,
                require_sat: false,
                max_sat_retries: 25,
            },
            solver: SolverConfig {
                backend: SolverBackend::Cadical,
                timeout_seconds: None,
            },
            benchmark: BenchmarkConfig {
                base_vars: 30,
                trials: 20,
                seed: None,
            },
            output: OutputConfig {
                instances_directory: PathBuf::from("output/instances"),
                solutions_directory: PathBuf::from("output/solutions"),
            },
        }
    }
}

impl SolverConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            log::info!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save settings to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.generator.base_vars < 3 {
            anyhow::bail!("Generator needs at least 3 base variables, got {}", self.generator.base_vars);
        }

        if self.generator.max_sat_retries == 0 {
            anyhow::bail!("max_sat_retries must be positive");
        }

        if self.solver.timeout_seconds == Some(0) {
            anyhow::bail!("Solver timeout must be positive when set");
        }

        if self.benchmark.base_vars < 3 {
            anyhow::bail!("Benchmark needs at least 3 base variables, got {}", self.benchmark.base_vars);
        }

        if self.benchmark.trials == 0 {
            anyhow::bail!("Benchmark trials must be positive");
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(vars) = cli_overrides.base_vars {
            self.generator.base_vars = vars;
            self.benchmark.base_vars = vars;
        }
        if let Some(difficulty) = cli_overrides.difficulty {
            self.generator.difficulty = difficulty;
        }
        if let Some(seed) = cli_overrides.seed {
            self.generator.seed = Some(seed);
            self.benchmark.seed = Some(seed);
        }
        if cli_overrides.require_sat {
            self.generator.require_sat = true;
        }
        if let Some(backend) = cli_overrides.backend {
            self.solver.backend = backend;
        }
        if let Some(timeout) = cli_overrides.timeout_seconds {
            self.solver.timeout_seconds = Some(timeout);
        }
        if let Some(trials) = cli_overrides.trials {
            self.benchmark.trials = trials;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub base_vars: Option<usize>,
    pub difficulty: Option<Difficulty>,
    pub seed: Option<u64>,
    pub require_sat: bool,
    pub backend: Option<SolverBackend>,
    pub timeout_seconds: Option<u64>,
    pub trials: Option<usize>,
}
