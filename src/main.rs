//! Command line interface for the lock/SAT toolkit

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use lock_sat::{
    config::{CliOverrides, Settings, SolverBackend},
    generator::{Difficulty, InstanceGenerator},
    lock::{
        create_example_files, load_instance_from_file, load_solution_from_file,
        save_instance_to_file, save_solution_to_file, timestamped_path, InstanceBuilder,
        LockInstance,
    },
    pipeline::{generate_satisfiable, run_all, verify, LockOutcome, LockProblem},
    utils::{ColorOutput, ReportFormatter},
    LockError, LockResult,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lock_sat")]
#[command(about = "Generate, solve and verify lock puzzles encoded as SAT")]
#[command(version = "0.1.0")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a lock instance, randomly or interactively
    Generate {
        /// Generate randomly instead of prompting
        #[arg(long)]
        auto: bool,

        /// Number of base variables (overrides config)
        #[arg(long)]
        vars: Option<usize>,

        /// Difficulty tier (overrides config)
        #[arg(short, long, value_enum)]
        difficulty: Option<Difficulty>,

        /// Random seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,

        /// Keep generating until the instance is satisfiable
        #[arg(long)]
        require_sat: bool,

        /// Solver used to check satisfiability with --require-sat
        #[arg(short, long, value_enum)]
        backend: Option<SolverBackend>,

        /// Output file (defaults to a timestamped file in the instances directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,
    },

    /// Solve a lock instance
    Solve {
        /// Instance JSON file
        instance: PathBuf,

        /// SAT backend (overrides config)
        #[arg(short, long, value_enum)]
        backend: Option<SolverBackend>,

        /// Give up after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Save the solution to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the solution to a timestamped file in the solutions directory
        #[arg(long)]
        save: bool,

        /// Also write the CNF encoding in DIMACS format
        #[arg(long)]
        dimacs: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,
    },

    /// Verify a solution against an instance
    Verify {
        /// Instance JSON file
        instance: PathBuf,

        /// Solution JSON file
        solution: PathBuf,
    },

    /// Measure SAT rate and solve time for every difficulty tier
    Benchmark {
        /// Number of base variables (overrides config)
        #[arg(long)]
        vars: Option<usize>,

        /// Trials per tier (overrides config)
        #[arg(short, long)]
        trials: Option<usize>,

        /// Base seed (random when absent)
        #[arg(short, long)]
        seed: Option<u64>,

        /// SAT backend (overrides config)
        #[arg(short, long, value_enum)]
        backend: Option<SolverBackend>,

        /// Per-trial timeout in seconds (overrides config). Timed-out solver
        /// threads cannot be cancelled and keep running beside later trials.
        #[arg(long)]
        timeout: Option<u64>,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,
    },

    /// Create a default configuration and sample instances
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let success = match cli.command {
        Commands::Generate {
            auto,
            vars,
            difficulty,
            seed,
            require_sat,
            backend,
            output,
            config,
        } => {
            let overrides = CliOverrides {
                base_vars: vars,
                difficulty,
                seed,
                require_sat,
                backend,
                ..CliOverrides::default()
            };
            let settings = load_settings(&config, &overrides)?;
            if auto {
                generate_command(&settings, output)?
            } else {
                interactive_command(&settings, output)?
            }
        }
        Commands::Solve {
            instance,
            backend,
            timeout,
            output,
            save,
            dimacs,
            config,
        } => {
            let overrides = CliOverrides {
                backend,
                timeout_seconds: timeout,
                ..CliOverrides::default()
            };
            let settings = load_settings(&config, &overrides)?;
            solve_command(&settings, &instance, output, save, dimacs, cli.verbose > 0)?
        }
        Commands::Verify { instance, solution } => verify_command(&instance, &solution)?,
        Commands::Benchmark {
            vars,
            trials,
            seed,
            backend,
            timeout,
            config,
        } => {
            let overrides = CliOverrides {
                base_vars: vars,
                seed,
                backend,
                trials,
                timeout_seconds: timeout,
                ..CliOverrides::default()
            };
            let settings = load_settings(&config, &overrides)?;
            benchmark_command(&settings)?
        }
        Commands::Setup { directory, force } => setup_command(directory, force)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_settings(config_path: &Path, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = Settings::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    settings.merge_with_cli(overrides);
    settings
        .validate()
        .context("Configuration validation failed")?;
    Ok(settings)
}

fn generate_command(settings: &Settings, output: Option<PathBuf>) -> Result<bool> {
    let config = &settings.generator;
    println!(
        "{}",
        ColorOutput::info(&format!(
            "Generating {} lock with {} base variables...",
            config.difficulty, config.base_vars
        ))
    );

    let mut generator = match config.seed {
        Some(seed) => InstanceGenerator::seeded(seed),
        None => InstanceGenerator::from_entropy(),
    };

    let instance = if config.require_sat {
        let found = generate_satisfiable(
            &mut generator,
            config.base_vars,
            config.difficulty,
            settings.solver.backend,
            settings.solver.timeout(),
            config.max_sat_retries,
        )
        .context("Failed to generate a satisfiable instance")?;
        println!(
            "{}",
            ColorOutput::success(&format!("Satisfiable after {} attempt(s)", found.attempts))
        );
        found.instance
    } else {
        generator
            .generate(config.base_vars, config.difficulty)
            .context("Failed to generate instance")?
    };

    println!("{}", ReportFormatter::format_instance_summary(&instance));
    let path = save_generated(&instance, output, settings)?;
    println!("{}", ColorOutput::success(&format!("Saved to {}", path.display())));
    Ok(true)
}

fn interactive_command(settings: &Settings, output: Option<PathBuf>) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("Interactive mode needs a terminal; pass --auto to generate randomly");
    }

    let num_dials: usize = Input::new()
        .with_prompt("Number of dials")
        .default(4)
        .validate_with(|n: &usize| {
            if *n >= 1 {
                Ok(())
            } else {
                Err("A lock needs at least one dial")
            }
        })
        .interact_text()?;
    let mut builder = InstanceBuilder::new(num_dials)?;

    let actions = [
        "Add negation link",
        "Add OR clause",
        "Show configuration",
        "Save and exit",
        "Cancel",
    ];
    loop {
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Choose an action")
            .items(&actions)
            .default(0)
            .interact()
            .context("Failed to show selection prompt")?;

        match choice {
            0 | 1 => {
                let arity = if choice == 0 { 2 } else { 3 };
                let input: String = Input::new()
                    .with_prompt(format!("{} dials, comma-separated", arity))
                    .interact_text()?;
                match add_constraint(&mut builder, &input, arity) {
                    Ok(()) => println!("{}", ColorOutput::success("Added")),
                    Err(e) => println!("{}", ColorOutput::error(&e.to_string())),
                }
            }
            2 => println!("{}", ReportFormatter::format_instance_summary(builder.instance())),
            3 => {
                let instance = builder.finish()?;
                let path = save_generated(&instance, output, settings)?;
                println!("{}", ColorOutput::success(&format!("Saved to {}", path.display())));
                return Ok(true);
            }
            _ => {
                println!("{}", ColorOutput::warning("Cancelled, nothing saved"));
                return Ok(false);
            }
        }
    }
}

fn add_constraint(builder: &mut InstanceBuilder, input: &str, arity: usize) -> LockResult<()> {
    let dials = builder.parse_dials(input, arity)?;
    match dials.as_slice() {
        &[i, j] => builder.add_negation(i, j),
        &[i, j, k] => builder.add_clause(i, j, k),
        other => Err(LockError::InvalidInstance(format!(
            "Expected 2 or 3 dials, got {}",
            other.len()
        ))),
    }
}

fn save_generated(instance: &LockInstance, output: Option<PathBuf>, settings: &Settings) -> Result<PathBuf> {
    let path = output
        .unwrap_or_else(|| timestamped_path(&settings.output.instances_directory, "lock_instance"));
    save_instance_to_file(instance, &path)
        .with_context(|| format!("Failed to save instance to {}", path.display()))?;
    Ok(path)
}

fn solve_command(
    settings: &Settings,
    instance_path: &Path,
    output: Option<PathBuf>,
    save: bool,
    dimacs: Option<PathBuf>,
    verbose: bool,
) -> Result<bool> {
    let problem = LockProblem::from_file(instance_path)
        .with_context(|| format!("Failed to load instance from {}", instance_path.display()))?;

    println!("{}", ReportFormatter::format_instance_summary(problem.instance()));
    if verbose {
        println!("{}", ReportFormatter::format_encoding_statistics(problem.statistics()));
    }

    if let Some(path) = dimacs {
        std::fs::write(&path, problem.clauses().to_dimacs())
            .with_context(|| format!("Failed to write DIMACS to {}", path.display()))?;
        println!("DIMACS written to {}", path.display());
    }

    println!(
        "{}",
        ColorOutput::info(&format!("Solving with {:?}...", settings.solver.backend))
    );
    let report = problem
        .solve_with_backend(settings.solver.backend, settings.solver.timeout())
        .context("Failed to solve lock instance")?;

    match report.outcome {
        LockOutcome::Solved(solution) => {
            println!(
                "{}",
                ColorOutput::success(&format!(
                    "Solved in {:.3}s",
                    report.solve_time.as_secs_f64()
                ))
            );
            println!("{}", ReportFormatter::format_dial_settings(&solution));
            let verification = verify(problem.instance(), &solution);
            println!("{}", ReportFormatter::format_verification(&verification));

            let target = match output {
                Some(path) => Some(path),
                None if save => Some(timestamped_path(
                    &settings.output.solutions_directory,
                    "lock_solution",
                )),
                None => None,
            };
            if let Some(path) = target {
                save_solution_to_file(&solution, &path)
                    .with_context(|| format!("Failed to save solution to {}", path.display()))?;
                println!("Solution saved to {}", path.display());
            }
            Ok(verification.valid)
        }
        LockOutcome::Unsatisfiable => {
            println!("{}", ColorOutput::error("No solution exists (UNSAT)"));
            Ok(false)
        }
        LockOutcome::Timeout => {
            println!(
                "{}",
                ColorOutput::warning(&format!(
                    "Solver timed out after {:.3}s",
                    report.solve_time.as_secs_f64()
                ))
            );
            Ok(false)
        }
    }
}

fn verify_command(instance_path: &Path, solution_path: &Path) -> Result<bool> {
    let instance = load_instance_from_file(instance_path)
        .with_context(|| format!("Failed to load instance from {}", instance_path.display()))?;
    let solution = load_solution_from_file(solution_path)
        .with_context(|| format!("Failed to load solution from {}", solution_path.display()))?;

    let report = verify(&instance, &solution);
    println!("{}", ReportFormatter::format_verification(&report));
    Ok(report.valid)
}

fn benchmark_command(settings: &Settings) -> Result<bool> {
    let config = &settings.benchmark;
    let seed = config.seed.unwrap_or_else(rand::random);
    println!(
        "{}",
        ColorOutput::info(&format!(
            "Benchmarking {} trials per tier at {} base variables (seed {})...",
            config.trials, config.base_vars, seed
        ))
    );

    let report = run_all(
        config.base_vars,
        config.trials,
        seed,
        settings.solver.backend,
        settings.solver.timeout(),
    )?;
    println!("{}", ReportFormatter::format_benchmark(&report));
    Ok(true)
}

fn setup_command(directory: PathBuf, force: bool) -> Result<bool> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_path = directory.join("config/default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    let samples_dir = directory.join("output");
    if !samples_dir.join("instances").exists() || force {
        create_example_files(&samples_dir).context("Failed to create sample files")?;
        println!("Created sample instances and solutions in: {}", samples_dir.display());
    } else {
        println!("Skipped: sample files in {} (already exist)", samples_dir.display());
    }

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit {}", config_path.display());
    println!("2. Run: lock_sat solve output/instances/small.json");
    println!("3. Run: lock_sat generate --auto --difficulty phase-transition --require-sat");

    Ok(true)
}
