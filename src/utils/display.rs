//! Display and output formatting utilities

use crate::lock::{LockInstance, LockSolution, DIAL_TRUE};
use crate::pipeline::{BenchmarkReport, CalibrationAdvice, CheckResult, VerificationReport};
use crate::sat::EncodingStatistics;
use itertools::Itertools;
use std::io::IsTerminal;
use std::sync::OnceLock;

/// Format lock instances, solutions and reports for the console
pub struct ReportFormatter;

impl ReportFormatter {
    /// Short overview of an instance
    pub fn format_instance_summary(instance: &LockInstance) -> String {
        let mut output = String::new();

        output.push_str("=== Lock Instance ===\n");
        output.push_str(&format!("Dials: {}\n", instance.num_dials));
        output.push_str(&format!("Binary pins: {}\n", instance.binary_pins.len()));
        output.push_str(&format!("Negation links: {}\n", instance.negations.len()));
        output.push_str(&format!("OR clauses: {}\n", instance.clauses.len()));

        if !instance.negations.is_empty() {
            output.push_str("\nNegations:\n");
            for [i, j] in &instance.negations {
                output.push_str(&format!("  Not({}, {})\n", i, j));
            }
        }
        if !instance.clauses.is_empty() {
            output.push_str("\nClauses:\n");
            for clause in &instance.clauses {
                output.push_str(&format!("  OR({})\n", clause.iter().join(", ")));
            }
        }

        output
    }

    /// One line per dial: position and its truth value
    pub fn format_dial_settings(solution: &LockSolution) -> String {
        let mut output = String::new();

        output.push_str("Dial | Position | Value\n");
        output.push_str("-----|----------|------\n");
        for (dial, value) in &solution.dial_values {
            let truth = if *value == DIAL_TRUE { "TRUE" } else { "FALSE" };
            output.push_str(&format!("{:4} | {:8} | {}\n", dial, value, truth));
        }

        output
    }

    pub fn format_encoding_statistics(statistics: &EncodingStatistics) -> String {
        statistics.to_string()
    }

    /// Verification report with coloured pass/fail markers
    pub fn format_verification(report: &VerificationReport) -> String {
        let mut output = String::new();

        output.push_str("=== Verification ===\n");
        for check in &report.checks {
            output.push_str(&Self::format_check(check));
        }
        if report.halted_early {
            output.push_str(&ColorOutput::warning(
                "Value checks skipped: dial set does not match the instance\n",
            ));
        }

        let verdict = if report.valid {
            ColorOutput::success("VALID")
        } else {
            ColorOutput::error("INVALID")
        };
        output.push_str(&format!("Result: {}\n", verdict));
        output
    }

    fn format_check(check: &CheckResult) -> String {
        let mark = if check.passed {
            ColorOutput::success("PASS")
        } else {
            ColorOutput::error("FAIL")
        };
        let mut output = format!("[{}] {}\n", mark, check.message);
        for violation in &check.violations {
            output.push_str(&format!("    {}\n", violation));
        }
        output
    }

    /// Comparison table across tiers, followed by calibration and monotonicity notes
    pub fn format_benchmark(report: &BenchmarkReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Benchmark: {} base variables, {} trials per tier, seed {}, backend {:?}\n\n",
            report.base_vars, report.trials, report.seed, report.backend
        ));
        output.push_str(
            "Tier             | SAT rate | Cl/base | Cl/dial | Mean(ms) | Median(ms) | Min(ms) | Max(ms) | Stddev(ms)\n",
        );
        output.push_str(
            "-----------------|----------|---------|---------|----------|------------|---------|---------|-----------\n",
        );

        for run in &report.tiers {
            let summary = &run.summary;
            let times = &summary.times;
            output.push_str(&format!(
                "{:16} | {:7.1}% | {:7.2} | {:7.2} | {:8.2} | {:10.2} | {:7.2} | {:7.2} | {:10.2}\n",
                summary.difficulty.name(),
                summary.sat_rate * 100.0,
                summary.mean_clause_base_ratio,
                summary.mean_clause_dial_ratio,
                times.mean * 1000.0,
                times.median * 1000.0,
                times.min * 1000.0,
                times.max * 1000.0,
                times.std_dev * 1000.0,
            ));
            if summary.timeouts > 0 {
                output.push_str(&ColorOutput::warning(&format!(
                    "  {} trial(s) timed out\n",
                    summary.timeouts
                )));
            }
        }

        output.push('\n');
        if let Some(advice) = report.calibration_advice() {
            let line = format!("Phase transition: {}\n", advice);
            output.push_str(&match advice {
                CalibrationAdvice::Calibrated { .. } => ColorOutput::success(&line),
                _ => ColorOutput::warning(&line),
            });
        }
        if report.is_monotonic() {
            output.push_str(&ColorOutput::success("Mean solve time increases with difficulty\n"));
        } else {
            output.push_str(&ColorOutput::warning(
                "Mean solve time is not monotonic across tiers\n",
            ));
        }

        output
    }
}

/// ANSI styling for verdicts and warnings.
///
/// Styling applies only when stdout is a terminal, `NO_COLOR` is unset and
/// `TERM` is not `dumb`. The decision is taken once per process.
pub struct ColorOutput;

impl ColorOutput {
    pub fn colored(text: &str, color: Color) -> String {
        color.paint(text, Self::enabled())
    }

    fn enabled() -> bool {
        static ENABLED: OnceLock<bool> = OnceLock::new();
        *ENABLED.get_or_init(|| {
            color_allowed(
                std::env::var_os("NO_COLOR").is_some(),
                std::env::var("TERM").ok().as_deref(),
                std::io::stdout().is_terminal(),
            )
        })
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

fn color_allowed(no_color: bool, term: Option<&str>, stdout_is_tty: bool) -> bool {
    stdout_is_tty && !no_color && term != Some("dumb")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }

    /// Wrap `text` in this color's escape codes, or return it unchanged
    pub fn paint(self, text: &str, enabled: bool) -> String {
        if enabled {
            format!("\x1b[{}m{}\x1b[0m", self.code(), text)
        } else {
            text.to_string()
        }
    }
}
