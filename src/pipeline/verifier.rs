//! Independent solution verification
//!
//! Checks a solution directly against the dial arithmetic of an instance,
//! without going through the CNF encoding.

use crate::error::{LockError, LockResult};
use crate::lock::{LockInstance, LockSolution, CLAUSE_MIN_SUM, DIAL_FALSE, DIAL_TRUE, NEGATION_SUM};
use itertools::Itertools;

/// Kind of a verification check, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    DialCoverage,
    ExtraDials,
    BinaryPins,
    Negations,
    Clauses,
}

impl CheckKind {
    pub fn label(self) -> &'static str {
        match self {
            CheckKind::DialCoverage => "Dial coverage",
            CheckKind::ExtraDials => "Extra dials",
            CheckKind::BinaryPins => "Binary pins",
            CheckKind::Negations => "Negations",
            CheckKind::Clauses => "OR clauses",
        }
    }
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub kind: CheckKind,
    pub passed: bool,
    pub message: String,
    pub violations: Vec<String>,
}

impl CheckResult {
    fn from_violations(kind: CheckKind, checked: usize, violations: Vec<String>) -> Self {
        let passed = violations.is_empty();
        let message = if passed {
            format!("{}: all {} satisfied", kind.label(), checked)
        } else {
            format!("{}: {} of {} violated", kind.label(), violations.len(), checked)
        };
        Self {
            kind,
            passed,
            message,
            violations,
        }
    }
}

/// Detailed result of verifying a solution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// True iff every executed check passed
    pub valid: bool,
    pub checks: Vec<CheckResult>,
    /// Value checks were skipped because the dial set was wrong
    pub halted_early: bool,
}

impl VerificationReport {
    pub fn violations(&self) -> impl Iterator<Item = &String> {
        self.checks.iter().flat_map(|check| check.violations.iter())
    }

    pub fn check(&self, kind: CheckKind) -> Option<&CheckResult> {
        self.checks.iter().find(|check| check.kind == kind)
    }

    /// Turn an invalid report into [`LockError::InvalidSolution`] naming the first violation
    pub fn into_result(self) -> LockResult<()> {
        if self.valid {
            return Ok(());
        }
        let first = self
            .violations()
            .next()
            .cloned()
            .unwrap_or_else(|| "verification failed".to_string());
        Err(LockError::InvalidSolution(first))
    }
}

impl std::fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for check in &self.checks {
            let mark = if check.passed { "PASS" } else { "FAIL" };
            writeln!(f, "[{}] {}", mark, check.message)?;
            for violation in &check.violations {
                writeln!(f, "    {}", violation)?;
            }
        }
        if self.halted_early {
            writeln!(f, "Value checks skipped: dial set does not match the instance")?;
        }
        write!(f, "Result: {}", if self.valid { "VALID" } else { "INVALID" })
    }
}

/// Verify `solution` against `instance`.
///
/// Coverage and extra-dial checks run first; if either fails the report
/// stops there. Otherwise every pin, negation and clause is checked and all
/// violations are collected.
pub fn verify(instance: &LockInstance, solution: &LockSolution) -> VerificationReport {
    let mut checks = Vec::with_capacity(5);

    let missing: Vec<String> = instance
        .dials()
        .filter(|dial| solution.value(*dial).is_none())
        .map(|dial| format!("Dial {} is not set", dial))
        .collect();
    checks.push(CheckResult::from_violations(CheckKind::DialCoverage, instance.num_dials, missing));

    let extra: Vec<String> = solution
        .dial_values
        .keys()
        .filter(|dial| !instance.contains_index(**dial))
        .map(|dial| format!("Dial {} is out of range [1, {}]", dial, instance.num_dials))
        .collect();
    checks.push(CheckResult::from_violations(
        CheckKind::ExtraDials,
        solution.dial_values.len(),
        extra,
    ));

    if checks.iter().any(|check| !check.passed) {
        return VerificationReport {
            valid: false,
            checks,
            halted_early: true,
        };
    }

    // Coverage passed, so every dial has a value; missing ones read as
    // FALSE only to keep this total.
    let value = |dial: usize| solution.value(dial).unwrap_or(DIAL_FALSE);

    let pins: Vec<String> = instance
        .binary_pins
        .iter()
        .filter(|dial| {
            let v = value(**dial);
            v != DIAL_FALSE && v != DIAL_TRUE
        })
        .map(|dial| format!("Dial {} = {} (expected 1 or 6)", dial, value(*dial)))
        .collect();
    checks.push(CheckResult::from_violations(
        CheckKind::BinaryPins,
        instance.binary_pins.len(),
        pins,
    ));

    let negations: Vec<String> = instance
        .negations
        .iter()
        .filter_map(|&[i, j]| {
            let (vi, vj) = (value(i), value(j));
            (vi + vj != NEGATION_SUM).then(|| {
                format!(
                    "Not({}, {}): {} + {} = {} (expected {})",
                    i,
                    j,
                    vi,
                    vj,
                    vi + vj,
                    NEGATION_SUM
                )
            })
        })
        .collect();
    checks.push(CheckResult::from_violations(
        CheckKind::Negations,
        instance.negations.len(),
        negations,
    ));

    let clauses: Vec<String> = instance
        .clauses
        .iter()
        .filter_map(|clause| {
            let values: Vec<i64> = clause.iter().map(|&dial| value(dial)).collect();
            let sum: i64 = values.iter().sum();
            (sum < CLAUSE_MIN_SUM).then(|| {
                format!(
                    "OR({}): {} = {} (expected >= {})",
                    clause.iter().join(", "),
                    values.iter().join(" + "),
                    sum,
                    CLAUSE_MIN_SUM
                )
            })
        })
        .collect();
    checks.push(CheckResult::from_violations(
        CheckKind::Clauses,
        instance.clauses.len(),
        clauses,
    ));

    let valid = checks.iter().all(|check| check.passed);
    log::debug!(
        "Verified solution against {} dials: {}",
        instance.num_dials,
        if valid { "valid" } else { "invalid" }
    );
    VerificationReport {
        valid,
        checks,
        halted_early: false,
    }
}
