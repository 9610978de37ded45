//! Built-in DPLL backend
//!
//! Unit propagation plus chronological backtracking on the most frequent
//! variable. Adequate for the instance sizes the generator produces and
//! usable where no native solver is available. Variables never forced or
//! branched on are left out of the model.

use super::constraints::ClauseSet;
use super::solver::{Model, SatOracle, SolveOutcome};
use crate::error::{LockError, LockResult};
use std::collections::BTreeMap;

type Formula = Vec<Vec<i32>>;

/// Pure-Rust DPLL oracle
#[derive(Debug, Default)]
pub struct DpllOracle {
    decisions: usize,
}

impl DpllOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Branching decisions taken by the most recent solve call
    pub fn decisions(&self) -> usize {
        self.decisions
    }

    fn search(&mut self, mut formula: Formula, model: &mut Model) -> bool {
        loop {
            if formula.is_empty() {
                return true;
            }
            if formula.iter().any(Vec::is_empty) {
                return false;
            }
            match formula.iter().find(|clause| clause.len() == 1) {
                Some(unit) => {
                    let literal = unit[0];
                    model.insert(literal.abs(), literal > 0);
                    formula = assign(&formula, literal);
                }
                None => break,
            }
        }

        let variable = branching_variable(&formula);
        self.decisions += 1;

        for literal in [variable, -variable] {
            let mut branch = model.clone();
            branch.insert(variable, literal > 0);
            if self.search(assign(&formula, literal), &mut branch) {
                *model = branch;
                return true;
            }
        }
        false
    }
}

impl SatOracle for DpllOracle {
    fn name(&self) -> &'static str {
        "dpll"
    }

    fn solve(&mut self, clauses: &ClauseSet) -> LockResult<SolveOutcome> {
        if clauses.iter().any(|clause| clause.is_empty()) {
            return Err(LockError::Solver(
                "Cannot add empty clause (unsatisfiable)".to_string(),
            ));
        }

        self.decisions = 0;
        let formula: Formula = clauses.iter().map(|clause| clause.literals.clone()).collect();
        let mut model = Model::new();

        if self.search(formula, &mut model) {
            Ok(SolveOutcome::Satisfiable(model))
        } else {
            Ok(SolveOutcome::Unsatisfiable)
        }
    }
}

/// Simplify `formula` under `literal` being true
fn assign(formula: &Formula, literal: i32) -> Formula {
    formula
        .iter()
        .filter(|clause| !clause.contains(&literal))
        .map(|clause| clause.iter().copied().filter(|&lit| lit != -literal).collect())
        .collect()
}

/// Most frequent variable, lowest index on ties
fn branching_variable(formula: &Formula) -> i32 {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for literal in formula.iter().flatten() {
        *counts.entry(literal.abs()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .fold((0, 0), |best, (var, count)| if count > best.1 { (var, count) } else { best })
        .0
}
