//! CNF clauses handed to the SAT oracle

use itertools::Itertools;
use std::collections::HashMap;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: i32) -> Self {
        Self { literals: vec![literal] }
    }

    /// Create a binary clause (two literals)
    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self { literals: vec![lit1, lit2] }
    }

    /// Create a ternary clause (three literals)
    pub fn ternary(lit1: i32, lit2: i32, lit3: i32) -> Self {
        Self { literals: vec![lit1, lit2, lit3] }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Largest variable mentioned by this clause
    pub fn max_variable(&self) -> usize {
        self.literals
            .iter()
            .map(|lit| lit.unsigned_abs() as usize)
            .max()
            .unwrap_or(0)
    }

    /// Whether some literal is true under `model`; absent variables count as FALSE
    pub fn is_satisfied_by(&self, model: &HashMap<i32, bool>) -> bool {
        self.literals.iter().any(|&lit| {
            let value = model.get(&lit.abs()).copied().unwrap_or(false);
            if lit > 0 {
                value
            } else {
                !value
            }
        })
    }
}

/// A CNF formula over variables `1..=num_variables`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseSet {
    pub num_variables: usize,
    pub clauses: Vec<Clause>,
}

impl ClauseSet {
    pub fn new(num_variables: usize) -> Self {
        Self {
            num_variables,
            clauses: Vec::new(),
        }
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.clauses.iter()
    }

    /// Largest variable actually used by any clause
    pub fn max_variable(&self) -> usize {
        self.clauses.iter().map(Clause::max_variable).max().unwrap_or(0)
    }

    /// Whether every clause holds under `model`
    pub fn is_satisfied_by(&self, model: &HashMap<i32, bool>) -> bool {
        self.clauses.iter().all(|clause| clause.is_satisfied_by(model))
    }

    /// Render in DIMACS CNF so the formula can be fed to an external solver
    pub fn to_dimacs(&self) -> String {
        let mut output = format!("p cnf {} {}\n", self.num_variables, self.clauses.len());
        for clause in &self.clauses {
            output.push_str(&clause.literals.iter().join(" "));
            output.push_str(" 0\n");
        }
        output
    }
}

impl<'a> IntoIterator for &'a ClauseSet {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}
