//! Lock solution: one position per dial

use super::instance::{LockInstance, CLAUSE_MIN_SUM, DIAL_FALSE, DIAL_TRUE, NEGATION_SUM};
use crate::error::{LockError, LockResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An assignment of positions to dials.
///
/// Values are expected to be 1 or 6, but any integer is accepted so that
/// decoded or hand-written solutions can be checked rather than rejected
/// at load time. Keys are signed for the same reason: a persisted
/// solution naming dial 0 or -1 loads and is reported as an extra dial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSolution {
    pub dial_values: BTreeMap<i64, i64>,
}

impl LockSolution {
    pub fn new(dial_values: BTreeMap<i64, i64>) -> Self {
        Self { dial_values }
    }

    /// Build a solution from truth values, dial `i` taking `values[i - 1]`
    pub fn from_truth_values(values: &[bool]) -> Self {
        let dial_values = values
            .iter()
            .enumerate()
            .map(|(i, &value)| (i as i64 + 1, if value { DIAL_TRUE } else { DIAL_FALSE }))
            .collect();
        Self { dial_values }
    }

    pub fn value(&self, dial: usize) -> Option<i64> {
        let key = i64::try_from(dial).ok()?;
        self.dial_values.get(&key).copied()
    }

    /// Whether `dial` is set to the TRUE position
    pub fn is_true(&self, dial: usize) -> bool {
        self.value(dial) == Some(DIAL_TRUE)
    }

    /// Boolean reading of the solution: position 6 is TRUE, anything else FALSE
    pub fn truth_assignment(&self) -> BTreeMap<i64, bool> {
        self.dial_values
            .iter()
            .map(|(&dial, &value)| (dial, value == DIAL_TRUE))
            .collect()
    }

    /// Check this solution against `instance`, reporting the first violation
    pub fn validate(&self, instance: &LockInstance) -> LockResult<()> {
        for dial in instance.dials() {
            if self.value(dial).is_none() {
                return Err(LockError::InvalidSolution(format!("Dial {} is not set", dial)));
            }
        }

        if let Some(&dial) = self.dial_values.keys().find(|&&d| !instance.contains_index(d)) {
            return Err(LockError::InvalidSolution(format!(
                "Dial {} is out of range [1, {}]",
                dial, instance.num_dials
            )));
        }

        for &dial in &instance.binary_pins {
            let value = self.required(dial)?;
            if value != DIAL_FALSE && value != DIAL_TRUE {
                return Err(LockError::InvalidSolution(format!(
                    "Binary pin dial {} must be 1 or 6, got {}",
                    dial, value
                )));
            }
        }

        for &[dial_i, dial_j] in &instance.negations {
            let (value_i, value_j) = (self.required(dial_i)?, self.required(dial_j)?);
            let sum = value_i + value_j;
            if sum != NEGATION_SUM {
                return Err(LockError::InvalidSolution(format!(
                    "Negation link between dials {} and {} violated: {} + {} = {} (expected {})",
                    dial_i, dial_j, value_i, value_j, sum, NEGATION_SUM
                )));
            }
        }

        for &[dial_i, dial_j, dial_k] in &instance.clauses {
            let values = [
                self.required(dial_i)?,
                self.required(dial_j)?,
                self.required(dial_k)?,
            ];
            let sum: i64 = values.iter().sum();
            if sum < CLAUSE_MIN_SUM {
                return Err(LockError::InvalidSolution(format!(
                    "OR clause for dials ({}, {}, {}) violated: {} + {} + {} = {} (expected >= {})",
                    dial_i, dial_j, dial_k, values[0], values[1], values[2], sum, CLAUSE_MIN_SUM
                )));
            }
        }

        Ok(())
    }

    fn required(&self, dial: usize) -> LockResult<i64> {
        self.value(dial)
            .ok_or_else(|| LockError::InvalidSolution(format!("Dial {} is not set", dial)))
    }

    /// Parse a solution from its JSON form
    pub fn from_json(content: &str) -> LockResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| LockError::MalformedPersistedData(format!("lock solution: {}", e)))
    }

    /// Render the solution in its persisted JSON form
    pub fn to_json(&self) -> LockResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LockError::MalformedPersistedData(format!("lock solution: {}", e)))
    }
}

impl std::fmt::Display for LockSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LockSolution(")?;
        for (i, (dial, value)) in self.dial_values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "D{}={}", dial, value)?;
        }
        write!(f, ")")
    }
}
