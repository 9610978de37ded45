//! Translation between lock instances and CNF
//!
//! Dial `i` is SAT variable `i`; TRUE means position 6, FALSE means position 1.
//!
//! Binary pins produce no clauses. Every SAT variable is already two-valued,
//! so restricting a dial to {1, 6} is implied by the variable domain. A dial
//! domain with more than two positions would need explicit clauses here.

use super::constraints::{Clause, ClauseSet};
use super::solver::Model;
use crate::error::{LockError, LockResult};
use crate::lock::{LockInstance, LockSolution, DIAL_FALSE, DIAL_TRUE};

/// Encode `instance` as CNF.
///
/// Negation `(i, j)` becomes `(i ∨ j) ∧ (¬i ∨ ¬j)`; OR clause `(i, j, k)`
/// becomes `(i ∨ j ∨ k)`. Negation clauses come first, in instance order,
/// followed by the OR clauses.
pub fn encode(instance: &LockInstance) -> LockResult<ClauseSet> {
    instance.validate()?;

    let mut clauses = ClauseSet::new(instance.num_dials);
    for &[dial_i, dial_j] in &instance.negations {
        let (i, j) = (variable(dial_i)?, variable(dial_j)?);
        clauses.push(Clause::binary(i, j));
        clauses.push(Clause::binary(-i, -j));
    }
    for &[dial_i, dial_j, dial_k] in &instance.clauses {
        clauses.push(Clause::ternary(
            variable(dial_i)?,
            variable(dial_j)?,
            variable(dial_k)?,
        ));
    }

    log::debug!(
        "Encoded {} dials into {} clauses ({} from negations, {} from OR clauses)",
        instance.num_dials,
        clauses.len(),
        instance.negations.len() * 2,
        instance.clauses.len()
    );
    Ok(clauses)
}

/// Decode an oracle model into dial positions.
///
/// Variables the oracle left unassigned default to FALSE (position 1), which
/// keeps decoded solutions canonical. Variables beyond the instance's dials
/// are ignored.
pub fn decode(model: &Model, instance: &LockInstance) -> LockSolution {
    let dial_values = instance
        .dials()
        .map(|dial| {
            let assigned = variable(dial).ok().and_then(|var| model.get(&var));
            let value = match assigned {
                Some(true) => DIAL_TRUE,
                Some(false) | None => DIAL_FALSE,
            };
            (dial as i64, value)
        })
        .collect();
    LockSolution::new(dial_values)
}

/// SAT variable of `dial`; solvers take 32-bit signed literals
fn variable(dial: usize) -> LockResult<i32> {
    i32::try_from(dial).map_err(|_| {
        LockError::InvalidInstance(format!("Dial {} has no SAT variable (limit {})", dial, i32::MAX))
    })
}

/// Size of the CNF encoding of an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingStatistics {
    pub num_variables: usize,
    pub num_clauses: usize,
    pub negation_clauses: usize,
    pub or_clauses: usize,
}

impl EncodingStatistics {
    pub fn of(instance: &LockInstance) -> Self {
        let negation_clauses = instance.negations.len() * 2;
        let or_clauses = instance.clauses.len();
        Self {
            num_variables: instance.num_dials,
            num_clauses: negation_clauses + or_clauses,
            negation_clauses,
            or_clauses,
        }
    }
}

impl std::fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Encoding Statistics:")?;
        writeln!(f, "  Variables: {}", self.num_variables)?;
        writeln!(f, "  Clauses: {}", self.num_clauses)?;
        writeln!(f, "    From negations: {}", self.negation_clauses)?;
        writeln!(f, "    From OR clauses: {}", self.or_clauses)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::MAX_DIALS;

    fn mixed_instance() -> LockInstance {
        LockInstance {
            num_dials: 4,
            binary_pins: vec![1, 2, 3, 4],
            negations: vec![[1, 2]],
            clauses: vec![[1, 3, 4], [2, 3, 4]],
        }
    }

    #[test]
    fn test_encoding_layout() {
        let clauses = encode(&mixed_instance()).unwrap();
        assert_eq!(clauses.num_variables, 4);
        assert_eq!(
            clauses.clauses,
            vec![
                Clause::binary(1, 2),
                Clause::binary(-1, -2),
                Clause::ternary(1, 3, 4),
                Clause::ternary(2, 3, 4),
            ]
        );
    }

    #[test]
    fn test_binary_pins_add_no_clauses() {
        let instance = LockInstance::fully_pinned(5);
        let clauses = encode(&instance).unwrap();
        assert!(clauses.is_empty());
        assert_eq!(clauses.num_variables, 5);
    }

    #[test]
    fn test_encode_rejects_invalid_instance() {
        let mut instance = mixed_instance();
        instance.clauses.push([1, 1, 2]);
        assert!(matches!(encode(&instance), Err(LockError::InvalidInstance(_))));
    }

    #[test]
    fn test_dials_beyond_variable_range_are_rejected() {
        assert_eq!(variable(MAX_DIALS).unwrap(), i32::MAX);
        assert!(matches!(variable(MAX_DIALS + 1), Err(LockError::InvalidInstance(_))));

        let oversized = LockInstance {
            num_dials: MAX_DIALS + 1,
            binary_pins: vec![],
            negations: vec![],
            clauses: vec![],
        };
        assert!(matches!(encode(&oversized), Err(LockError::InvalidInstance(_))));
    }

    #[test]
    fn test_decode_maps_truth_values() {
        let instance = mixed_instance();
        let model: Model = [(1, true), (2, false), (3, true), (4, false)].into_iter().collect();
        let solution = decode(&model, &instance);
        assert_eq!(solution, LockSolution::from_truth_values(&[true, false, true, false]));
    }

    #[test]
    fn test_decode_defaults_unassigned_to_false() {
        let instance = mixed_instance();
        let model: Model = [(3, true)].into_iter().collect();
        let solution = decode(&model, &instance);

        assert_eq!(solution.value(1), Some(DIAL_FALSE));
        assert_eq!(solution.value(2), Some(DIAL_FALSE));
        assert_eq!(solution.value(3), Some(DIAL_TRUE));
        assert_eq!(solution.value(4), Some(DIAL_FALSE));
    }

    #[test]
    fn test_decode_ignores_foreign_variables() {
        let instance = LockInstance::fully_pinned(2);
        let model: Model = [(1, true), (9, true)].into_iter().collect();
        let solution = decode(&model, &instance);
        assert_eq!(solution.dial_values.len(), 2);
        assert_eq!(solution.value(9), None);
    }

    #[test]
    fn test_statistics() {
        let stats = EncodingStatistics::of(&mixed_instance());
        assert_eq!(stats.num_variables, 4);
        assert_eq!(stats.negation_clauses, 2);
        assert_eq!(stats.or_clauses, 2);
        assert_eq!(stats.num_clauses, encode(&mixed_instance()).unwrap().len());
    }
}
