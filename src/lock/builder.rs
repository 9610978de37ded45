//! Incremental construction of lock instances, used by the interactive generator

use super::LockInstance;
use crate::error::{LockError, LockResult};
use itertools::Itertools;

/// Builds a lock instance one constraint at a time.
///
/// Every dial is binary-pinned on creation. Each added constraint is checked
/// immediately so the instance is valid at every step.
#[derive(Debug, Clone)]
pub struct InstanceBuilder {
    instance: LockInstance,
}

impl InstanceBuilder {
    pub fn new(num_dials: usize) -> LockResult<Self> {
        let instance = LockInstance::fully_pinned(num_dials);
        instance.validate()?;
        Ok(Self { instance })
    }

    /// Add a negation link `dial_i + dial_j = 7`
    pub fn add_negation(&mut self, dial_i: usize, dial_j: usize) -> LockResult<()> {
        self.check_dials(&[dial_i, dial_j])?;
        self.instance.negations.push([dial_i, dial_j]);
        Ok(())
    }

    /// Add an OR clause `dial_i + dial_j + dial_k >= 8`
    pub fn add_clause(&mut self, dial_i: usize, dial_j: usize, dial_k: usize) -> LockResult<()> {
        self.check_dials(&[dial_i, dial_j, dial_k])?;
        self.instance.clauses.push([dial_i, dial_j, dial_k]);
        Ok(())
    }

    /// Parse `count` comma-separated dial indices, e.g. `"1, 2, 3"`
    pub fn parse_dials(&self, input: &str, count: usize) -> LockResult<Vec<usize>> {
        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        if parts.len() != count {
            return Err(LockError::InvalidInstance(format!(
                "Expected {} values, got {}",
                count,
                parts.len()
            )));
        }

        let dials = parts
            .iter()
            .map(|part| {
                part.parse::<usize>().map_err(|_| {
                    LockError::InvalidInstance(format!(
                        "'{}' is not a dial index; enter comma-separated integers (e.g. 1, 2, 3)",
                        part
                    ))
                })
            })
            .collect::<LockResult<Vec<_>>>()?;

        self.check_dials(&dials)?;
        Ok(dials)
    }

    fn check_dials(&self, dials: &[usize]) -> LockResult<()> {
        if let Some(dial) = dials.iter().find(|&&d| !self.instance.contains_dial(d)) {
            return Err(LockError::InvalidInstance(format!(
                "Dial {} is out of range [1, {}]",
                dial, self.instance.num_dials
            )));
        }
        if !dials.iter().all_unique() {
            return Err(LockError::InvalidInstance(format!(
                "Dials must be distinct, got [{}]",
                dials.iter().join(", ")
            )));
        }
        Ok(())
    }

    pub fn instance(&self) -> &LockInstance {
        &self.instance
    }

    /// Validate and hand over the finished instance
    pub fn finish(self) -> LockResult<LockInstance> {
        self.instance.validate()?;
        Ok(self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pins_all_dials() {
        let builder = InstanceBuilder::new(4).unwrap();
        assert_eq!(builder.instance().binary_pins, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_builder_rejects_zero_dials() {
        assert!(InstanceBuilder::new(0).is_err());
    }

    #[test]
    fn test_add_constraints() {
        let mut builder = InstanceBuilder::new(4).unwrap();
        builder.add_negation(1, 2).unwrap();
        builder.add_clause(2, 3, 4).unwrap();

        let instance = builder.finish().unwrap();
        assert_eq!(instance.negations, vec![[1, 2]]);
        assert_eq!(instance.clauses, vec![[2, 3, 4]]);
    }

    #[test]
    fn test_add_rejects_bad_dials() {
        let mut builder = InstanceBuilder::new(3).unwrap();
        assert!(builder.add_negation(1, 1).is_err());
        assert!(builder.add_negation(1, 4).is_err());
        assert!(builder.add_clause(1, 2, 2).is_err());
        assert!(builder.instance().negations.is_empty());
        assert!(builder.instance().clauses.is_empty());
    }

    #[test]
    fn test_parse_dials() {
        let builder = InstanceBuilder::new(5).unwrap();
        assert_eq!(builder.parse_dials("1, 2,3", 3).unwrap(), vec![1, 2, 3]);
        assert!(builder.parse_dials("1, 2", 3).is_err());
        assert!(builder.parse_dials("1, x", 2).is_err());
        assert!(builder.parse_dials("1, 6", 2).is_err());
        assert!(builder.parse_dials("4, 4", 2).is_err());
    }
}
