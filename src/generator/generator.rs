//! Random lock instance generation

use super::difficulty::{Difficulty, TierParams};
use crate::error::{LockError, LockResult};
use crate::lock::LockInstance;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Builds random lock instances for a difficulty tier.
///
/// The same seed, base variable count and tier always give the same
/// instance.
pub struct InstanceGenerator<R: Rng = StdRng> {
    rng: R,
}

impl InstanceGenerator<StdRng> {
    /// Deterministic generator
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> InstanceGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate an instance with `base_vars` base variables at `difficulty`
    pub fn generate(&mut self, base_vars: usize, difficulty: Difficulty) -> LockResult<LockInstance> {
        self.generate_with_params(base_vars, &difficulty.params())
    }

    /// Generate an instance from explicit tier parameters.
    ///
    /// Base variables are dials `1..=base_vars`. Each negation pair adds a
    /// partner dial numbered after the base dials, so the total dial count
    /// is `base_vars` plus the number of pairs. Every dial is pinned.
    pub fn generate_with_params(
        &mut self,
        base_vars: usize,
        params: &TierParams,
    ) -> LockResult<LockInstance> {
        if base_vars < 3 {
            return Err(LockError::InvalidGeneratorInput(format!(
                "At least 3 base variables are needed for 3-dial clauses, got {}",
                base_vars
            )));
        }
        params.check().map_err(LockError::InvalidGeneratorInput)?;

        let base: Vec<usize> = (1..=base_vars).collect();

        // Negation partners
        let num_pairs = params.num_negation_pairs(base_vars);
        let mut negated: Vec<usize> = base
            .choose_multiple(&mut self.rng, num_pairs)
            .copied()
            .collect();
        negated.sort_unstable();

        let mut partner_of = HashMap::with_capacity(num_pairs);
        let mut negations = Vec::with_capacity(num_pairs);
        for (offset, &dial) in negated.iter().enumerate() {
            let partner = base_vars + offset + 1;
            partner_of.insert(dial, partner);
            negations.push([dial, partner]);
        }
        let num_dials = base_vars + num_pairs;

        // Overlap core
        let core: Vec<usize> = base
            .choose_multiple(&mut self.rng, params.core_size(base_vars))
            .copied()
            .collect();

        let num_clauses = params.num_clauses(base_vars);
        let mut clauses = Vec::with_capacity(num_clauses);
        for _ in 0..num_clauses {
            let picked = if self.rng.gen_bool(params.core_probability) {
                self.draw_from_core(&core, &base)
            } else {
                base.choose_multiple(&mut self.rng, 3).copied().collect()
            };

            let mut clause = [0usize; 3];
            for (slot, dial) in clause.iter_mut().zip(picked) {
                *slot = match partner_of.get(&dial) {
                    Some(&partner) if self.rng.gen_bool(params.substitution_probability) => partner,
                    _ => dial,
                };
            }
            clauses.push(clause);
        }

        let instance = LockInstance {
            num_dials,
            binary_pins: (1..=num_dials).collect(),
            negations,
            clauses,
        };

        if let Err(e) = instance.validate() {
            log::error!("Generated instance failed validation: {}", e);
            return Err(LockError::InternalConsistency(format!(
                "Generator produced an invalid instance: {}",
                e
            )));
        }

        log::debug!(
            "Generated {} dials ({} base, {} pairs) with {} clauses",
            num_dials,
            base_vars,
            num_pairs,
            instance.clauses.len()
        );
        Ok(instance)
    }

    /// Three distinct base dials, taken from the core when it is large
    /// enough and topped up from the rest of the pool otherwise
    fn draw_from_core(&mut self, core: &[usize], base: &[usize]) -> Vec<usize> {
        let mut picked: Vec<usize> = core.choose_multiple(&mut self.rng, 3).copied().collect();
        if picked.len() < 3 {
            let rest: Vec<usize> = base.iter().copied().filter(|d| !picked.contains(d)).collect();
            let missing = 3 - picked.len();
            picked.extend(rest.choose_multiple(&mut self.rng, missing).copied());
        }
        picked
    }
}
