//! Lock instance: dials plus the constraints linking them

use crate::error::{LockError, LockResult};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// Dial position that stands for FALSE
pub const DIAL_FALSE: i64 = 1;
/// Dial position that stands for TRUE
pub const DIAL_TRUE: i64 = 6;
/// Required sum of two negation-linked dials
pub const NEGATION_SUM: i64 = DIAL_FALSE + DIAL_TRUE;
/// Minimum sum of an OR clause (one TRUE, two FALSE)
pub const CLAUSE_MIN_SUM: i64 = DIAL_TRUE + 2 * DIAL_FALSE;

/// A lock puzzle that encodes a SAT problem.
///
/// Each dial is a Boolean variable: position 1 means FALSE, position 6 means TRUE.
/// Dials are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockInstance {
    /// Total number of dials
    pub num_dials: usize,
    /// Dials restricted to positions {1, 6}
    pub binary_pins: Vec<usize>,
    /// Negation links: `dial_i + dial_j = 7`
    pub negations: Vec<[usize; 2]>,
    /// OR clauses: `dial_i + dial_j + dial_k >= 8`
    pub clauses: Vec<[usize; 3]>,
}

/// Largest dial count; dials double as 32-bit SAT variables
pub const MAX_DIALS: usize = i32::MAX as usize;

/// Persisted shape of an instance, indices kept signed until checked
#[derive(Debug, Deserialize)]
pub(crate) struct RawLockInstance {
    num_dials: i64,
    #[serde(default)]
    binary_pins: Vec<i64>,
    #[serde(default)]
    negations: Vec<Vec<i64>>,
    #[serde(default)]
    clauses: Vec<Vec<i64>>,
}

impl TryFrom<RawLockInstance> for LockInstance {
    type Error = LockError;

    /// Runs the full structural validation, then narrows the indices
    fn try_from(raw: RawLockInstance) -> LockResult<Self> {
        let check = StructureCheck::new(raw.num_dials)?;
        check.pins(&raw.binary_pins)?;
        for pair in &raw.negations {
            check.negation(pair)?;
        }
        for triple in &raw.clauses {
            check.clause(triple)?;
        }

        // Every index is now within [1, MAX_DIALS]
        let dial = |index: i64| index as usize;
        Ok(Self {
            num_dials: dial(raw.num_dials),
            binary_pins: raw.binary_pins.into_iter().map(dial).collect(),
            negations: raw.negations.iter().map(|p| [dial(p[0]), dial(p[1])]).collect(),
            clauses: raw
                .clauses
                .iter()
                .map(|c| [dial(c[0]), dial(c[1]), dial(c[2])])
                .collect(),
        })
    }
}

/// Structural rules shared by in-memory and persisted instances.
///
/// Order: dial count, pin ranges, pin duplicates, then each negation
/// (arity, range, distinct) and each clause (arity, range, distinct).
struct StructureCheck {
    num_dials: i64,
}

impl StructureCheck {
    fn new(num_dials: i64) -> LockResult<Self> {
        if num_dials < 1 {
            return Err(LockError::InvalidInstance(
                "Number of dials must be at least 1".to_string(),
            ));
        }
        if num_dials > MAX_DIALS as i64 {
            return Err(LockError::InvalidInstance(format!(
                "Number of dials must not exceed {}, got {}",
                MAX_DIALS, num_dials
            )));
        }
        Ok(Self { num_dials })
    }

    fn range(&self, role: &str, dial: i64) -> LockResult<()> {
        if (1..=self.num_dials).contains(&dial) {
            Ok(())
        } else {
            Err(LockError::InvalidInstance(format!(
                "{} dial {} is out of range [1, {}]",
                role, dial, self.num_dials
            )))
        }
    }

    fn pins(&self, pins: &[i64]) -> LockResult<()> {
        for &dial in pins {
            self.range("Binary pin", dial)?;
        }
        let mut seen = HashSet::with_capacity(pins.len());
        if let Some(dial) = pins.iter().find(|&&dial| !seen.insert(dial)) {
            return Err(LockError::InvalidInstance(format!(
                "Duplicate binary pins detected (dial {})",
                dial
            )));
        }
        Ok(())
    }

    fn negation(&self, pair: &[i64]) -> LockResult<()> {
        if pair.len() != 2 {
            return Err(LockError::InvalidInstance(format!(
                "Negation must have exactly 2 dials, got {}",
                pair.len()
            )));
        }
        for &dial in pair {
            self.range("Negation", dial)?;
        }
        if pair[0] == pair[1] {
            return Err(LockError::InvalidInstance(format!(
                "Negation links must connect distinct dials, got [{}, {}]",
                pair[0], pair[1]
            )));
        }
        Ok(())
    }

    fn clause(&self, triple: &[i64]) -> LockResult<()> {
        if triple.len() != 3 {
            return Err(LockError::InvalidInstance(format!(
                "Clause must have exactly 3 dials, got {}",
                triple.len()
            )));
        }
        for &dial in triple {
            self.range("Clause", dial)?;
        }
        if !triple.iter().all_unique() {
            return Err(LockError::InvalidInstance(format!(
                "Clause dials must be distinct, got [{}]",
                triple.iter().join(", ")
            )));
        }
        Ok(())
    }
}

/// Signed view of an in-memory index; anything past `i64::MAX` is out of range anyway
fn signed(dial: usize) -> i64 {
    i64::try_from(dial).unwrap_or(i64::MAX)
}

impl LockInstance {
    /// Create an instance with every dial binary-pinned and no constraints
    pub fn fully_pinned(num_dials: usize) -> Self {
        Self {
            num_dials,
            binary_pins: (1..=num_dials).collect(),
            negations: Vec::new(),
            clauses: Vec::new(),
        }
    }

    /// All dial indices of this instance
    pub fn dials(&self) -> RangeInclusive<usize> {
        1..=self.num_dials
    }

    /// Whether `dial` names a dial of this instance
    pub fn contains_dial(&self, dial: usize) -> bool {
        (1..=self.num_dials).contains(&dial)
    }

    /// Like [`contains_dial`](Self::contains_dial) for a signed index, as found in persisted solutions
    pub fn contains_index(&self, index: i64) -> bool {
        usize::try_from(index).is_ok_and(|dial| self.contains_dial(dial))
    }

    /// Check the structural invariants, reporting the first violation
    pub fn validate(&self) -> LockResult<()> {
        let check = StructureCheck::new(signed(self.num_dials))?;
        let pins: Vec<i64> = self.binary_pins.iter().map(|&dial| signed(dial)).collect();
        check.pins(&pins)?;
        for pair in &self.negations {
            check.negation(&pair.map(signed))?;
        }
        for clause in &self.clauses {
            check.clause(&clause.map(signed))?;
        }
        Ok(())
    }

    /// Parse and validate an instance from its JSON form
    pub fn from_json(content: &str) -> LockResult<Self> {
        let raw: RawLockInstance = serde_json::from_str(content)
            .map_err(|e| LockError::MalformedPersistedData(format!("lock instance: {}", e)))?;
        Self::try_from(raw)
    }

    /// Render the instance in its persisted JSON form
    pub fn to_json(&self) -> LockResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LockError::MalformedPersistedData(format!("lock instance: {}", e)))
    }
}

impl std::fmt::Display for LockInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "LockInstance:")?;
        writeln!(f, "  Dials: {}", self.num_dials)?;
        writeln!(f, "  Binary pins: {} dials", self.binary_pins.len())?;
        writeln!(f, "  Negation links: {}", self.negations.len())?;
        writeln!(f, "  OR clauses: {}", self.clauses.len())?;
        Ok(())
    }
}
