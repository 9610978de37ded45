//! Random lock instance generation at tunable difficulty

pub mod difficulty;
pub mod generator;

pub use difficulty::{Difficulty, TierParams};
pub use generator::InstanceGenerator;
