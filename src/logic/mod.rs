pub mod engine;
pub mod normalizer;

pub use engine::RuleEngine;
pub use normalizer::TargetInstant;
