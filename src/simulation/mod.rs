pub mod analyzer;
pub mod engine;

pub use analyzer::{EmergenceAnalyzer, MoodStats, SoundEvent, SoundPatterns};
pub use engine::{Creature, SimulationEngine, SimulationEvent};
