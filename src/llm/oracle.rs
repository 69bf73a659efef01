//! The advisory oracle seam
//!
//! Creatures can optionally consult an external advisor for an action
//! suggestion or a short narrative reflection. The simulation must run
//! identically without one, so the capability is a trait injected at
//! construction with a no-op default. Advice is strictly advisory: a
//! malformed or missing answer is "no suggestion", never an error.

use crate::actions::Action;
use crate::core::types::CreatureId;
use serde::Serialize;

/// Compact perception digest sent to the oracle
#[derive(Debug, Clone, Serialize)]
pub struct PerceptionSummary {
    pub food: u32,
    pub creatures: u32,
    pub avg_sound: f32,
}

/// Compact internal-state digest sent to the oracle
#[derive(Debug, Clone, Serialize)]
pub struct MoodSummary {
    pub valence: f32,
    pub arousal: f32,
    pub health: f32,
    pub energy: f32,
}

/// A narrative reflection and what it cost to produce
#[derive(Debug, Clone)]
pub struct Reflection {
    pub text: String,
    pub cost_eur: f64,
}

/// External advisor capability
///
/// Implementations must be non-blocking in spirit: enforce short timeouts
/// and map every failure to `None` so a slow or absent advisor can never
/// stall action selection or a tick.
pub trait AdvisoryOracle {
    /// Whether consulting this oracle is worthwhile at all
    fn available(&self) -> bool {
        true
    }

    /// Suggest one action out of `allowed`, or nothing
    fn suggest_action(
        &self,
        perception: &PerceptionSummary,
        mood: &MoodSummary,
        allowed: &[Action],
    ) -> Option<Action>;

    /// Produce a short first-person reflection for a creature, or nothing
    fn reflect(&self, creature: CreatureId, context: &serde_json::Value) -> Option<Reflection>;
}

/// Default oracle: never available, never answers
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOracle;

impl AdvisoryOracle for NoopOracle {
    fn available(&self) -> bool {
        false
    }

    fn suggest_action(
        &self,
        _perception: &PerceptionSummary,
        _mood: &MoodSummary,
        _allowed: &[Action],
    ) -> Option<Action> {
        None
    }

    fn reflect(&self, _creature: CreatureId, _context: &serde_json::Value) -> Option<Reflection> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_oracle_is_unavailable_and_silent() {
        let oracle = NoopOracle;
        assert!(!oracle.available());
        let perception = PerceptionSummary {
            food: 1,
            creatures: 0,
            avg_sound: 0.0,
        };
        let mood = MoodSummary {
            valence: 0.0,
            arousal: 0.5,
            health: 100.0,
            energy: 100.0,
        };
        assert!(oracle
            .suggest_action(&perception, &mood, &Action::ALL)
            .is_none());
        assert!(oracle
            .reflect(CreatureId(0), &serde_json::json!({}))
            .is_none());
    }
}
