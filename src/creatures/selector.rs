//! Stochastic, mood-influenced action selection
//!
//! Selection never argmaxes. Mood biases and learned values tilt a weighted
//! draw over the whole catalog, urgent needs tilt it harder, and an oracle
//! suggestion (when one is bought with tokens) short-circuits the draw.

use crate::actions::Action;
use crate::core::config::ActionConfig;
use crate::creatures::brain::{Brain, Perception, SUGGESTION_TOKEN_COST};
use crate::llm::oracle::{AdvisoryOracle, MoodSummary, PerceptionSummary};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Floor weight so no action ever becomes impossible
const MIN_WEIGHT: f32 = 0.01;
/// Uniform base weight before biases are applied
const BASE_WEIGHT: f32 = 0.1;
/// Minimum token balance required to consult the oracle
const SUGGESTION_MIN_TOKENS: u32 = 5;

const URGENT_HEALTH: f32 = 70.0;
const URGENT_ENERGY: f32 = 20.0;

/// Picks one action per creature per tick
#[derive(Debug, Clone)]
pub struct ActionSelector {
    suggestion_probability: f32,
}

impl ActionSelector {
    pub fn new(config: &ActionConfig) -> Self {
        Self {
            suggestion_probability: config.suggestion_probability,
        }
    }

    /// Choose an action for this creature given its current perception
    pub fn select_action(
        &self,
        brain: &mut Brain,
        perception: &Perception,
        oracle: &dyn AdvisoryOracle,
        rng: &mut impl Rng,
    ) -> Action {
        let mut biases = brain.action_bias();

        // Urgent needs override mood: eat when hurt near food, rest when spent
        if perception.food_count > 0 && brain.health < URGENT_HEALTH {
            biases.insert(Action::Eat, 0.8);
            biases.insert(Action::MoveNorth, 0.4);
        }
        if brain.energy < URGENT_ENERGY {
            biases.insert(Action::Stay, 0.7);
        }

        if oracle.available()
            && brain.action_tokens > SUGGESTION_MIN_TOKENS
            && rng.gen::<f32>() < self.suggestion_probability
        {
            let perception_summary = PerceptionSummary {
                food: perception.food_count,
                creatures: perception.creature_count,
                avg_sound: perception.sound_level,
            };
            let mood_summary = MoodSummary {
                valence: brain.mood().valence(),
                arousal: brain.mood().arousal(),
                health: brain.health,
                energy: brain.energy,
            };
            if let Some(action) =
                oracle.suggest_action(&perception_summary, &mood_summary, &Action::ALL)
            {
                brain.action_tokens = brain.action_tokens.saturating_sub(SUGGESTION_TOKEN_COST);
                tracing::debug!(creature = %brain.id(), %action, "following oracle suggestion");
                return action;
            }
        }

        let weights: Vec<f32> = Action::ALL
            .iter()
            .map(|action| {
                let bias = biases.get(action).copied().unwrap_or(0.0);
                (BASE_WEIGHT + bias).max(MIN_WEIGHT)
            })
            .collect();

        // Weights are bounded below by MIN_WEIGHT, so the distribution is
        // always constructible
        match WeightedIndex::new(&weights) {
            Ok(dist) => Action::ALL[dist.sample(rng)],
            Err(_) => Action::Stay,
        }
    }
}
