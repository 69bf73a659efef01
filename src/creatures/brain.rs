//! The creature controller: surprise, reward shaping, learning, survival
//!
//! One brain per creature. Each processed timestep runs the full cognitive
//! cycle: how surprising was this perception, how rewarding was the outcome,
//! how does that move mood and learned action values, and what did survival
//! cost. Death itself is detected by the engine, not here.

use crate::actions::Action;
use crate::core::config::{CreatureConfig, MoodConfig, RewardConfig};
use crate::core::types::CreatureId;
use crate::creatures::mood::{MoodModel, MoodUpdate, Situation};
use crate::llm::oracle::AdvisoryOracle;
use crate::world::resolution::{ActionOutcome, Effect};
use ahash::AHashMap;
use rand::Rng;
use std::collections::VecDeque;

/// Bound on remembered perception snapshots
const PERCEPTION_MEMORY: usize = 20;
/// Surprise reported for the very first perception of a lifetime
const FIRST_PERCEPTION_SURPRISE: f32 = 0.5;
/// Smoothing factor of the action-value moving average
const ACTION_VALUE_ALPHA: f32 = 0.1;
/// Weight of learned action values when merged into mood biases
const LEARNED_VALUE_WEIGHT: f32 = 0.2;
/// Tokens spent when accepting an oracle suggestion
pub const SUGGESTION_TOKEN_COST: u32 = 3;

const AROUSAL_HIGH: f32 = 0.7;
const AROUSAL_LOW: f32 = 0.3;
const VALENCE_POSITIVE: f32 = 0.3;
const VALENCE_NEGATIVE: f32 = -0.3;

const HEALTH_CAP: f32 = 100.0;
const ENERGY_CAP: f32 = 100.0;
const FOOD_HEAL: f32 = 20.0;
const FOOD_ENERGY: f32 = 30.0;

/// What a creature perceives in one tick
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct Perception {
    pub food_count: u32,
    pub obstacle_count: u32,
    pub creature_count: u32,
    /// Mean sound amplitude over the perception window
    pub sound_level: f32,
}

/// Outcome of one cognitive cycle
#[derive(Debug, Clone)]
pub struct TimestepSummary {
    pub mood: MoodUpdate,
    pub surprise: f32,
    pub reward: f32,
    pub tokens_gained: u32,
    pub reflection: Option<String>,
    pub reflection_cost_eur: f64,
}

pub struct Brain {
    id: CreatureId,
    pub health: f32,
    pub energy: f32,
    pub action_tokens: u32,
    max_tokens: u32,
    energy_cost_per_step: f32,
    health_decay_rate: f32,
    reflection_probability: f32,
    mood: MoodModel,
    memory: VecDeque<Perception>,
    action_values: AHashMap<Action, f32>,
    rewards: RewardConfig,
}

impl Brain {
    pub fn new(
        id: CreatureId,
        creature_config: &CreatureConfig,
        mood_config: MoodConfig,
        rewards: RewardConfig,
    ) -> Self {
        Self {
            id,
            health: creature_config.starting_health,
            energy: creature_config.starting_energy,
            action_tokens: creature_config.initial_action_tokens,
            max_tokens: creature_config.max_action_tokens,
            energy_cost_per_step: creature_config.energy_cost_per_step,
            health_decay_rate: creature_config.health_decay_when_no_energy,
            reflection_probability: creature_config.reflection_probability,
            mood: MoodModel::new(mood_config),
            memory: VecDeque::with_capacity(PERCEPTION_MEMORY),
            action_values: AHashMap::new(),
            rewards,
        }
    }

    pub fn id(&self) -> CreatureId {
        self.id
    }

    pub fn mood(&self) -> &MoodModel {
        &self.mood
    }

    pub fn action_value(&self, action: Action) -> f32 {
        self.action_values.get(&action).copied().unwrap_or(0.0)
    }

    /// Run the full cognitive cycle for one processed timestep
    pub fn process_timestep(
        &mut self,
        perception: &Perception,
        action_taken: Action,
        outcome: &ActionOutcome,
        oracle: &dyn AdvisoryOracle,
        rng: &mut impl Rng,
    ) -> TimestepSummary {
        let surprise = self.perceptual_surprise(perception);
        let reward = self.total_reward(surprise, outcome);

        let situation = Situation {
            food_nearby: perception.food_count > 0,
            creatures_nearby: perception.creature_count,
            sound_level: perception.sound_level,
        };
        let mood = self.mood.process_experience(&situation, reward);

        self.update_action_value(action_taken, reward);

        let tokens_gained = (surprise * 10.0).floor() as u32;
        self.action_tokens = (self.action_tokens + tokens_gained).min(self.max_tokens);

        if outcome.effect == Effect::FoundFood {
            self.health = (self.health + FOOD_HEAL).min(HEALTH_CAP);
            self.energy = (self.energy + FOOD_ENERGY).min(ENERGY_CAP);
        }
        self.energy -= self.energy_cost_per_step;
        if self.energy <= 0.0 {
            self.health -= self.health_decay_rate;
        }

        let mut reflection = None;
        let mut reflection_cost_eur = 0.0;
        if oracle.available() && rng.gen::<f32>() < self.reflection_probability {
            if let Some(r) = oracle.reflect(self.id, &self.reflection_context(perception, outcome))
            {
                reflection_cost_eur = r.cost_eur;
                reflection = Some(r.text);
            }
        }

        TimestepSummary {
            mood,
            surprise,
            reward,
            tokens_gained,
            reflection,
            reflection_cost_eur,
        }
    }

    /// Surprise from how different this perception is from the last one
    ///
    /// The weighted sum is divided by 3.0 on top of the weights summing to
    /// one; that scaling is a legacy constant kept for behavioral parity.
    fn perceptual_surprise(&mut self, perception: &Perception) -> f32 {
        let surprise = match self.memory.back() {
            None => FIRST_PERCEPTION_SURPRISE,
            Some(last) => {
                let food_change =
                    (perception.food_count as f32 - last.food_count as f32).abs();
                let creature_change =
                    (perception.creature_count as f32 - last.creature_count as f32).abs();
                let sound_change = (perception.sound_level - last.sound_level).abs();
                ((food_change * 0.3 + creature_change * 0.3 + sound_change * 0.4) / 3.0).min(1.0)
            }
        };

        self.memory.push_back(*perception);
        if self.memory.len() > PERCEPTION_MEMORY {
            self.memory.pop_front();
        }
        surprise
    }

    /// Combine the surprise baseline with outcome-contingent rewards
    fn total_reward(&self, surprise: f32, outcome: &ActionOutcome) -> f32 {
        let mut reward = surprise * self.rewards.surprise_multiplier;

        match outcome.effect {
            Effect::FoundFood => reward += self.rewards.food_reward,
            Effect::MadeSound if outcome.creatures_responded > 0 => {
                reward += self.rewards.social_sound_reward * outcome.creatures_responded as f32;
            }
            Effect::Collision => reward += self.rewards.collision_penalty,
            _ => {}
        }

        if outcome.near_creatures > 0 {
            reward += self.rewards.proximity_reward * outcome.near_creatures.min(3) as f32;
        }

        reward
    }

    fn update_action_value(&mut self, action: Action, reward: f32) {
        let value = self.action_values.entry(action).or_insert(0.0);
        *value = (1.0 - ACTION_VALUE_ALPHA) * *value + ACTION_VALUE_ALPHA * reward;
    }

    /// Mood-derived action preferences, merged with learned values
    pub fn action_bias(&self) -> AHashMap<Action, f32> {
        let mut biases = AHashMap::new();
        let valence = self.mood.valence();
        let arousal = self.mood.arousal();

        // High arousal: explore and be loud
        if arousal > AROUSAL_HIGH {
            biases.insert(Action::Explore, 0.3);
            biases.insert(Action::MakeSoundHigh, 0.2);
        }
        // Low arousal: conserve
        if arousal < AROUSAL_LOW {
            biases.insert(Action::Stay, 0.3);
            biases.insert(Action::Listen, 0.2);
        }
        // Positive mood: social sounds plus a fixed directional preference
        if valence > VALENCE_POSITIVE {
            biases.insert(Action::MakeSoundLow, 0.2);
            biases.insert(Action::MoveNorth, 0.1);
        }
        // Negative mood: avoidance
        if valence < VALENCE_NEGATIVE {
            biases.insert(Action::MoveSouth, 0.2);
            biases.insert(Action::Stay, 0.1);
        }

        for (&action, &value) in &self.action_values {
            *biases.entry(action).or_insert(0.0) += value * LEARNED_VALUE_WEIGHT;
        }

        biases
    }

    /// Heuristic stream-of-consciousness line for display and telemetry
    pub fn internal_monologue(&self) -> String {
        let mut words: Vec<&str> = Vec::new();

        if self.mood.valence() > 0.5 {
            words.push("happy");
        } else if self.mood.valence() < -0.5 {
            words.push("sad");
        }
        if self.health < 30.0 {
            words.push("hungry");
        }
        if self.energy < 30.0 {
            words.push("tired");
        }

        if let Some(last) = self.memory.back() {
            if last.food_count > 0 {
                words.push("food near");
            }
            if last.creature_count > 0 {
                words.push("creature near");
            }
            if last.sound_level > 0.5 {
                words.push("loud");
            }
        }

        if words.is_empty() {
            "...".into()
        } else {
            words.join(" ")
        }
    }

    fn reflection_context(
        &self,
        perception: &Perception,
        outcome: &ActionOutcome,
    ) -> serde_json::Value {
        serde_json::json!({
            "perception": perception,
            "outcome": outcome,
            "mood": {
                "valence": self.mood.valence(),
                "arousal": self.mood.arousal(),
            },
            "health": self.health,
            "energy": self.energy,
        })
    }
}
