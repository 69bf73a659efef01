//! Emergent mood from reward prediction errors
//!
//! Mood is not scripted: valence and arousal drift with how much better or
//! worse the world turned out than the creature predicted. Predictions come
//! from a coarse categorical memory of situations, which is what lets mood
//! generalize across similar moments without any real world model.

use crate::core::config::MoodConfig;
use ahash::AHashMap;
use serde::Serialize;
use std::collections::VecDeque;

/// Bound on the recent-outcome history kept per situation
const OUTCOMES_PER_SITUATION: usize = 10;
/// Amplitude split between a "quiet" and a "loud" situation
const SOUND_LEVEL_SPLIT: f32 = 0.5;

/// The situational features the mood model conditions on
#[derive(Debug, Clone, Copy)]
pub struct Situation {
    pub food_nearby: bool,
    pub creatures_nearby: u32,
    pub sound_level: f32,
}

/// Categorical fingerprint of a situation
///
/// Deliberately coarse: a boolean food flag, the raw creature count, and a
/// binary loud/quiet split. Prediction generalizes only at this granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SituationKey {
    food_nearby: bool,
    creatures_nearby: u32,
    sound_high: bool,
}

impl From<&Situation> for SituationKey {
    fn from(situation: &Situation) -> Self {
        Self {
            food_nearby: situation.food_nearby,
            creatures_nearby: situation.creatures_nearby,
            sound_high: situation.sound_level > SOUND_LEVEL_SPLIT,
        }
    }
}

/// Mood snapshot returned after each experience
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MoodUpdate {
    pub valence: f32,
    pub arousal: f32,
    pub prediction_error: f32,
}

/// Per-creature mood state driven by prediction error
#[derive(Debug, Clone)]
pub struct MoodModel {
    valence: f32,
    arousal: f32,
    expected_reward: f32,
    /// Long-term fallback prediction for situations never seen before
    reward_baseline: f32,
    situation_outcomes: AHashMap<SituationKey, VecDeque<f32>>,
    config: MoodConfig,
}

impl MoodModel {
    pub fn new(config: MoodConfig) -> Self {
        Self {
            valence: config.initial_valence,
            arousal: config.initial_arousal,
            expected_reward: 0.0,
            reward_baseline: 0.0,
            situation_outcomes: AHashMap::new(),
            config,
        }
    }

    pub fn valence(&self) -> f32 {
        self.valence
    }

    pub fn arousal(&self) -> f32 {
        self.arousal
    }

    pub fn expected_reward(&self) -> f32 {
        self.expected_reward
    }

    /// Update mood from one experienced (situation, reward) pair
    ///
    /// Arousal rises with the magnitude of the prediction error and then
    /// decays (increase first, decay after, every call), so it trends toward
    /// zero between surprises. Valence follows the signed error slowly.
    pub fn process_experience(&mut self, situation: &Situation, actual_reward: f32) -> MoodUpdate {
        let prediction_error = actual_reward - self.expected_reward;

        self.arousal = (self.arousal + prediction_error.abs() * self.config.fast_learning_rate)
            .clamp(0.0, 1.0);
        self.arousal *= self.config.arousal_decay;

        self.valence = (self.valence + prediction_error * self.config.slow_learning_rate)
            .clamp(-1.0, 1.0);

        let bucket = self
            .situation_outcomes
            .entry(SituationKey::from(situation))
            .or_default();
        bucket.push_back(actual_reward);
        if bucket.len() > OUTCOMES_PER_SITUATION {
            bucket.pop_front();
        }

        self.expected_reward = self.predict_reward(situation);

        MoodUpdate {
            valence: self.valence,
            arousal: self.arousal,
            prediction_error,
        }
    }

    /// Expected reward for a situation: mean of its recent outcomes, or the
    /// baseline when the bucket is new
    fn predict_reward(&self, situation: &Situation) -> f32 {
        match self.situation_outcomes.get(&SituationKey::from(situation)) {
            Some(bucket) if !bucket.is_empty() => {
                bucket.iter().sum::<f32>() / bucket.len() as f32
            }
            _ => self.reward_baseline,
        }
    }
}
