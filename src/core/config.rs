//! Simulation configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose.
//! The defaults are the reference values the behavioral tests assume; the
//! core never reads configuration from anywhere but these injected structs.

use serde::Deserialize;

/// Configuration for the grid world
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World width in cells
    pub width: usize,

    /// World height in cells
    pub height: usize,

    /// Initial food density
    ///
    /// `round(width * height * density)` placement attempts; attempts landing
    /// on occupied cells are lost, so density is a target, not a guarantee.
    pub food_density: f32,

    /// Initial obstacle density (same placement rule as food)
    pub obstacle_density: f32,

    /// Per-step probability of a small food respawn batch
    pub food_respawn_probability: f32,

    /// Density of each respawn batch
    pub food_respawn_amount: f32,

    /// Multiplier applied to the whole sound field every world step
    ///
    /// At 0.9 an undisturbed sound fades below 1% amplitude in ~44 steps.
    pub sound_decay_rate: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            food_density: 0.1,
            obstacle_density: 0.05,
            food_respawn_probability: 0.01,
            food_respawn_amount: 0.005,
            sound_decay_rate: 0.9,
        }
    }
}

/// Configuration for creature resources and costs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    /// Number of creatures spawned at simulation start
    pub initial_count: usize,

    /// Health at birth (death at <= 0, healing capped at 100)
    pub starting_health: f32,

    /// Energy at birth (refills capped at 100)
    pub starting_energy: f32,

    /// Radius of the square perception window
    pub perception_radius: usize,

    /// Action tokens at birth
    pub initial_action_tokens: u32,

    /// Hard cap on accumulated action tokens
    pub max_action_tokens: u32,

    /// Energy drained every processed timestep, regardless of action
    pub energy_cost_per_step: f32,

    /// Extra health drained per step while energy is at or below zero
    pub health_decay_when_no_energy: f32,

    /// Per-step probability of asking the oracle for a reflection
    pub reflection_probability: f32,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            initial_count: 10,
            starting_health: 100.0,
            starting_energy: 100.0,
            perception_radius: 5,
            initial_action_tokens: 10,
            max_action_tokens: 50,
            energy_cost_per_step: 1.0,
            health_decay_when_no_energy: 0.1,
            reflection_probability: 0.1,
        }
    }
}

/// Configuration for the emergent mood model
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    /// Arousal learning rate (fast, responds to |prediction error|)
    pub fast_learning_rate: f32,

    /// Valence learning rate (slow, responds to signed prediction error)
    pub slow_learning_rate: f32,

    /// Multiplier applied to arousal after every update, so arousal trends
    /// toward zero between surprises
    pub arousal_decay: f32,

    /// Valence at birth, in [-1, 1]
    pub initial_valence: f32,

    /// Arousal at birth, in [0, 1]
    pub initial_arousal: f32,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            fast_learning_rate: 0.1,
            slow_learning_rate: 0.01,
            arousal_decay: 0.99,
            initial_valence: 0.0,
            initial_arousal: 0.5,
        }
    }
}

/// Configuration for action acceptance and selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Probability that the world accepts a proposed action
    ///
    /// The sole source of action non-determinism independent of intent.
    pub acceptance_rate: f32,

    /// Probability of consulting the advisory oracle during selection
    /// (also requires an available oracle and more than 5 action tokens)
    pub suggestion_probability: f32,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            acceptance_rate: 0.9,
            suggestion_probability: 0.2,
        }
    }
}

/// Configuration for reward shaping
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Base reward per unit of perceptual surprise
    pub surprise_multiplier: f32,

    /// Reward for finding food
    pub food_reward: f32,

    /// Reward per creature that heard an emitted sound
    pub social_sound_reward: f32,

    /// Penalty for colliding with an obstacle or another creature
    pub collision_penalty: f32,

    /// Reward per nearby creature (counted up to 3)
    pub proximity_reward: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            surprise_multiplier: 0.5,
            food_reward: 1.0,
            social_sound_reward: 0.3,
            collision_penalty: -0.2,
            proximity_reward: 0.1,
        }
    }
}

/// Configuration for emergence analysis
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run the analyzer every this many steps
    pub analyze_every: u64,

    /// Number of recent sound events kept for rhythm detection
    pub sound_history_window: usize,

    /// A rhythm is flagged when interval std < mean * this threshold
    pub rhythm_detection_threshold: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analyze_every: 500,
            sound_history_window: 50,
            rhythm_detection_threshold: 0.5,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub creatures: CreatureConfig,
    pub mood: MoodConfig,
    pub actions: ActionConfig,
    pub rewards: RewardConfig,
    pub analysis: AnalysisConfig,

    /// Stop the run loop after this many steps
    pub max_steps: u64,

    /// Seed for the engine RNG; a random seed is drawn when absent
    pub random_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            creatures: CreatureConfig::default(),
            mood: MoodConfig::default(),
            actions: ActionConfig::default(),
            rewards: RewardConfig::default(),
            analysis: AnalysisConfig::default(),
            max_steps: 10_000,
            random_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Validate configuration for internal consistency
    ///
    /// Range checks live here, outside the core components, which accept the
    /// knobs as-is once validated.
    pub fn validate(&self) -> Result<(), String> {
        if self.world.width < 2 || self.world.height < 2 {
            return Err(format!(
                "world must be at least 2x2, got {}x{}",
                self.world.width, self.world.height
            ));
        }
        for (name, value) in [
            ("food_density", self.world.food_density),
            ("obstacle_density", self.world.obstacle_density),
            ("food_respawn_probability", self.world.food_respawn_probability),
            ("food_respawn_amount", self.world.food_respawn_amount),
            ("sound_decay_rate", self.world.sound_decay_rate),
            ("acceptance_rate", self.actions.acceptance_rate),
            ("suggestion_probability", self.actions.suggestion_probability),
            ("arousal_decay", self.mood.arousal_decay),
            ("reflection_probability", self.creatures.reflection_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be in [0, 1], got {value}"));
            }
        }
        if !(0.0..=1.0).contains(&self.mood.fast_learning_rate)
            || !(0.0..=1.0).contains(&self.mood.slow_learning_rate)
        {
            return Err("learning rates must be in [0, 1]".into());
        }
        if !(-1.0..=1.0).contains(&self.mood.initial_valence) {
            return Err(format!(
                "initial_valence must be in [-1, 1], got {}",
                self.mood.initial_valence
            ));
        }
        if !(0.0..=1.0).contains(&self.mood.initial_arousal) {
            return Err(format!(
                "initial_arousal must be in [0, 1], got {}",
                self.mood.initial_arousal
            ));
        }
        if self.creatures.starting_health <= 0.0 || self.creatures.starting_energy <= 0.0 {
            return Err("starting health and energy must be positive".into());
        }
        if self.creatures.perception_radius == 0 {
            return Err("perception_radius must be at least 1".into());
        }
        if self.creatures.initial_action_tokens > self.creatures.max_action_tokens {
            return Err(format!(
                "initial_action_tokens ({}) exceeds max_action_tokens ({})",
                self.creatures.initial_action_tokens, self.creatures.max_action_tokens
            ));
        }
        if self.analysis.analyze_every == 0 || self.analysis.sound_history_window == 0 {
            return Err("analysis cadence and window must be at least 1".into());
        }
        if self.max_steps == 0 {
            return Err("max_steps must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_reference_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.width, 100);
        assert!((config.world.sound_decay_rate - 0.9).abs() < f32::EPSILON);
        assert!((config.actions.acceptance_rate - 0.9).abs() < f32::EPSILON);
        assert!((config.mood.fast_learning_rate - 0.1).abs() < f32::EPSILON);
        assert!((config.mood.slow_learning_rate - 0.01).abs() < f32::EPSILON);
        assert!((config.mood.arousal_decay - 0.99).abs() < f32::EPSILON);
        assert_eq!(config.creatures.max_action_tokens, 50);
    }

    #[test]
    fn test_rejects_out_of_range_acceptance() {
        let mut config = SimulationConfig::default();
        config.actions.acceptance_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_token_inversion() {
        let mut config = SimulationConfig::default();
        config.creatures.initial_action_tokens = 99;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_with_partial_sections() {
        let config: SimulationConfig = toml::from_str(
            r#"
            max_steps = 100

            [world]
            width = 40
            height = 30

            [actions]
            acceptance_rate = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.world.width, 40);
        assert_eq!(config.world.height, 30);
        assert!((config.actions.acceptance_rate - 1.0).abs() < f32::EPSILON);
        // Untouched sections keep their defaults
        assert_eq!(config.creatures.initial_count, 10);
        assert!(config.validate().is_ok());
    }
}
