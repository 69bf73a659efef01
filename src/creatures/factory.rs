//! Creature construction and initial placement

use crate::core::config::{CreatureConfig, MoodConfig, RewardConfig};
use crate::core::types::{CreatureId, Position};
use crate::creatures::brain::Brain;
use crate::simulation::engine::Creature;
use rand::Rng;

/// Spawns stay this far from the world edge when the world is big enough
const EDGE_MARGIN: usize = 10;

/// One spawn coordinate along an axis of the given extent
///
/// Keeps the edge margin in worlds wide enough to afford one and falls back
/// to the full range in small worlds.
fn spawn_coordinate(limit: usize, rng: &mut impl Rng) -> usize {
    let margin = EDGE_MARGIN.min(limit.saturating_sub(1) / 2);
    let (low, high) = (margin, limit - margin);
    if low < high {
        rng.gen_range(low..high)
    } else {
        rng.gen_range(0..limit)
    }
}

/// Build the starting population with sequential ids
pub fn create_creatures(
    count: usize,
    world_width: usize,
    world_height: usize,
    creature_config: &CreatureConfig,
    mood_config: &MoodConfig,
    rewards: &RewardConfig,
    rng: &mut impl Rng,
) -> Vec<Creature> {
    (0..count)
        .map(|i| {
            let id = CreatureId(i as u32);
            let position = Position::new(
                spawn_coordinate(world_width, rng),
                spawn_coordinate(world_height, rng),
            );
            tracing::debug!(creature = %id, x = position.x, y = position.y, "spawned");
            Creature {
                id,
                brain: Brain::new(id, creature_config, mood_config.clone(), rewards.clone()),
                position,
                alive: true,
                birth_step: 0,
            }
        })
        .collect()
}
