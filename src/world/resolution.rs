//! Non-deterministic action resolution
//!
//! The world accepts or rejects each proposed action with a configured
//! probability, then executes the accepted ones against the grid and the
//! shared position table. The table is updated incrementally as creatures
//! resolve in roster order, so a later creature sees earlier creatures'
//! already-moved positions within the same tick. That ordering dependency is
//! deliberate and load-bearing for collision outcomes.

use crate::actions::Action;
use crate::core::config::ActionConfig;
use crate::core::types::{CreatureId, Direction, Position};
use crate::world::grid::{Cell, GridWorld};
use ahash::AHashMap;
use rand::Rng;
use serde::Serialize;

/// What an accepted (or blocked) action did to the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    None,
    ActionBlocked,
    Collision,
    FoundFood,
    MadeSound,
}

/// Result of one resolved action proposal
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub accepted: bool,
    pub new_position: Position,
    pub effect: Effect,
    /// Creatures within hearing range (Manhattan <= 3) of an emitted sound
    pub creatures_responded: u32,
    /// Other live creatures within Manhattan <= 2 of the final position
    pub near_creatures: u32,
    /// Set when the proposed position was out of bounds and clamped
    pub position_corrected: bool,
}

impl ActionOutcome {
    fn blocked(position: Position, corrected: bool) -> Self {
        Self {
            accepted: false,
            new_position: position,
            effect: Effect::ActionBlocked,
            creatures_responded: 0,
            near_creatures: 0,
            position_corrected: corrected,
        }
    }
}

/// Hearing range for sound responders, in Manhattan distance
const HEARING_RANGE: usize = 3;
/// Social proximity range for the near-creature count
const SOCIAL_RANGE: usize = 2;
/// Amplitude of an emitted creature sound
const EMIT_AMPLITUDE: f32 = 0.8;

/// World model owning the grid and the shared creature position table
pub struct WorldModel {
    world: GridWorld,
    positions: AHashMap<CreatureId, Position>,
    acceptance_rate: f32,
}

impl WorldModel {
    pub fn new(world: GridWorld, config: &ActionConfig) -> Self {
        Self {
            world,
            positions: AHashMap::new(),
            acceptance_rate: config.acceptance_rate,
        }
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut GridWorld {
        &mut self.world
    }

    /// Register a creature's position in the shared table
    pub fn track_creature(&mut self, id: CreatureId, position: Position) {
        self.positions.insert(id, position);
    }

    /// Drop a dead creature from the table so it no longer blocks movement
    /// or counts as a neighbor
    pub fn remove_creature(&mut self, id: CreatureId) {
        self.positions.remove(&id);
    }

    pub fn tracked_position(&self, id: CreatureId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    /// Propose an action on behalf of a creature and resolve it in one call
    ///
    /// Out-of-range positions are clamped with a recorded correction. The
    /// acceptance draw is the only rejection path: a rejected action leaves
    /// the position unchanged and skips execution entirely.
    pub fn propose_action(
        &mut self,
        id: CreatureId,
        action: Action,
        current: Position,
        rng: &mut impl Rng,
    ) -> ActionOutcome {
        let (current, corrected) = self.clamp_position(current);
        if corrected {
            tracing::warn!(creature = %id, x = current.x, y = current.y, "clamped out-of-range position");
        }
        self.positions.insert(id, current);

        if rng.gen::<f32>() >= self.acceptance_rate {
            return ActionOutcome::blocked(current, corrected);
        }

        let mut outcome = self.execute(id, action, current, rng);
        outcome.position_corrected = corrected;
        self.positions.insert(id, outcome.new_position);
        outcome
    }

    fn clamp_position(&self, pos: Position) -> (Position, bool) {
        let clamped = Position::new(
            pos.x.min(self.world.width() - 1),
            pos.y.min(self.world.height() - 1),
        );
        (clamped, clamped != pos)
    }

    fn execute(
        &mut self,
        id: CreatureId,
        action: Action,
        current: Position,
        rng: &mut impl Rng,
    ) -> ActionOutcome {
        let mut new_pos = current;
        let mut effect = Effect::None;

        let direction = action.direction().or_else(|| {
            (action == Action::Explore).then(|| Direction::ALL[rng.gen_range(0..4)])
        });

        if let Some(dir) = direction {
            if let Some(candidate) = self.bounded_step(current, dir) {
                if self.world.cell(candidate.x, candidate.y) == Cell::Obstacle {
                    effect = Effect::Collision;
                } else if self.occupied_by_other(id, candidate) {
                    effect = Effect::Collision;
                } else {
                    if self.world.cell(candidate.x, candidate.y) == Cell::Food {
                        // Moving onto food finds it but does not consume it;
                        // only an explicit eat clears the cell.
                        effect = Effect::FoundFood;
                    }
                    new_pos = candidate;
                }
            }
        }

        if action == Action::Eat && self.world.cell(current.x, current.y) == Cell::Food {
            self.world.set_cell(current.x, current.y, Cell::Empty);
            effect = Effect::FoundFood;
        }

        let mut creatures_responded = 0;
        if let Some(frequency) = action.sound_frequency() {
            self.world
                .update_sound(current.x, current.y, frequency, EMIT_AMPLITUDE);
            effect = Effect::MadeSound;
            creatures_responded = self.count_within(id, current, HEARING_RANGE);
        }

        let near_creatures = self.count_within(id, new_pos, SOCIAL_RANGE);

        ActionOutcome {
            accepted: true,
            new_position: new_pos,
            effect,
            creatures_responded,
            near_creatures,
            position_corrected: false,
        }
    }

    /// One step in `dir`, or `None` when that would leave the world
    fn bounded_step(&self, from: Position, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let nx = from.x.checked_add_signed(dx)?;
        let ny = from.y.checked_add_signed(dy)?;
        self.world.in_bounds(nx, ny).then_some(Position::new(nx, ny))
    }

    fn occupied_by_other(&self, id: CreatureId, pos: Position) -> bool {
        self.positions
            .iter()
            .any(|(other, &other_pos)| *other != id && other_pos == pos)
    }

    fn count_within(&self, id: CreatureId, pos: Position, range: usize) -> u32 {
        self.positions
            .iter()
            .filter(|(other, other_pos)| **other != id && other_pos.manhattan(&pos) <= range)
            .count() as u32
    }
}
