//! End-to-end behavior of the world protocol and the engine

use little_dreamers::actions::Action;
use little_dreamers::core::config::{
    ActionConfig, CreatureConfig, MoodConfig, RewardConfig, SimulationConfig, WorldConfig,
};
use little_dreamers::core::types::{CreatureId, Position};
use little_dreamers::creatures::brain::Brain;
use little_dreamers::llm::oracle::NoopOracle;
use little_dreamers::simulation::engine::{SimulationEngine, SimulationEvent};
use little_dreamers::world::grid::{Cell, GridWorld};
use little_dreamers::world::resolution::{Effect, WorldModel};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A small deterministic arena: no rejections, no obstacles
fn arena(food_density: f32, rng: &mut ChaCha8Rng) -> WorldModel {
    let world = GridWorld::new(
        WorldConfig {
            width: 20,
            height: 20,
            food_density,
            obstacle_density: 0.0,
            food_respawn_probability: 0.0,
            ..WorldConfig::default()
        },
        rng,
    );
    WorldModel::new(
        world,
        &ActionConfig {
            acceptance_rate: 1.0,
            ..ActionConfig::default()
        },
    )
}

fn brain(id: u32) -> Brain {
    Brain::new(
        CreatureId(id),
        &CreatureConfig::default(),
        MoodConfig::default(),
        RewardConfig::default(),
    )
}

#[test]
fn eating_consumes_the_food_and_heals_with_a_cap() {
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let mut model = arena(0.1, &mut rng);

    // Park the creature on a known food cell
    let position = Position::new(7, 7);
    model.world_mut().set_cell(position.x, position.y, Cell::Food);
    model.track_creature(CreatureId(0), position);

    let outcome = model.propose_action(CreatureId(0), Action::Eat, position, &mut rng);
    assert_eq!(outcome.effect, Effect::FoundFood);
    assert_eq!(outcome.new_position, position);
    assert_eq!(model.world().cell(position.x, position.y), Cell::Empty);

    let mut eater = brain(0);
    eater.health = 90.0;
    eater.energy = 90.0;
    let view = model.world().local_view(position.x, position.y, 5);
    let perception = little_dreamers::creatures::brain::Perception {
        food_count: view.food_count,
        obstacle_count: view.obstacle_count,
        creature_count: 0,
        sound_level: view.mean_amplitude,
    };
    eater.process_timestep(&perception, Action::Eat, &outcome, &NoopOracle, &mut rng);

    // +20 health capped at 100; +30 energy capped, minus the step cost
    assert!((eater.health - 100.0).abs() < 1e-6);
    assert!((eater.energy - 99.0).abs() < 1e-6);
}

#[test]
fn a_neighbor_within_hearing_range_responds_to_sound() {
    let mut rng = ChaCha8Rng::seed_from_u64(22);
    let mut model = arena(0.0, &mut rng);

    let singer = Position::new(5, 5);
    let listener = Position::new(5, 6);
    model.track_creature(CreatureId(0), singer);
    model.track_creature(CreatureId(1), listener);

    let outcome = model.propose_action(CreatureId(0), Action::MakeSoundLow, singer, &mut rng);
    assert_eq!(outcome.effect, Effect::MadeSound);
    assert_eq!(outcome.creatures_responded, 1);
    assert!(outcome.near_creatures >= 1);
    assert!(model.world().sound_at(singer.x, singer.y).amplitude > 0.0);
}

#[test]
fn moving_into_an_occupied_cell_is_a_collision_that_goes_nowhere() {
    let mut rng = ChaCha8Rng::seed_from_u64(23);
    let mut model = arena(0.0, &mut rng);

    let mover = Position::new(5, 5);
    let blocker = Position::new(6, 5);
    model.track_creature(CreatureId(0), mover);
    model.track_creature(CreatureId(1), blocker);

    let outcome = model.propose_action(CreatureId(0), Action::MoveEast, mover, &mut rng);
    assert_eq!(outcome.effect, Effect::Collision);
    assert_eq!(outcome.new_position, mover);
    assert_eq!(model.tracked_position(CreatureId(0)), Some(mover));
}

#[test]
fn a_vacated_cell_is_free_for_creatures_processed_later_the_same_step() {
    let mut rng = ChaCha8Rng::seed_from_u64(24);
    let mut model = arena(0.0, &mut rng);

    let front = Position::new(5, 5);
    let back = Position::new(4, 5);
    model.track_creature(CreatureId(0), front);
    model.track_creature(CreatureId(1), back);

    let first = model.propose_action(CreatureId(0), Action::MoveEast, front, &mut rng);
    assert_eq!(first.new_position, Position::new(6, 5));

    let second = model.propose_action(CreatureId(1), Action::MoveEast, back, &mut rng);
    assert_ne!(second.effect, Effect::Collision);
    assert_eq!(second.new_position, front);
}

#[test]
fn a_starving_population_dies_out_and_the_run_reports_it() {
    let mut config = SimulationConfig::default();
    config.world.width = 25;
    config.world.height = 25;
    config.world.food_density = 0.0;
    config.world.food_respawn_probability = 0.0;
    config.creatures.initial_count = 4;
    config.creatures.starting_health = 3.0;
    config.creatures.starting_energy = 1.0;
    config.random_seed = Some(99);

    let mut engine = SimulationEngine::new(&config, Box::new(NoopOracle)).unwrap();

    let mut deaths = 0;
    for _ in 0..200 {
        for event in engine.step() {
            if matches!(event, SimulationEvent::Death { .. }) {
                deaths += 1;
            }
        }
        if engine.all_dead() {
            break;
        }
    }

    assert!(engine.all_dead(), "population survived with nothing to eat");
    assert_eq!(deaths, 4);
    // Dead creatures no longer occupy the shared position table
    for creature in engine.creatures() {
        assert!(!creature.alive);
    }
}

#[test]
fn the_step_counter_advances_once_per_step_regardless_of_deaths() {
    let mut config = SimulationConfig::default();
    config.world.width = 25;
    config.world.height = 25;
    config.creatures.initial_count = 3;
    config.random_seed = Some(17);

    let mut engine = SimulationEngine::new(&config, Box::new(NoopOracle)).unwrap();
    for expected in 1..=50u64 {
        engine.step();
        assert_eq!(engine.step_count(), expected);
    }
}

#[test]
fn events_serialize_to_tagged_json() {
    let mut config = SimulationConfig::default();
    config.world.width = 25;
    config.world.height = 25;
    config.creatures.initial_count = 2;
    config.random_seed = Some(41);

    let mut engine = SimulationEngine::new(&config, Box::new(NoopOracle)).unwrap();
    let events = engine.step();
    assert!(!events.is_empty());

    for event in events {
        let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(json["event"], "action");
        assert!(json["surprise"].is_number());
        assert!(json["creature"].is_number());
    }
}
