//! Little Dreamers - Entry Point
//!
//! Runs the creature simulation headless: builds the world and population
//! from configuration, steps the engine to completion, and prints periodic
//! emergence reports along the way.

use little_dreamers::core::config::SimulationConfig;
use little_dreamers::core::error::{DreamerError, Result};
use little_dreamers::llm::client::HttpOracle;
use little_dreamers::llm::oracle::{AdvisoryOracle, NoopOracle};
use little_dreamers::simulation::analyzer::{EmergenceAnalyzer, SoundEvent};
use little_dreamers::simulation::engine::{SimulationEngine, SimulationEvent};
use little_dreamers::world::resolution::Effect;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "little-dreamers", about = "A grid world of small social dreamers")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of simulation steps to run
    #[arg(long)]
    steps: Option<u64>,

    /// Number of creatures to spawn
    #[arg(long)]
    creatures: Option<usize>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress the periodic emergence reports
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("little_dreamers=info")),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw).map_err(|e| DreamerError::InvalidConfig(e.to_string()))?
        }
        None => SimulationConfig::default(),
    };
    if let Some(steps) = cli.steps {
        config.max_steps = steps;
    }
    if let Some(creatures) = cli.creatures {
        config.creatures.initial_count = creatures;
    }
    if let Some(seed) = cli.seed {
        config.random_seed = Some(seed);
    }

    let oracle: Box<dyn AdvisoryOracle> = match HttpOracle::from_env() {
        Ok(oracle) => Box::new(oracle),
        Err(_) => {
            tracing::warn!("LLM_API_KEY not set - creatures run without an advisor");
            Box::new(NoopOracle)
        }
    };

    let mut engine = SimulationEngine::new(&config, oracle)?;
    let mut analyzer = EmergenceAnalyzer::new(&config.analysis);

    println!("=== LITTLE DREAMERS ===");
    println!(
        "{} creatures in a {}x{} world, {} steps",
        engine.alive_count(),
        config.world.width,
        config.world.height,
        config.max_steps
    );

    while engine.step_count() < config.max_steps {
        for event in engine.step() {
            if let SimulationEvent::Action {
                step,
                creature,
                action,
                effect: Effect::MadeSound,
                ..
            } = &event
            {
                if let Some(frequency) = action.sound_frequency() {
                    analyzer.record(SoundEvent {
                        step: *step,
                        creature: *creature,
                        frequency,
                    });
                }
            }
            if let SimulationEvent::Action {
                creature,
                reflection: Some(text),
                ..
            } = &event
            {
                if !cli.quiet {
                    println!("  {creature} reflects: {text}");
                }
            }
        }

        if !cli.quiet && engine.step_count() % config.analysis.analyze_every == 0 {
            report(&engine, &analyzer);
        }

        if engine.all_dead() {
            println!("All creatures have died at step {}.", engine.step_count());
            break;
        }
    }

    println!(
        "Run finished: {} steps, {} of {} creatures alive, {} food cells left.",
        engine.step_count(),
        engine.alive_count(),
        engine.creatures().len(),
        engine.world().food_cells()
    );
    Ok(())
}

fn report(engine: &SimulationEngine, analyzer: &EmergenceAnalyzer) {
    let sounds = analyzer.sound_patterns();
    let moods = analyzer.mood_stats(engine.creatures());

    println!("--- step {} ---", engine.step_count());
    println!(
        "  alive: {}  valence: {:.2} (±{:.2})  arousal: {:.2} (±{:.2})",
        moods.alive, moods.mean_valence, moods.valence_std, moods.mean_arousal, moods.arousal_std
    );
    println!(
        "  sounds: {} from {} creatures{}",
        sounds.total_sounds,
        sounds.unique_emitters,
        if sounds.rhythmic {
            format!(
                " - rhythmic! interval {:.1}±{:.1}",
                sounds.mean_interval, sounds.interval_std
            )
        } else {
            String::new()
        }
    );

    for creature in engine.creatures().iter().filter(|c| c.alive).take(3) {
        println!("  {} thinks: {}", creature.id, creature.brain.internal_monologue());
    }
}
