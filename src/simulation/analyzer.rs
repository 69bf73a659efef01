//! Offline emergence analysis
//!
//! Watches the sound-event stream for rhythmic structure and summarizes the
//! population's mood. Purely observational: nothing here feeds back into the
//! simulation.

use crate::core::config::AnalysisConfig;
use crate::core::types::{CreatureId, Tick};
use crate::simulation::engine::Creature;
use ahash::AHashSet;
use std::collections::VecDeque;

/// Minimum recorded sounds before rhythm detection is attempted
const MIN_EVENTS_FOR_RHYTHM: usize = 20;

/// One emitted sound, as seen by the analyzer
#[derive(Debug, Clone, Copy)]
pub struct SoundEvent {
    pub step: Tick,
    pub creature: CreatureId,
    pub frequency: f32,
}

/// Summary of recent sound activity
#[derive(Debug, Clone)]
pub struct SoundPatterns {
    pub total_sounds: usize,
    pub unique_emitters: usize,
    pub mean_interval: f32,
    pub interval_std: f32,
    /// Set when intervals between sounds are regular enough to call a rhythm
    pub rhythmic: bool,
}

/// Population mood summary over live creatures
#[derive(Debug, Clone)]
pub struct MoodStats {
    pub alive: usize,
    pub mean_valence: f32,
    pub valence_std: f32,
    pub mean_arousal: f32,
    pub arousal_std: f32,
}

pub struct EmergenceAnalyzer {
    sound_history: VecDeque<SoundEvent>,
    window: usize,
    rhythm_threshold: f32,
}

impl EmergenceAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            sound_history: VecDeque::with_capacity(config.sound_history_window),
            window: config.sound_history_window,
            rhythm_threshold: config.rhythm_detection_threshold,
        }
    }

    /// Record one emitted sound
    pub fn record(&mut self, event: SoundEvent) {
        self.sound_history.push_back(event);
        if self.sound_history.len() > self.window {
            self.sound_history.pop_front();
        }
    }

    /// Analyze the recorded sound history
    ///
    /// A rhythm is flagged when the standard deviation of the intervals
    /// between consecutive sounds is small relative to their mean. Sparse
    /// histories are never rhythmic; regularity needs evidence.
    pub fn sound_patterns(&self) -> SoundPatterns {
        let total_sounds = self.sound_history.len();
        let unique_emitters = self
            .sound_history
            .iter()
            .map(|e| e.creature)
            .collect::<AHashSet<_>>()
            .len();

        let intervals: Vec<f32> = self
            .sound_history
            .iter()
            .zip(self.sound_history.iter().skip(1))
            .map(|(a, b)| (b.step - a.step) as f32)
            .collect();
        let (mean_interval, interval_std) = mean_and_std(&intervals);

        let rhythmic = total_sounds > MIN_EVENTS_FOR_RHYTHM
            && mean_interval > 0.0
            && interval_std < mean_interval * self.rhythm_threshold;

        SoundPatterns {
            total_sounds,
            unique_emitters,
            mean_interval,
            interval_std,
            rhythmic,
        }
    }

    /// Summarize the mood of the live population
    pub fn mood_stats(&self, creatures: &[Creature]) -> MoodStats {
        let (valences, arousals): (Vec<f32>, Vec<f32>) = creatures
            .iter()
            .filter(|c| c.alive)
            .map(|c| (c.brain.mood().valence(), c.brain.mood().arousal()))
            .unzip();

        let (mean_valence, valence_std) = mean_and_std(&valences);
        let (mean_arousal, arousal_std) = mean_and_std(&arousals);

        MoodStats {
            alive: valences.len(),
            mean_valence,
            valence_std,
            mean_arousal,
            arousal_std,
        }
    }
}

fn mean_and_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32;
    (mean, variance.sqrt())
}
