//! The closed action vocabulary
//!
//! Every behavior a creature can attempt is one of these ten actions.
//! External suggestions arrive as free text and are mapped into the enum by
//! `from_suggestion`; anything unrecognized becomes "no suggestion" rather
//! than being coerced.

use crate::core::types::Direction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveNorth,
    MoveSouth,
    MoveEast,
    MoveWest,
    Stay,
    Eat,
    MakeSoundLow,
    MakeSoundHigh,
    Listen,
    Explore,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::MoveNorth,
        Action::MoveSouth,
        Action::MoveEast,
        Action::MoveWest,
        Action::Stay,
        Action::Eat,
        Action::MakeSoundLow,
        Action::MakeSoundHigh,
        Action::Listen,
        Action::Explore,
    ];

    /// Wire name, matching the snake_case serde representation
    pub fn name(&self) -> &'static str {
        match self {
            Action::MoveNorth => "move_north",
            Action::MoveSouth => "move_south",
            Action::MoveEast => "move_east",
            Action::MoveWest => "move_west",
            Action::Stay => "stay",
            Action::Eat => "eat",
            Action::MakeSoundLow => "make_sound_low",
            Action::MakeSoundHigh => "make_sound_high",
            Action::Listen => "listen",
            Action::Explore => "explore",
        }
    }

    /// Fixed movement direction, if this is a cardinal move
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Action::MoveNorth => Some(Direction::North),
            Action::MoveSouth => Some(Direction::South),
            Action::MoveEast => Some(Direction::East),
            Action::MoveWest => Some(Direction::West),
            _ => None,
        }
    }

    /// Sound emission frequency, if this is a sound action
    pub fn sound_frequency(&self) -> Option<f32> {
        match self {
            Action::MakeSoundLow => Some(0.3),
            Action::MakeSoundHigh => Some(0.7),
            _ => None,
        }
    }

    /// Map a free-text oracle suggestion into the vocabulary
    ///
    /// Normalizes the handful of natural-language variations the oracle has
    /// been observed to produce; anything else is `None`.
    pub fn from_suggestion(text: &str) -> Option<Action> {
        let normalized = text.trim().to_lowercase();
        let canonical = match normalized.as_str() {
            "rest" | "wait" => "stay",
            "listen carefully" => "listen",
            "sing low" => "make_sound_low",
            "sing high" => "make_sound_high",
            other => other,
        };
        Action::ALL.into_iter().find(|a| a.name() == canonical)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_ten_actions() {
        assert_eq!(Action::ALL.len(), 10);
    }

    #[test]
    fn test_from_suggestion_exact_names() {
        for action in Action::ALL {
            assert_eq!(Action::from_suggestion(action.name()), Some(action));
        }
    }

    #[test]
    fn test_from_suggestion_synonyms() {
        assert_eq!(Action::from_suggestion("rest"), Some(Action::Stay));
        assert_eq!(Action::from_suggestion("wait"), Some(Action::Stay));
        assert_eq!(Action::from_suggestion("Sing Low"), Some(Action::MakeSoundLow));
        assert_eq!(
            Action::from_suggestion("listen carefully"),
            Some(Action::Listen)
        );
        assert_eq!(Action::from_suggestion("  EXPLORE \n"), Some(Action::Explore));
    }

    #[test]
    fn test_from_suggestion_rejects_unknown() {
        assert_eq!(Action::from_suggestion("fly away"), None);
        assert_eq!(Action::from_suggestion(""), None);
        assert_eq!(Action::from_suggestion("move up"), None);
    }

    #[test]
    fn test_sound_frequencies() {
        assert_eq!(Action::MakeSoundLow.sound_frequency(), Some(0.3));
        assert_eq!(Action::MakeSoundHigh.sound_frequency(), Some(0.7));
        assert_eq!(Action::Listen.sound_frequency(), None);
    }

    #[test]
    fn test_serde_names_match_wire_names() {
        for action in Action::ALL {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.name()));
        }
    }
}
