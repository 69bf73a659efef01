pub mod brain;
pub mod factory;
pub mod mood;
pub mod selector;

pub use brain::{Brain, Perception, TimestepSummary};
pub use factory::create_creatures;
pub use mood::{MoodModel, MoodUpdate, Situation};
pub use selector::ActionSelector;
