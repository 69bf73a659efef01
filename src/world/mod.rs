pub mod grid;
pub mod resolution;

pub use grid::{Cell, GridWorld, LocalView, SoundCell};
pub use resolution::{ActionOutcome, Effect, WorldModel};
