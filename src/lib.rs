//! Little Dreamers - emergent creature simulation
//!
//! A population of simple creatures inhabits a discrete 2D grid world.
//! Each creature carries an emergent mood (valence/arousal driven by reward
//! prediction error), learns action values from outcomes, and communicates
//! through a propagating sound field. The world stochastically accepts or
//! rejects proposed actions, so behavior stays exploratory by construction.

pub mod actions;
pub mod core;
pub mod creatures;
pub mod llm;
pub mod simulation;
pub mod world;
