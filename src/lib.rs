//! Simulation core of a turn-based roguelike set in an office building: the
//! tile and actor model, floor generation, per-actor AI and the actions they
//! drive.

pub mod actions;
pub mod ai;
pub mod config;
pub mod data;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod map;
pub mod procgen;
pub mod scripted_input;

pub use engine::{Engine, TurnOutcome};
