//! dinorun Core - obstacle-course arena for evaluating evolved policies
//!
//! A population of runners, one per candidate policy, tries to survive an
//! endless course of hazards that speeds up every tick. Survival time minus
//! collision penalties becomes the fitness signal an external evolutionary
//! optimizer consumes to breed the next generation.
//!
//! # Architecture
//!
//! Agents are entities in a `hecs` world; obstacles live in a recycled pool.
//! Each tick runs, in order: speed ramp, obstacle advance and recycle,
//! decisions, physics, collision and fitness.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`components`] | Agent, obstacle and rectangle data |
//! | [`systems`] | Decision, physics and collision passes |
//! | [`pool`] | Constant-size obstacle pool with weighted variant rolls |
//! | [`policy`] | Policy trait, observation encoding, action decoding |
//! | [`difficulty`] | Speed ramp with ceiling |
//! | [`arena`] | Tick loop and generation lifecycle |
//! | [`snapshot`] | Serializable per-tick views and generation reports |
//! | [`config`] | Construction-time constants and validation |
//!
//! # Example
//!
//! ```rust,no_run
//! use dinorun_core::prelude::*;
//!
//! let mut arena = Arena::new(ArenaConfig::default()).unwrap();
//! let policies = vec![FnPolicy(|inputs: &[f32]| vec![if inputs[2] < 400.0 { 1.0 } else { 0.0 }])];
//!
//! let report = arena.run_generation(&policies);
//! println!("fitness: {:?}", report.fitness);
//! ```

pub mod arena;
pub mod components;
pub mod config;
pub mod difficulty;
pub mod policy;
pub mod pool;
pub mod snapshot;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::arena::{Arena, GenerationPhase, TickOutcome};
    pub use crate::components::*;
    pub use crate::config::*;
    pub use crate::policy::{DecisionMode, FnPolicy, InputLayout, Observation, Policy};
    pub use crate::snapshot::{ArenaSnapshot, GenerationReport};
}
