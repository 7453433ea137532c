//! Systems - per-tick logic that queries and updates agents

mod decision;
mod physics;
mod collision;

pub use decision::*;
pub use physics::*;
pub use collision::*;
