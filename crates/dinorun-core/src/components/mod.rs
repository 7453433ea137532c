//! Components - pure data attached to arena entities

mod common;
mod agent;
mod obstacle;

pub use common::*;
pub use agent::*;
pub use obstacle::*;
