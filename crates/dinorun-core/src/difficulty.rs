//! Difficulty - the per-tick speed ramp.

use serde::{Deserialize, Serialize};

use crate::config::DifficultyConfig;

/// Course speed for the current generation plus the best speed ever reached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    speed: f32,
    baseline: f32,
    increment: f32,
    ceiling: f32,
    top_speed: f32,
}

impl Difficulty {
    pub fn new(config: &DifficultyConfig) -> Self {
        Self {
            speed: config.baseline,
            baseline: config.baseline,
            increment: config.increment,
            ceiling: config.ceiling,
            top_speed: config.baseline,
        }
    }

    /// Ramp speed by one increment, clamped at the ceiling. Returns the new speed.
    pub fn advance(&mut self) -> f32 {
        self.speed = (self.speed + self.increment).min(self.ceiling);
        self.top_speed = self.top_speed.max(self.speed);
        self.speed
    }

    /// Back to baseline; the top speed survives
    pub fn reset(&mut self) {
        self.speed = self.baseline;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn top_speed(&self) -> f32 {
        self.top_speed
    }

    pub fn is_at_ceiling(&self) -> bool {
        self.speed >= self.ceiling
    }
}
