//! Read-only views of the arena for renderers, loggers and the optimizer.

use serde::{Deserialize, Serialize};

use crate::components::{MotionState, ObstacleKind, Rect};

/// One agent as seen after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub slot: usize,
    pub x: f32,
    pub y: f32,
    pub motion: MotionState,
    pub ducking: bool,
    pub fitness: f32,
    pub alive: bool,
}

/// One obstacle as seen after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
    pub hit_box: Rect,
}

/// Arena state after a tick. Agents are ordered by policy slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub generation: u32,
    pub tick: u64,
    pub speed: f32,
    pub top_speed: f32,
    pub score: u64,
    pub alive: usize,
    pub agents: Vec<AgentSnapshot>,
    pub obstacles: Vec<ObstacleSnapshot>,
}

/// Outcome of one generation, handed back to the optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: u32,
    pub ticks: u64,
    pub score: u64,
    pub top_speed: f32,
    /// `fitness[i]` belongs to the i-th policy of the batch
    pub fitness: Vec<f32>,
    /// The generation hit the tick cap with agents still alive
    pub truncated: bool,
}

impl GenerationReport {
    pub fn empty(generation: u32, top_speed: f32) -> Self {
        Self {
            generation,
            ticks: 0,
            score: 0,
            top_speed,
            fitness: Vec::new(),
            truncated: false,
        }
    }

    /// Highest fitness in the batch
    pub fn best(&self) -> Option<f32> {
        self.fitness.iter().copied().reduce(f32::max)
    }

    /// Mean fitness across the batch
    pub fn mean(&self) -> Option<f32> {
        if self.fitness.is_empty() {
            None
        } else {
            Some(self.fitness.iter().sum::<f32>() / self.fitness.len() as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_stats() {
        let report = GenerationReport {
            fitness: vec![2.0, -5.0, 6.0],
            ..GenerationReport::empty(3, 15.0)
        };
        assert_eq!(report.best(), Some(6.0));
        assert_eq!(report.mean(), Some(1.0));
        assert_eq!(GenerationReport::empty(0, 15.0).best(), None);
    }
}
