//! Obstacle components: hazard variants and the recyclable hazard instance.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::common::Rect;

/// Ground hazard sub-kinds, differing only in size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroundKind {
    Small,
    Medium,
    Large,
}

impl GroundKind {
    pub const ALL: [GroundKind; 3] = [GroundKind::Small, GroundKind::Medium, GroundKind::Large];

    /// (width, height)
    pub fn size(&self) -> (f32, f32) {
        match self {
            GroundKind::Small => (34.0, 70.0),
            GroundKind::Medium => (50.0, 96.0),
            GroundKind::Large => (74.0, 96.0),
        }
    }
}

/// Low-flying hazard sub-kinds, differing only in altitude above the lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlyingKind {
    Low,
    Mid,
    High,
}

impl FlyingKind {
    pub const ALL: [FlyingKind; 3] = [FlyingKind::Low, FlyingKind::Mid, FlyingKind::High];

    pub const SIZE: (f32, f32) = (60.0, 40.0);

    /// Gap between the lane and the bottom edge of the hazard
    pub fn altitude(&self) -> f32 {
        match self {
            FlyingKind::Low => 10.0,  // must be jumped
            FlyingKind::Mid => 50.0,  // clears a ducking agent
            FlyingKind::High => 110.0, // only hits airborne agents
        }
    }
}

/// Closed set of hazard variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Ground(GroundKind),
    Flying(FlyingKind),
}

impl ObstacleKind {
    /// Roll a variant with the given ground:flying weighting, then a
    /// sub-kind uniformly.
    pub fn roll(rng: &mut impl Rng, ground_weight: u32, flying_weight: u32) -> Self {
        let total = ground_weight + flying_weight;
        if rng.gen_range(0..total) < ground_weight {
            ObstacleKind::Ground(GroundKind::ALL[rng.gen_range(0..GroundKind::ALL.len())])
        } else {
            ObstacleKind::Flying(FlyingKind::ALL[rng.gen_range(0..FlyingKind::ALL.len())])
        }
    }

    /// (width, height)
    pub fn size(&self) -> (f32, f32) {
        match self {
            ObstacleKind::Ground(kind) => kind.size(),
            ObstacleKind::Flying(_) => FlyingKind::SIZE,
        }
    }

    /// Top edge for an obstacle of this kind sitting on `lane_y`
    pub fn top(&self, lane_y: f32) -> f32 {
        let (_, height) = self.size();
        match self {
            ObstacleKind::Ground(_) => lane_y - height,
            ObstacleKind::Flying(kind) => lane_y - kind.altitude() - height,
        }
    }

    pub fn is_flying(&self) -> bool {
        matches!(self, ObstacleKind::Flying(_))
    }
}

/// One hazard instance. Recycled rather than destroyed when it leaves the
/// course; the hit box is refreshed after every horizontal move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
    pub hit_box: Rect,
    pub scored: bool,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, x: f32, lane_y: f32) -> Self {
        let (width, height) = kind.size();
        let y = kind.top(lane_y);
        Self {
            kind,
            x,
            y,
            hit_box: Rect::new(x, y, width, height),
            scored: false,
        }
    }

    /// Placeholder observed when no obstacle is ahead of an agent: the
    /// smallest ground hazard parked on the spawn boundary.
    pub fn sentinel(spawn_x: f32, lane_y: f32) -> Self {
        Self::new(ObstacleKind::Ground(GroundKind::Small), spawn_x, lane_y)
    }

    /// Move left by `speed`
    pub fn advance(&mut self, speed: f32) {
        self.x -= speed;
        self.hit_box.x = self.x;
    }

    /// True once the trailing edge has crossed the left bound
    pub fn has_exited(&self, left_bound: f32) -> bool {
        self.hit_box.right() <= left_bound
    }

    /// Reset to the spawn boundary with a new variant
    pub fn recycle(&mut self, kind: ObstacleKind, spawn_x: f32, lane_y: f32) {
        *self = Self::new(kind, spawn_x, lane_y);
    }
}
