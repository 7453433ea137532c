//! Agent components: the runner, its motion state and its policy handle.

use serde::{Deserialize, Serialize};

use super::common::Rect;
use crate::config::AgentConfig;

/// Vertical motion state of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MotionState {
    #[default]
    Grounded,
    Rising,
    Falling,
}

impl MotionState {
    pub fn is_airborne(&self) -> bool {
        !matches!(self, MotionState::Grounded)
    }
}

/// Discrete action decoded from a policy output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Action {
    Jump,
    Duck,
    #[default]
    NoOp,
}

impl Action {
    /// Action order used by multi-action policy outputs
    pub const ALL: [Action; 3] = [Action::Jump, Action::Duck, Action::NoOp];
}

/// Index of the policy driving an agent within its generation's policy batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicySlot(pub usize);

/// One simulated runner. Horizontal position is fixed for the whole run;
/// vertical motion follows a parametrized jump arc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub x: f32,
    pub y: f32,
    pub velocity: f32,
    pub motion: MotionState,
    pub ducking: bool,
    pending: Action,
    gravity: f32,
    jump_velocity: f32,
    ground_y: f32,
    width: f32,
    height: f32,
    duck_height: f32,
    fitness: f32,
    alive: bool,
}

impl Agent {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            x: config.x,
            y: config.ground_y,
            velocity: 0.0,
            motion: MotionState::Grounded,
            ducking: false,
            pending: Action::NoOp,
            gravity: config.gravity,
            jump_velocity: config.jump_velocity,
            ground_y: config.ground_y,
            width: config.width,
            height: config.height,
            duck_height: config.duck_height,
            fitness: 0.0,
            alive: true,
        }
    }

    /// Record the action to take on the next `step`. Ignored while airborne,
    /// so repeated jumps mid-arc have no effect.
    pub fn apply_action(&mut self, action: Action) {
        if self.motion.is_airborne() {
            return;
        }
        self.pending = action;
    }

    /// Advance physics by one tick (symplectic Euler, no sub-stepping)
    pub fn step(&mut self) {
        if self.motion == MotionState::Grounded {
            match std::mem::take(&mut self.pending) {
                Action::Jump => {
                    self.ducking = false;
                    self.velocity = self.jump_velocity;
                    self.motion = MotionState::Rising;
                }
                Action::Duck => self.ducking = true,
                Action::NoOp => self.ducking = false,
            }
        }

        if !self.motion.is_airborne() {
            return;
        }

        self.y -= self.velocity;
        self.velocity -= self.gravity;

        if self.y >= self.ground_y {
            self.land();
        } else if self.velocity > 0.0 {
            self.motion = MotionState::Rising;
        } else {
            self.motion = MotionState::Falling;
        }
    }

    fn land(&mut self) {
        self.y = self.ground_y;
        self.velocity = 0.0;
        self.motion = MotionState::Grounded;
        self.ducking = false;
        self.pending = Action::NoOp;
    }

    /// Collision rectangle for the current tick. Ducking keeps the feet in
    /// place and lowers the top edge.
    pub fn hit_box(&self) -> Rect {
        if self.ducking {
            Rect::new(
                self.x,
                self.y + self.height - self.duck_height,
                self.width,
                self.duck_height,
            )
        } else {
            Rect::new(self.x, self.y, self.width, self.height)
        }
    }

    /// Height of the agent above its ground reference (never negative)
    pub fn altitude(&self) -> f32 {
        self.ground_y - self.y
    }

    pub fn ground_y(&self) -> f32 {
        self.ground_y
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Add to fitness. Frozen once eliminated.
    pub fn reward(&mut self, delta: f32) {
        if self.alive {
            self.fitness += delta;
        }
    }

    /// Mark the agent eliminated and apply the penalty. Returns false (and
    /// changes nothing) if it was already eliminated.
    pub fn eliminate(&mut self, penalty: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.fitness -= penalty;
        true
    }
}
