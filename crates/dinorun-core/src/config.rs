//! Arena configuration - named numeric constants supplied at construction.
//!
//! Defaults reproduce the classic runner course: a 1100px wide lane, agents
//! parked at x = 150 on a ground line at y = 250, a 65/13 jump arc and a
//! speed ramp from 15 to 30. Every field can be overridden from JSON; missing
//! fields fall back to these defaults.

use serde::{Deserialize, Serialize};

use crate::policy::{DecisionMode, InputLayout};

/// Agent body and jump arc
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub x: f32,
    pub ground_y: f32,
    pub width: f32,
    pub height: f32,
    pub duck_height: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            x: 150.0,
            ground_y: 250.0,
            width: 84.0,
            height: 84.0,
            duck_height: 42.0,
            jump_velocity: 65.0,
            gravity: 13.0,
        }
    }
}

/// Obstacle course layout and variant weighting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Right edge where obstacles (re)enter the course
    pub spawn_x: f32,
    /// Obstacles whose trailing edge reaches this are recycled
    pub left_bound: f32,
    /// Line hazards stand on; flying hazards hover above it
    pub lane_y: f32,
    pub initial_count: usize,
    pub first_x: f32,
    /// Gap between consecutive initial obstacles
    pub spacing: f32,
    pub ground_weight: u32,
    pub flying_weight: u32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            spawn_x: 1100.0,
            left_bound: 0.0,
            lane_y: 320.0,
            initial_count: 2,
            first_x: 1100.0,
            spacing: 550.0,
            ground_weight: 3,
            flying_weight: 1,
        }
    }
}

/// Speed ramp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DifficultyConfig {
    pub baseline: f32,
    pub increment: f32,
    pub ceiling: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            baseline: 15.0,
            increment: 0.03,
            ceiling: 30.0,
        }
    }
}

/// Reward shaping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FitnessConfig {
    pub reward_per_tick: f32,
    pub penalty: f32,
    /// Divide the per-tick reward by the number of obstacles in the pool
    pub normalize_by_obstacles: bool,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            reward_per_tick: 1.0,
            penalty: 5.0,
            normalize_by_obstacles: true,
        }
    }
}

/// Observation encoding and output decoding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecisionConfig {
    pub mode: DecisionMode,
    pub layout: InputLayout,
    /// Binary mode jumps when the output exceeds this
    pub jump_threshold: f32,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            mode: DecisionMode::Binary,
            layout: InputLayout::Full,
            jump_threshold: 0.5,
        }
    }
}

/// Complete arena configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    pub agent: AgentConfig,
    pub obstacles: ObstacleConfig,
    pub difficulty: DifficultyConfig,
    pub fitness: FitnessConfig,
    pub decision: DecisionConfig,
    /// Seed for obstacle variant selection
    pub seed: u64,
    /// End a generation after this many ticks even if agents survive
    pub max_ticks: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            obstacles: ObstacleConfig::default(),
            difficulty: DifficultyConfig::default(),
            fitness: FitnessConfig::default(),
            decision: DecisionConfig::default(),
            seed: 0,
            max_ticks: None,
        }
    }
}

impl ArenaConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ArenaConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject constants the tick loop cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.agent;
        finite("agent.x", a.x)?;
        finite("agent.ground_y", a.ground_y)?;
        positive("agent.width", a.width)?;
        positive("agent.height", a.height)?;
        positive("agent.duck_height", a.duck_height)?;
        if a.duck_height > a.height {
            return Err(ConfigError::invalid(
                "agent.duck_height",
                "must not exceed agent.height",
            ));
        }
        positive("agent.jump_velocity", a.jump_velocity)?;
        positive("agent.gravity", a.gravity)?;

        let o = &self.obstacles;
        finite("obstacles.spawn_x", o.spawn_x)?;
        finite("obstacles.left_bound", o.left_bound)?;
        finite("obstacles.lane_y", o.lane_y)?;
        finite("obstacles.first_x", o.first_x)?;
        non_negative("obstacles.spacing", o.spacing)?;
        if o.spawn_x <= a.x + a.width || o.spawn_x <= o.left_bound {
            return Err(ConfigError::invalid(
                "obstacles.spawn_x",
                "must lie right of the agent and the left bound",
            ));
        }
        if o.initial_count == 0 {
            return Err(ConfigError::invalid("obstacles.initial_count", "must be at least 1"));
        }
        if o.initial_count > 1 && o.spacing <= 0.0 {
            return Err(ConfigError::invalid(
                "obstacles.spacing",
                "must be positive when more than one obstacle is spawned",
            ));
        }
        if o.ground_weight.checked_add(o.flying_weight).unwrap_or(0) == 0 {
            return Err(ConfigError::invalid(
                "obstacles.ground_weight",
                "variant weights must not all be zero",
            ));
        }

        let d = &self.difficulty;
        non_negative("difficulty.baseline", d.baseline)?;
        non_negative("difficulty.increment", d.increment)?;
        finite("difficulty.ceiling", d.ceiling)?;
        if d.ceiling < d.baseline {
            return Err(ConfigError::invalid(
                "difficulty.ceiling",
                "must not be below difficulty.baseline",
            ));
        }

        non_negative("fitness.reward_per_tick", self.fitness.reward_per_tick)?;
        non_negative("fitness.penalty", self.fitness.penalty)?;
        finite("decision.jump_threshold", self.decision.jump_threshold)?;

        if self.max_ticks == Some(0) {
            return Err(ConfigError::invalid("max_ticks", "must be at least 1"));
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be finite"))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be positive"))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must not be negative"))
    }
}

/// Errors detected while building a configuration
#[derive(Debug)]
pub enum ConfigError {
    Invalid { field: &'static str, reason: &'static str },
    Json(serde_json::Error),
}

impl ConfigError {
    fn invalid(field: &'static str, reason: &'static str) -> Self {
        ConfigError::Invalid { field, reason }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid configuration: {} {}", field, reason)
            }
            ConfigError::Json(e) => write!(f, "Configuration parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ArenaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "seed": 9,
            "difficulty": { "ceiling": 40.0 },
            "decision": { "mode": "multi_action" }
        }"#;
        let config = ArenaConfig::from_json(json).expect("valid config");
        assert_eq!(config.seed, 9);
        assert_eq!(config.difficulty.ceiling, 40.0);
        assert_eq!(config.difficulty.baseline, 15.0);
        assert_eq!(config.decision.mode, DecisionMode::MultiAction);
        assert_eq!(config.agent, AgentConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ArenaConfig {
            max_ticks: Some(1000),
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(ArenaConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_ceiling_below_baseline_rejected() {
        let mut config = ArenaConfig::default();
        config.difficulty.ceiling = 10.0;
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "difficulty.ceiling"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_negative_speed_rejected() {
        let mut config = ArenaConfig::default();
        config.difficulty.baseline = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut config = ArenaConfig::default();
        config.obstacles.ground_weight = 0;
        config.obstacles.flying_weight = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_gravity_rejected() {
        let mut config = ArenaConfig::default();
        config.agent.gravity = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            ArenaConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
