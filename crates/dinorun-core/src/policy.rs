//! Policy adapter - bounded observations in, discrete actions out.
//!
//! A [`Policy`] is whatever the external optimizer hands us for one genome:
//! typically a feed-forward network. The arena only ever calls
//! [`Policy::evaluate`] with a fixed-arity vector of raw, unnormalized
//! values and decodes the returned vector according to [`DecisionMode`].

use serde::{Deserialize, Serialize};

use crate::components::{Action, Agent, Obstacle};

/// Decision capability evaluated once per live agent per tick
pub trait Policy {
    fn evaluate(&self, inputs: &[f32]) -> Vec<f32>;
}

impl<P: Policy + ?Sized> Policy for &P {
    fn evaluate(&self, inputs: &[f32]) -> Vec<f32> {
        (**self).evaluate(inputs)
    }
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn evaluate(&self, inputs: &[f32]) -> Vec<f32> {
        (**self).evaluate(inputs)
    }
}

/// Adapts a closure into a [`Policy`]
#[derive(Debug, Clone, Copy)]
pub struct FnPolicy<F>(pub F);

impl<F> Policy for FnPolicy<F>
where
    F: Fn(&[f32]) -> Vec<f32>,
{
    fn evaluate(&self, inputs: &[f32]) -> Vec<f32> {
        (self.0)(inputs)
    }
}

/// Which values a policy receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputLayout {
    /// (agent_x, agent_y, obstacle_x, obstacle_y, speed)
    #[default]
    Full,
    /// (agent_y, obstacle_x, obstacle_y, speed); agent x is constant
    Compact,
}

impl InputLayout {
    pub fn arity(&self) -> usize {
        match self {
            InputLayout::Full => 5,
            InputLayout::Compact => 4,
        }
    }
}

/// How a policy output maps onto an [`Action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    /// One scalar: jump above the threshold, otherwise do nothing
    #[default]
    Binary,
    /// Scores over (jump, duck, no-op); highest wins, first index on ties
    MultiAction,
}

impl DecisionMode {
    /// Minimum output length a policy must produce in this mode
    pub fn output_arity(&self) -> usize {
        match self {
            DecisionMode::Binary => 1,
            DecisionMode::MultiAction => Action::ALL.len(),
        }
    }

    pub fn decode(&self, output: &[f32], jump_threshold: f32) -> Action {
        assert!(
            output.len() >= self.output_arity(),
            "policy returned {} outputs, {:?} mode needs {}",
            output.len(),
            self,
            self.output_arity()
        );
        match self {
            DecisionMode::Binary => {
                if output[0] > jump_threshold {
                    Action::Jump
                } else {
                    Action::NoOp
                }
            }
            DecisionMode::MultiAction => {
                let mut best = 0;
                for (i, score) in output.iter().enumerate().take(Action::ALL.len()).skip(1) {
                    if *score > output[best] {
                        best = i;
                    }
                }
                Action::ALL[best]
            }
        }
    }
}

/// Raw per-agent observation of the course
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub agent_x: f32,
    pub agent_y: f32,
    pub obstacle_x: f32,
    pub obstacle_y: f32,
    pub speed: f32,
}

impl Observation {
    pub fn new(agent: &Agent, obstacle: &Obstacle, speed: f32) -> Self {
        Self {
            agent_x: agent.x,
            agent_y: agent.y,
            obstacle_x: obstacle.x,
            obstacle_y: obstacle.y,
            speed,
        }
    }

    /// Write the policy inputs for `layout` into `buf`, replacing its contents
    pub fn encode_into(&self, layout: InputLayout, buf: &mut Vec<f32>) {
        buf.clear();
        if layout == InputLayout::Full {
            buf.push(self.agent_x);
        }
        buf.extend_from_slice(&[self.agent_y, self.obstacle_x, self.obstacle_y, self.speed]);
        assert_eq!(buf.len(), layout.arity(), "malformed observation");
    }

    pub fn encode(&self, layout: InputLayout) -> Vec<f32> {
        let mut buf = Vec::with_capacity(layout.arity());
        self.encode_into(layout, &mut buf);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{GroundKind, ObstacleKind};
    use crate::config::AgentConfig;

    fn observation() -> Observation {
        let agent = Agent::new(&AgentConfig::default());
        let obstacle = Obstacle::new(ObstacleKind::Ground(GroundKind::Small), 600.0, 320.0);
        Observation::new(&agent, &obstacle, 15.0)
    }

    #[test]
    fn test_full_layout_order() {
        assert_eq!(
            observation().encode(InputLayout::Full),
            vec![150.0, 250.0, 600.0, 250.0, 15.0]
        );
    }

    #[test]
    fn test_compact_layout_drops_agent_x() {
        assert_eq!(
            observation().encode(InputLayout::Compact),
            vec![250.0, 600.0, 250.0, 15.0]
        );
    }

    #[test]
    fn test_binary_threshold() {
        let mode = DecisionMode::Binary;
        assert_eq!(mode.decode(&[0.51], 0.5), Action::Jump);
        assert_eq!(mode.decode(&[0.5], 0.5), Action::NoOp);
        assert_eq!(mode.decode(&[-3.0, 9.0], 0.5), Action::NoOp);
    }

    #[test]
    fn test_multi_action_argmax() {
        let mode = DecisionMode::MultiAction;
        assert_eq!(mode.decode(&[0.1, 0.9, 0.3], 0.5), Action::Duck);
        assert_eq!(mode.decode(&[0.1, 0.2, 0.3], 0.5), Action::NoOp);
        assert_eq!(mode.decode(&[0.7, 0.2, 0.3], 0.5), Action::Jump);
    }

    #[test]
    fn test_multi_action_ties_pick_first() {
        let mode = DecisionMode::MultiAction;
        assert_eq!(mode.decode(&[0.4, 0.4, 0.4], 0.5), Action::Jump);
        assert_eq!(mode.decode(&[0.1, 0.4, 0.4], 0.5), Action::Duck);
    }

    #[test]
    #[should_panic(expected = "MultiAction mode needs 3")]
    fn test_short_output_is_fatal() {
        DecisionMode::MultiAction.decode(&[1.0], 0.5);
    }

    #[test]
    fn test_boxed_and_closure_policies() {
        let policies: Vec<Box<dyn Policy>> = vec![
            Box::new(FnPolicy(|_: &[f32]| vec![1.0])),
            Box::new(FnPolicy(|inputs: &[f32]| vec![inputs.len() as f32])),
        ];
        assert_eq!(policies[0].evaluate(&[0.0; 5]), vec![1.0]);
        assert_eq!(policies[1].evaluate(&[0.0; 4]), vec![4.0]);
    }
}
