//! Decision system - feeds each live agent's observation to its policy and
//! applies the decoded action.

use hecs::World;

use crate::components::{Agent, PolicySlot};
use crate::config::DecisionConfig;
use crate::policy::{Observation, Policy};
use crate::pool::ObstaclePool;

/// Ask every live agent's policy for an action. Returns the number of
/// policies evaluated.
pub fn decision_system<P: Policy>(
    world: &mut World,
    pool: &ObstaclePool,
    speed: f32,
    policies: &[P],
    decision: &DecisionConfig,
) -> usize {
    let mut inputs = Vec::with_capacity(decision.layout.arity());
    let mut evaluated = 0;

    for (_, (agent, slot)) in world.query_mut::<(&mut Agent, &PolicySlot)>() {
        if !agent.is_alive() {
            continue;
        }
        let policy = policies.get(slot.0).unwrap_or_else(|| {
            panic!(
                "agent bound to policy slot {} but only {} policies supplied",
                slot.0,
                policies.len()
            )
        });

        let target = pool.closest_ahead(agent.x);
        Observation::new(agent, &target, speed).encode_into(decision.layout, &mut inputs);

        let output = policy.evaluate(&inputs);
        agent.apply_action(decision.mode.decode(&output, decision.jump_threshold));
        evaluated += 1;
    }

    evaluated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{GroundKind, MotionState, Obstacle, ObstacleKind};
    use crate::config::{AgentConfig, ObstacleConfig};
    use crate::policy::{DecisionMode, FnPolicy, InputLayout};
    use std::cell::RefCell;

    fn pool() -> ObstaclePool {
        ObstaclePool::with_obstacles(
            &ObstacleConfig::default(),
            vec![Obstacle::new(ObstacleKind::Ground(GroundKind::Small), 700.0, 320.0)],
        )
    }

    #[test]
    fn test_policy_sees_observation_and_jumps() {
        let mut world = World::new();
        let entity = world.spawn((Agent::new(&AgentConfig::default()), PolicySlot(0)));

        let seen = RefCell::new(Vec::new());
        let policy = FnPolicy(|inputs: &[f32]| {
            seen.borrow_mut().extend_from_slice(inputs);
            vec![1.0]
        });

        let evaluated =
            decision_system(&mut world, &pool(), 17.5, &[policy], &DecisionConfig::default());
        assert_eq!(evaluated, 1);
        assert_eq!(*seen.borrow(), vec![150.0, 250.0, 700.0, 250.0, 17.5]);

        let mut agent = world.get::<&mut Agent>(entity).unwrap();
        agent.step();
        assert_eq!(agent.motion, MotionState::Rising);
    }

    #[test]
    fn test_dead_agents_are_not_evaluated() {
        let mut world = World::new();
        let mut dead = Agent::new(&AgentConfig::default());
        dead.eliminate(5.0);
        world.spawn((dead, PolicySlot(0)));
        world.spawn((Agent::new(&AgentConfig::default()), PolicySlot(1)));

        let calls = RefCell::new(Vec::new());
        let policies: Vec<Box<dyn Policy + '_>> = vec![
            Box::new(FnPolicy(|_: &[f32]| {
                calls.borrow_mut().push(0);
                vec![0.0]
            })),
            Box::new(FnPolicy(|_: &[f32]| {
                calls.borrow_mut().push(1);
                vec![0.0]
            })),
        ];
        let evaluated =
            decision_system(&mut world, &pool(), 15.0, &policies, &DecisionConfig::default());
        assert_eq!(evaluated, 1);
        assert_eq!(*calls.borrow(), vec![1]);
    }

    #[test]
    fn test_multi_action_duck() {
        let mut world = World::new();
        let entity = world.spawn((Agent::new(&AgentConfig::default()), PolicySlot(0)));
        let decision = DecisionConfig {
            mode: DecisionMode::MultiAction,
            layout: InputLayout::Compact,
            ..DecisionConfig::default()
        };
        let policy = FnPolicy(|inputs: &[f32]| {
            assert_eq!(inputs.len(), 4);
            vec![0.0, 1.0, 0.5]
        });

        decision_system(&mut world, &pool(), 15.0, &[policy], &decision);
        let mut agent = world.get::<&mut Agent>(entity).unwrap();
        agent.step();
        assert!(agent.ducking);
    }

    #[test]
    #[should_panic(expected = "policy slot 3")]
    fn test_missing_policy_is_fatal() {
        let mut world = World::new();
        world.spawn((Agent::new(&AgentConfig::default()), PolicySlot(3)));
        let policy = FnPolicy(|_: &[f32]| vec![0.0]);
        decision_system(&mut world, &pool(), 15.0, &[policy], &DecisionConfig::default());
    }
}
