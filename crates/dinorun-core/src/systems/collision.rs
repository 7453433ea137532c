//! Collision system - eliminates agents touching an obstacle and rewards the
//! survivors.
//!
//! Hits are collected first and applied as a batch after the pass, so the
//! query is never mutated while it is being iterated.

use hecs::{Entity, World};

use crate::components::Agent;
use crate::config::FitnessConfig;
use crate::pool::ObstaclePool;

/// Result of one collision pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionOutcome {
    /// Agents eliminated this tick
    pub eliminated: Vec<Entity>,
    /// Live agents that survived the pass and were rewarded
    pub survivors: usize,
    /// Reward each survivor received
    pub reward: f32,
}

/// Per-tick survivor reward. The obstacle count is read once per tick so
/// every agent gets the same divisor.
pub fn tick_reward(fitness: &FitnessConfig, obstacle_count: usize) -> f32 {
    if fitness.normalize_by_obstacles && obstacle_count > 0 {
        fitness.reward_per_tick / obstacle_count as f32
    } else {
        fitness.reward_per_tick
    }
}

pub fn collision_system(
    world: &mut World,
    pool: &ObstaclePool,
    fitness: &FitnessConfig,
) -> CollisionOutcome {
    let reward = tick_reward(fitness, pool.len());

    let mut hits: Vec<Entity> = Vec::new();
    let mut survivors: Vec<Entity> = Vec::new();
    for (entity, agent) in world.query::<&Agent>().iter() {
        if !agent.is_alive() {
            continue;
        }
        if pool.collides(&agent.hit_box()) {
            hits.push(entity);
        } else {
            survivors.push(entity);
        }
    }

    let mut eliminated = Vec::with_capacity(hits.len());
    for entity in hits {
        if let Ok(mut agent) = world.get::<&mut Agent>(entity) {
            if agent.eliminate(fitness.penalty) {
                log::debug!(
                    "Agent {:?} eliminated with fitness {:.2}",
                    entity,
                    agent.fitness()
                );
                eliminated.push(entity);
            }
        }
    }

    for &entity in &survivors {
        if let Ok(mut agent) = world.get::<&mut Agent>(entity) {
            agent.reward(reward);
        }
    }

    CollisionOutcome {
        eliminated,
        survivors: survivors.len(),
        reward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{GroundKind, Obstacle, ObstacleKind};
    use crate::config::{AgentConfig, ObstacleConfig};

    fn ground(x: f32) -> Obstacle {
        Obstacle::new(ObstacleKind::Ground(GroundKind::Small), x, 320.0)
    }

    #[test]
    fn test_hit_agent_is_penalized_and_survivor_rewarded() {
        let config = AgentConfig::default();
        let mut world = World::new();
        let grounded = world.spawn((Agent::new(&config),));
        let mut airborne = Agent::new(&config);
        airborne.y = 55.0;
        let airborne = world.spawn((airborne,));

        let pool = ObstaclePool::with_obstacles(&ObstacleConfig::default(), vec![ground(160.0)]);
        let outcome = collision_system(&mut world, &pool, &FitnessConfig::default());

        assert_eq!(outcome.eliminated, vec![grounded]);
        assert_eq!(outcome.survivors, 1);
        assert_eq!(world.get::<&Agent>(grounded).unwrap().fitness(), -5.0);
        assert!(!world.get::<&Agent>(grounded).unwrap().is_alive());
        assert_eq!(world.get::<&Agent>(airborne).unwrap().fitness(), 1.0);
    }

    #[test]
    fn test_no_double_penalty() {
        let mut world = World::new();
        let entity = world.spawn((Agent::new(&AgentConfig::default()),));
        let pool = ObstaclePool::with_obstacles(&ObstacleConfig::default(), vec![ground(160.0)]);
        let fitness = FitnessConfig::default();

        collision_system(&mut world, &pool, &fitness);
        let again = collision_system(&mut world, &pool, &fitness);

        assert!(again.eliminated.is_empty());
        assert_eq!(again.survivors, 0);
        assert_eq!(world.get::<&Agent>(entity).unwrap().fitness(), -5.0);
    }

    #[test]
    fn test_reward_normalized_by_obstacle_count() {
        let mut world = World::new();
        let entity = world.spawn((Agent::new(&AgentConfig::default()),));
        let pool = ObstaclePool::with_obstacles(
            &ObstacleConfig::default(),
            vec![ground(600.0), ground(800.0), ground(1000.0), ground(1200.0)],
        );

        let outcome = collision_system(&mut world, &pool, &FitnessConfig::default());
        assert_eq!(outcome.reward, 0.25);
        assert_eq!(world.get::<&Agent>(entity).unwrap().fitness(), 0.25);

        let flat = FitnessConfig {
            normalize_by_obstacles: false,
            ..FitnessConfig::default()
        };
        collision_system(&mut world, &pool, &flat);
        assert_eq!(world.get::<&Agent>(entity).unwrap().fitness(), 1.25);
    }
}
