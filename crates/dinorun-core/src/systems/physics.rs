//! Physics system - advances every live agent's jump arc by one tick

use hecs::World;

use crate::components::Agent;

pub fn physics_system(world: &mut World) {
    for (_, agent) in world.query_mut::<&mut Agent>() {
        if agent.is_alive() {
            agent.step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Action, MotionState};
    use crate::config::AgentConfig;

    #[test]
    fn test_only_live_agents_move() {
        let mut world = World::new();
        let mut live = Agent::new(&AgentConfig::default());
        live.apply_action(Action::Jump);
        let mut dead = Agent::new(&AgentConfig::default());
        dead.apply_action(Action::Jump);
        dead.eliminate(5.0);

        let live = world.spawn((live,));
        let dead = world.spawn((dead,));
        physics_system(&mut world);

        assert_eq!(world.get::<&Agent>(live).unwrap().motion, MotionState::Rising);
        let dead = world.get::<&Agent>(dead).unwrap();
        assert_eq!(dead.motion, MotionState::Grounded);
        assert_eq!(dead.altitude(), 0.0);
    }
}
