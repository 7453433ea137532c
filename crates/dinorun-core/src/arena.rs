//! Arena - main entry point for evaluating a batch of policies

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::{Agent, Obstacle, PolicySlot};
use crate::config::{ArenaConfig, ConfigError};
use crate::difficulty::Difficulty;
use crate::policy::Policy;
use crate::pool::ObstaclePool;
use crate::snapshot::{AgentSnapshot, ArenaSnapshot, GenerationReport, ObstacleSnapshot};
use crate::systems::*;

/// Whether the current generation still has agents to simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Running,
    Ended,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub tick: u64,
    pub speed: f32,
    /// Obstacles recycled (and scored) this tick
    pub recycled: u32,
    pub eliminated: usize,
    pub alive: usize,
    pub ended: bool,
}

/// Owns every agent and obstacle of the current generation plus the
/// course-wide speed, score and generation counter.
pub struct Arena {
    config: ArenaConfig,
    /// Agents live here; nothing else is spawned into this world
    world: World,
    obstacles: ObstaclePool,
    difficulty: Difficulty,
    rng: StdRng,
    score: u64,
    generation: u32,
    tick: u64,
    alive: usize,
    truncated: bool,
}

impl Arena {
    /// Create an arena for generation 0. Invalid constants are rejected here
    /// rather than inside the tick loop.
    pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let obstacles = ObstaclePool::new(&config.obstacles, &mut rng);
        let difficulty = Difficulty::new(&config.difficulty);

        Ok(Self {
            config,
            world: World::new(),
            obstacles,
            difficulty,
            rng,
            score: 0,
            generation: 0,
            tick: 0,
            alive: 0,
            truncated: false,
        })
    }

    /// Create an arena whose first generation runs against a hand-placed
    /// course. Later generations roll their obstacles as usual.
    pub fn with_obstacles(
        config: ArenaConfig,
        obstacles: Vec<Obstacle>,
    ) -> Result<Self, ConfigError> {
        let mut arena = Self::new(config)?;
        arena.obstacles = ObstaclePool::with_obstacles(&arena.config.obstacles, obstacles);
        Ok(arena)
    }

    /// Spawn `count` agents bound to the next free policy slots. A generation
    /// that has already ended stays ended: nothing is spawned until `reset()`.
    pub fn populate(&mut self, count: usize) -> Vec<Entity> {
        if self.is_ended() && self.agent_count() > 0 {
            log::warn!(
                "Generation {} already ended; call reset() before populating",
                self.generation
            );
            return Vec::new();
        }
        let first = self.agent_count();
        let entities = (0..count)
            .map(|i| {
                self.world
                    .spawn((Agent::new(&self.config.agent), PolicySlot(first + i)))
            })
            .collect();
        self.alive += count;
        entities
    }

    /// Advance the simulation by one tick. `policies[i]` drives the agent in
    /// slot `i`. Does nothing once the generation has ended.
    pub fn step<P: Policy>(&mut self, policies: &[P]) -> TickOutcome {
        if self.is_ended() {
            return TickOutcome {
                tick: self.tick,
                speed: self.speed(),
                recycled: 0,
                eliminated: 0,
                alive: self.alive,
                ended: true,
            };
        }

        // 1. Difficulty
        let speed = self.difficulty.advance();

        // 2. Obstacles
        self.obstacles.advance_all(speed);
        let recycled = self.obstacles.recycle_exited(&mut self.rng);
        self.score += recycled as u64;

        // 3. Decisions
        decision_system(
            &mut self.world,
            &self.obstacles,
            speed,
            policies,
            &self.config.decision,
        );

        // 4. Physics
        physics_system(&mut self.world);

        // 5. Collisions and fitness
        let collisions = collision_system(&mut self.world, &self.obstacles, &self.config.fitness);
        self.alive -= collisions.eliminated.len();
        self.tick += 1;

        // 6. Generation end
        if self.alive > 0 && self.config.max_ticks.is_some_and(|max| self.tick >= max) {
            log::warn!(
                "Generation {} hit the {} tick cap with {} agents alive",
                self.generation,
                self.tick,
                self.alive
            );
            self.truncated = true;
        }
        let ended = self.is_ended();
        if ended {
            self.log_generation_end();
        }

        TickOutcome {
            tick: self.tick,
            speed,
            recycled,
            eliminated: collisions.eliminated.len(),
            alive: self.alive,
            ended,
        }
    }

    fn log_generation_end(&self) {
        let best = self.fitness().into_iter().reduce(f32::max).unwrap_or(0.0);
        log::info!(
            "Generation {} ended after {} ticks: score {}, best fitness {:.2}, top speed {:.1}",
            self.generation,
            self.tick,
            self.score,
            best,
            self.difficulty.top_speed()
        );
    }

    /// Start the next generation: fresh obstacles, no agents, baseline speed,
    /// zero score.
    pub fn reset(&mut self) {
        self.world.clear();
        self.obstacles = ObstaclePool::new(&self.config.obstacles, &mut self.rng);
        self.difficulty.reset();
        self.score = 0;
        self.tick = 0;
        self.alive = 0;
        self.truncated = false;
        self.generation += 1;
    }

    /// Evaluate one batch of policies: spawn one agent per policy, tick until
    /// none survive (or the tick cap hits), then reset for the next
    /// generation. Agents left over from manual stepping are discarded first.
    pub fn run_generation<P: Policy>(&mut self, policies: &[P]) -> GenerationReport {
        self.drive(policies, None::<fn(&ArenaSnapshot)>)
    }

    /// Like [`Arena::run_generation`], handing a snapshot to `observer` after
    /// every tick.
    pub fn run_generation_observed<P, F>(&mut self, policies: &[P], observer: F) -> GenerationReport
    where
        P: Policy,
        F: FnMut(&ArenaSnapshot),
    {
        self.drive(policies, Some(observer))
    }

    fn drive<P, F>(&mut self, policies: &[P], mut observer: Option<F>) -> GenerationReport
    where
        P: Policy,
        F: FnMut(&ArenaSnapshot),
    {
        if policies.is_empty() {
            return GenerationReport::empty(self.generation, self.top_speed());
        }
        if self.agent_count() > 0 {
            self.reset();
        }

        self.populate(policies.len());
        while !self.is_ended() {
            self.step(policies);
            if let Some(observe) = observer.as_mut() {
                observe(&self.snapshot());
            }
        }

        let report = GenerationReport {
            generation: self.generation,
            ticks: self.tick,
            score: self.score,
            top_speed: self.top_speed(),
            fitness: self.fitness(),
            truncated: self.truncated,
        };
        self.reset();
        report
    }

    /// Fitness of every agent of the current generation, ordered by slot
    pub fn fitness(&self) -> Vec<f32> {
        let mut scored: Vec<(usize, f32)> = self
            .world
            .query::<(&Agent, &PolicySlot)>()
            .iter()
            .map(|(_, (agent, slot))| (slot.0, agent.fitness()))
            .collect();
        scored.sort_by_key(|(slot, _)| *slot);
        scored.into_iter().map(|(_, fitness)| fitness).collect()
    }

    pub fn snapshot(&self) -> ArenaSnapshot {
        let mut agents: Vec<AgentSnapshot> = self
            .world
            .query::<(&Agent, &PolicySlot)>()
            .iter()
            .map(|(_, (agent, slot))| AgentSnapshot {
                slot: slot.0,
                x: agent.x,
                y: agent.y,
                motion: agent.motion,
                ducking: agent.ducking,
                fitness: agent.fitness(),
                alive: agent.is_alive(),
            })
            .collect();
        agents.sort_by_key(|a| a.slot);

        let obstacles = self
            .obstacles
            .iter()
            .map(|o| ObstacleSnapshot {
                kind: o.kind,
                x: o.x,
                y: o.y,
                hit_box: o.hit_box,
            })
            .collect();

        ArenaSnapshot {
            generation: self.generation,
            tick: self.tick,
            speed: self.speed(),
            top_speed: self.top_speed(),
            score: self.score,
            alive: self.alive,
            agents,
            obstacles,
        }
    }

    /// Copy of one agent's state
    pub fn agent(&self, entity: Entity) -> Option<Agent> {
        self.world.get::<&Agent>(entity).ok().map(|agent| (*agent).clone())
    }

    pub fn phase(&self) -> GenerationPhase {
        if self.is_ended() {
            GenerationPhase::Ended
        } else {
            GenerationPhase::Running
        }
    }

    /// True when no agent is alive or the tick cap was reached
    pub fn is_ended(&self) -> bool {
        self.alive == 0 || self.truncated
    }

    pub fn alive_count(&self) -> usize {
        self.alive
    }

    /// Agents of this generation, eliminated ones included
    pub fn agent_count(&self) -> usize {
        self.world.query::<&Agent>().iter().count()
    }

    pub fn speed(&self) -> f32 {
        self.difficulty.speed()
    }

    /// Fastest speed reached since the arena was created
    pub fn top_speed(&self) -> f32 {
        self.difficulty.top_speed()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn obstacles(&self) -> &ObstaclePool {
        &self.obstacles
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
}
