//! Obstacle pool - a constant-size set of hazards recycled as they leave
//! the course.

use rand::Rng;

use crate::components::{Obstacle, ObstacleKind, Rect};
use crate::config::ObstacleConfig;

/// Working set of obstacles for one generation
#[derive(Debug, Clone)]
pub struct ObstaclePool {
    obstacles: Vec<Obstacle>,
    spawn_x: f32,
    left_bound: f32,
    lane_y: f32,
    ground_weight: u32,
    flying_weight: u32,
}

impl ObstaclePool {
    /// Spawn the initial obstacles, staggered by `spacing` from `first_x`
    pub fn new(config: &ObstacleConfig, rng: &mut impl Rng) -> Self {
        let obstacles = (0..config.initial_count)
            .map(|i| {
                let kind = ObstacleKind::roll(rng, config.ground_weight, config.flying_weight);
                Obstacle::new(kind, config.first_x + config.spacing * i as f32, config.lane_y)
            })
            .collect();

        Self {
            obstacles,
            spawn_x: config.spawn_x,
            left_bound: config.left_bound,
            lane_y: config.lane_y,
            ground_weight: config.ground_weight,
            flying_weight: config.flying_weight,
        }
    }

    /// Build a pool around explicit obstacles (scripted scenarios)
    pub fn with_obstacles(config: &ObstacleConfig, obstacles: Vec<Obstacle>) -> Self {
        Self {
            obstacles,
            spawn_x: config.spawn_x,
            left_bound: config.left_bound,
            lane_y: config.lane_y,
            ground_weight: config.ground_weight,
            flying_weight: config.flying_weight,
        }
    }

    /// Move every obstacle left by `speed`
    pub fn advance_all(&mut self, speed: f32) {
        for obstacle in &mut self.obstacles {
            obstacle.advance(speed);
        }
    }

    /// Recycle every obstacle whose trailing edge crossed the left bound.
    /// Returns the number of recycle events; each counts once toward the score.
    pub fn recycle_exited(&mut self, rng: &mut impl Rng) -> u32 {
        let mut recycled = 0;
        for obstacle in &mut self.obstacles {
            if !obstacle.has_exited(self.left_bound) || obstacle.scored {
                continue;
            }
            obstacle.scored = true;
            recycled += 1;

            let kind = ObstacleKind::roll(rng, self.ground_weight, self.flying_weight);
            log::debug!(
                "Obstacle {:?} left the course at x={:.1}, respawning as {:?}",
                obstacle.kind,
                obstacle.x,
                kind
            );
            obstacle.recycle(kind, self.spawn_x, self.lane_y);
        }
        recycled
    }

    /// Nearest obstacle strictly right of `x_threshold`. When none qualifies
    /// the sentinel parked on the spawn boundary is returned instead.
    pub fn closest_ahead(&self, x_threshold: f32) -> Obstacle {
        match self.nearest_ahead(x_threshold) {
            Some(obstacle) => *obstacle,
            None => {
                log::trace!("No obstacle ahead of x={:.1}, observing sentinel", x_threshold);
                self.sentinel()
            }
        }
    }

    fn nearest_ahead(&self, x_threshold: f32) -> Option<&Obstacle> {
        self.obstacles
            .iter()
            .filter(|o| o.x > x_threshold)
            .min_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn sentinel(&self) -> Obstacle {
        Obstacle::sentinel(self.spawn_x, self.lane_y)
    }

    /// True if `hit_box` overlaps any obstacle
    pub fn collides(&self, hit_box: &Rect) -> bool {
        self.obstacles.iter().any(|o| o.hit_box.intersects(hit_box))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn spawn_x(&self) -> f32 {
        self.spawn_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::GroundKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small(x: f32) -> Obstacle {
        Obstacle::new(ObstacleKind::Ground(GroundKind::Small), x, 320.0)
    }

    #[test]
    fn test_initial_obstacles_are_staggered() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = ObstaclePool::new(&ObstacleConfig::default(), &mut rng);
        let xs: Vec<f32> = pool.iter().map(|o| o.x).collect();
        assert_eq!(xs, vec![1100.0, 1650.0]);
    }

    #[test]
    fn test_recycle_moves_to_spawn_and_counts_once() {
        let config = ObstacleConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut pool = ObstaclePool::with_obstacles(&config, vec![small(-5.0), small(500.0)]);

        pool.advance_all(30.0);
        assert_eq!(pool.recycle_exited(&mut rng), 1);
        assert_eq!(pool.len(), 2);

        let recycled: Vec<_> = pool.iter().filter(|o| o.x == config.spawn_x).collect();
        assert_eq!(recycled.len(), 1);
        assert!(!recycled[0].scored);

        // nothing else has exited
        assert_eq!(pool.recycle_exited(&mut rng), 0);
    }

    #[test]
    fn test_closest_ahead_picks_nearest() {
        let config = ObstacleConfig::default();
        let pool =
            ObstaclePool::with_obstacles(&config, vec![small(900.0), small(100.0), small(400.0)]);
        assert_eq!(pool.closest_ahead(150.0).x, 400.0);
        assert_eq!(pool.closest_ahead(50.0).x, 100.0);
    }

    #[test]
    fn test_closest_ahead_falls_back_to_sentinel() {
        let config = ObstacleConfig::default();
        let pool = ObstaclePool::with_obstacles(&config, vec![small(100.0)]);
        let target = pool.closest_ahead(150.0);
        assert_eq!(target, pool.sentinel());
        assert_eq!(target.x, config.spawn_x);
    }

    #[test]
    fn test_collides() {
        let config = ObstacleConfig::default();
        let pool = ObstaclePool::with_obstacles(&config, vec![small(200.0)]);
        assert!(pool.collides(&Rect::new(150.0, 250.0, 84.0, 84.0)));
        assert!(!pool.collides(&Rect::new(150.0, 100.0, 84.0, 84.0)));
    }
}
