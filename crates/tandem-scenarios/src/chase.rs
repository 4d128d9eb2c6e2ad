//! Pursuit: controller-driven runners evade scripted chasers.

use std::sync::Arc;

use rand::RngCore;
use rand_chacha::ChaCha8Rng;
use tandem_core::{vector, ConfigError};
use tandem_engine::{Info, Observation, Scenario};
use tandem_physics::{Action, Agent, Behavior, Landmark, World, WorldParams};

use crate::{touching, uniform_point};

/// Reward lost each time a chaser touches a runner.
const CATCH_PENALTY: f64 = 10.0;

/// Scripted policy: accelerate straight at the nearest policy agent.
///
/// The push has magnitude `accel` (1.0 when unset), so the behavior
/// respects the chaser's own sensitivity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pursue;

impl Behavior for Pursue {
    fn name(&self) -> &str {
        "pursue"
    }

    fn act(&self, agent: usize, world: &World, _rng: &mut dyn RngCore) -> Action {
        let params = world.params();
        let mut action = Action::zeros(params.dim_p, params.dim_c);
        let me = &world.agents[agent].body;
        let target = world
            .policy_agents()
            .map(|i| &world.agents[i].body)
            .min_by(|a, b| {
                let da = vector::distance(&a.position, &me.position);
                let db = vector::distance(&b.position, &me.position);
                da.total_cmp(&db)
            });
        if let Some(target) = target {
            let delta = vector::sub(&target.position, &me.position);
            let dist = vector::norm(&delta);
            if dist > 0.0 {
                let push = me.accel.unwrap_or(1.0) / dist;
                vector::add_scaled(&mut action.u, &delta, push);
            }
        }
        action
    }
}

/// Runners (policy agents) flee [`Pursue`]-driven chasers around
/// immovable obstacles.
///
/// A runner loses 10 reward per chaser touching it, loses more the further
/// it strays beyond `|x| = 0.9` on any axis and, with distance shaping
/// enabled, gains `0.1` times its distance to the nearest chaser.
///
/// Observation of runner `i`: own velocity, own position, every obstacle
/// relative to `i`, every other agent relative to `i`.
#[derive(Clone, Debug)]
pub struct Chase {
    runners: usize,
    chasers: usize,
    obstacles: usize,
    params: WorldParams,
    shaping: bool,
}

impl Chase {
    /// `runners` runners against `chasers` chasers, with two obstacles.
    pub fn new(runners: usize, chasers: usize) -> Self {
        Self {
            runners,
            chasers,
            obstacles: 2,
            params: WorldParams::default(),
            shaping: false,
        }
    }

    /// Number of obstacles. Default: 2.
    pub fn with_obstacles(mut self, obstacles: usize) -> Self {
        self.obstacles = obstacles;
        self
    }

    /// Override the world constants.
    pub fn with_params(mut self, params: WorldParams) -> Self {
        self.params = params;
        self
    }

    /// Reward runners for distance to the nearest chaser.
    pub fn with_shaping(mut self, shaping: bool) -> Self {
        self.shaping = shaping;
        self
    }

    fn chasers(world: &World) -> impl Iterator<Item = &Agent> + '_ {
        world.scripted_agents().map(|i| &world.agents[i])
    }

    fn caught(agent: usize, world: &World) -> usize {
        let me = &world.agents[agent].body;
        Self::chasers(world)
            .filter(|c| touching(me, &c.body))
            .count()
    }

    fn nearest_chaser(agent: usize, world: &World) -> Option<f64> {
        let me = &world.agents[agent].body;
        Self::chasers(world)
            .map(|c| vector::distance(&c.body.position, &me.position))
            .min_by(f64::total_cmp)
    }
}

/// Penalty for straying out of the arena along one axis.
fn boundary_penalty(x: f64) -> f64 {
    let x = x.abs();
    if x < 0.9 {
        0.0
    } else if x < 1.0 {
        (x - 0.9) * 10.0
    } else {
        (2.0 * x - 2.0).exp().min(10.0)
    }
}

impl Scenario for Chase {
    fn name(&self) -> &str {
        "chase"
    }

    fn make_world(&self) -> Result<World, ConfigError> {
        let pursue: Arc<dyn Behavior> = Arc::new(Pursue);
        World::builder(self.params.clone())
            .agents((0..self.runners).map(|k| {
                Agent::new(format!("runner {k}"))
                    .size(0.075)
                    .accel(4.0)
                    .max_speed(1.3)
                    .silent(true)
            }))
            .agents((0..self.chasers).map(|k| {
                Agent::new(format!("chaser {k}"))
                    .size(0.075)
                    .accel(3.0)
                    .max_speed(1.0)
                    .silent(true)
                    .scripted(Arc::clone(&pursue))
            }))
            .landmarks((0..self.obstacles).map(|k| Landmark::new(format!("obstacle {k}")).size(0.2)))
            .build()
    }

    fn reset_world(&self, world: &mut World, rng: &mut ChaCha8Rng) {
        let (dim_p, dim_c) = (world.params().dim_p, world.params().dim_c);
        for agent in &mut world.agents {
            agent.body.position = uniform_point(rng, dim_p, 1.0);
            agent.body.velocity = vector::zeros(dim_p);
            agent.comm = vector::zeros(dim_c);
            agent.action = Action::zeros(dim_p, dim_c);
        }
        for obstacle in &mut world.landmarks {
            obstacle.body.position = uniform_point(rng, dim_p, 0.9);
            obstacle.body.velocity = vector::zeros(dim_p);
        }
    }

    fn observation(&self, agent: usize, world: &World) -> Observation {
        let me = &world.agents[agent].body;
        let mut obs: Observation = me.velocity.to_vec();
        obs.extend_from_slice(&me.position);
        for obstacle in &world.landmarks {
            obs.extend(vector::sub(&obstacle.body.position, &me.position));
        }
        for (k, other) in world.agents.iter().enumerate() {
            if k != agent {
                obs.extend(vector::sub(&other.body.position, &me.position));
            }
        }
        obs
    }

    fn reward(&self, agent: usize, world: &World) -> f64 {
        let me = &world.agents[agent].body;
        let mut reward = -CATCH_PENALTY * Self::caught(agent, world) as f64;
        if self.shaping {
            reward += 0.1 * Self::nearest_chaser(agent, world).unwrap_or(0.0);
        }
        reward - me.position.iter().copied().map(boundary_penalty).sum::<f64>()
    }

    fn info(&self, agent: usize, world: &World) -> Info {
        let mut info = Info::new();
        info.insert("caught".into(), Self::caught(agent, world) as f64);
        if let Some(d) = Self::nearest_chaser(agent, world) {
            info.insert("nearest_chaser".into(), d);
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tandem_physics::PhysicsEngine;

    fn world(chase: &Chase) -> World {
        let mut w = chase.make_world().unwrap();
        chase.reset_world(&mut w, &mut ChaCha8Rng::seed_from_u64(3));
        w
    }

    #[test]
    fn runners_are_policy_agents_and_chasers_scripted() {
        let w = world(&Chase::new(2, 3));
        assert_eq!(w.policy_agents().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(w.scripted_agents().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn pursue_points_at_nearest_runner() {
        let mut w = world(&Chase::new(2, 1).with_obstacles(0));
        w.agents[0].body.position = vector::zeros(2);
        w.agents[0].body.position[0] = 1.0;
        w.agents[1].body.position = vector::zeros(2);
        w.agents[1].body.position[0] = -0.5;
        w.agents[2].body.position = vector::zeros(2);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let action = Pursue.act(2, &w, &mut rng);
        assert!((action.u[0] + 3.0).abs() < 1e-12);
        assert_eq!(action.u[1], 0.0);
    }

    #[test]
    fn chaser_closes_distance() {
        let chase = Chase::new(1, 1).with_obstacles(0);
        let mut w = world(&chase);
        w.agents[0].body.position = vector::zeros(2);
        w.agents[0].body.position[0] = 0.8;
        w.agents[1].body.position = vector::zeros(2);
        w.agents[1].body.position[0] = -0.8;
        let before = Chase::nearest_chaser(0, &w).unwrap();
        let mut engine = PhysicsEngine::new(0);
        for _ in 0..5 {
            engine.step(&mut w);
        }
        let after = Chase::nearest_chaser(0, &w).unwrap();
        assert!(after < before, "{after} >= {before}");
    }

    #[test]
    fn catch_costs_ten() {
        let chase = Chase::new(1, 1).with_obstacles(0);
        let mut w = world(&chase);
        w.agents[0].body.position = vector::zeros(2);
        w.agents[1].body.position = vector::zeros(2);
        assert_eq!(chase.reward(0, &w), -10.0);
        assert_eq!(chase.info(0, &w)["caught"], 1.0);
    }

    #[test]
    fn boundary_penalty_grows_outside_arena() {
        assert_eq!(boundary_penalty(0.5), 0.0);
        assert!((boundary_penalty(0.95) - 0.5).abs() < 1e-12);
        assert_eq!(boundary_penalty(-5.0), 10.0);
    }
}
