//! Cooperative coverage: agents spread out over landmarks.

use rand_chacha::ChaCha8Rng;
use tandem_core::{vector, ConfigError};
use tandem_engine::{Info, Observation, Scenario};
use tandem_physics::{Action, Agent, Landmark, World, WorldParams};

use crate::{touching, uniform_point};

/// Distance under which a landmark counts as occupied in [`Info`].
const OCCUPIED_RADIUS: f64 = 0.1;

/// `N` silent agents cover `L` landmarks.
///
/// Every agent is rewarded with the negative sum, over landmarks, of the
/// distance to the closest agent, minus `collision_penalty` for each
/// other agent it touches.
///
/// Observation of agent `i`, in order: own velocity, own position,
/// position of every landmark relative to `i`, position of every other
/// agent relative to `i`, communication state of every other agent.
#[derive(Clone, Debug)]
pub struct Spread {
    agents: usize,
    landmarks: usize,
    params: WorldParams,
    agent_size: f64,
    collision_penalty: f64,
}

impl Spread {
    /// `agents` agents and as many landmarks.
    pub fn new(agents: usize) -> Self {
        Self {
            agents,
            landmarks: agents,
            params: WorldParams {
                dim_c: 2,
                ..Default::default()
            },
            agent_size: 0.15,
            collision_penalty: 1.0,
        }
    }

    /// Use a different number of landmarks.
    pub fn with_landmarks(mut self, landmarks: usize) -> Self {
        self.landmarks = landmarks;
        self
    }

    /// Override the world constants.
    pub fn with_params(mut self, params: WorldParams) -> Self {
        self.params = params;
        self
    }

    /// Penalty per touching pair. Default: 1.0.
    pub fn with_collision_penalty(mut self, penalty: f64) -> Self {
        self.collision_penalty = penalty;
        self
    }

    fn coverage(world: &World) -> impl Iterator<Item = f64> + '_ {
        world.landmarks.iter().map(|l| {
            world
                .agents
                .iter()
                .map(|a| vector::distance(&a.body.position, &l.body.position))
                .fold(f64::INFINITY, f64::min)
        })
    }

    fn collisions(agent: usize, world: &World) -> usize {
        let me = &world.agents[agent].body;
        world
            .agents
            .iter()
            .enumerate()
            .filter(|(k, other)| *k != agent && touching(me, &other.body))
            .count()
    }
}

impl Scenario for Spread {
    fn name(&self) -> &str {
        "spread"
    }

    fn make_world(&self) -> Result<World, ConfigError> {
        World::builder(self.params.clone())
            .agents((0..self.agents).map(|k| {
                Agent::new(format!("agent {k}"))
                    .size(self.agent_size)
                    .silent(true)
            }))
            .landmarks((0..self.landmarks).map(|k| Landmark::new(format!("landmark {k}")).collide(false)))
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
        for landmark in &mut world.landmarks {
            landmark.body.position = uniform_point(rng, dim_p, 1.0);
            landmark.body.velocity = vector::zeros(dim_p);
        }
    }

    fn observation(&self, agent: usize, world: &World) -> Observation {
        let me = &world.agents[agent];
        let mut obs: Observation = me.body.velocity.to_vec();
        obs.extend_from_slice(&me.body.position);
        for landmark in &world.landmarks {
            obs.extend(vector::sub(&landmark.body.position, &me.body.position));
        }
        let others = world.agents.iter().enumerate().filter(|(k, _)| *k != agent);
        for (_, other) in others.clone() {
            obs.extend(vector::sub(&other.body.position, &me.body.position));
        }
        for (_, other) in others {
            obs.extend_from_slice(&other.comm);
        }
        obs
    }

    fn reward(&self, agent: usize, world: &World) -> f64 {
        let coverage: f64 = Self::coverage(world).sum();
        -coverage - self.collision_penalty * Self::collisions(agent, world) as f64
    }

    fn info(&self, agent: usize, world: &World) -> Info {
        let mut info = Info::new();
        let distances: Vec<f64> = Self::coverage(world).collect();
        info.insert("coverage".into(), distances.iter().sum());
        info.insert(
            "occupied".into(),
            distances.iter().filter(|&&d| d < OCCUPIED_RADIUS).count() as f64,
        );
        info.insert("collisions".into(), Self::collisions(agent, world) as f64);
        info
    }
}
