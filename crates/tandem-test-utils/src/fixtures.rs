//! Reusable scenario, behavior and render fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tandem_core::{vector, ConfigError, ParticipantId, Vector};
use tandem_engine::{Info, Observation, RenderSink, Scenario};
use tandem_physics::{Action, Agent, Behavior, Landmark, World, WorldParams};

/// Configurable scenario for engine tests.
///
/// - reset: agents uniform in `[-1, 1]^D` with zero velocity, landmarks
///   uniform in `[-1, 1]^D`
/// - observation: `[velocity, position, comm of every other agent]`
/// - reward: negative distance of the agent to the origin
/// - done: once the world tick reaches `horizon`, if set
/// - info: `{"x": position[0], "tick": tick}`
pub struct PointScenario {
    pub params: WorldParams,
    pub policy_agents: usize,
    pub scripted: Vec<Arc<dyn Behavior>>,
    pub landmarks: usize,
    pub horizon: Option<u64>,
    pub contact: bool,
    pub u_noise: Option<f64>,
}

impl PointScenario {
    pub fn new(policy_agents: usize) -> Self {
        Self {
            params: WorldParams::default(),
            policy_agents,
            scripted: Vec::new(),
            landmarks: 0,
            horizon: None,
            contact: true,
            u_noise: None,
        }
    }

    pub fn with_params(mut self, params: WorldParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_scripted(mut self, behavior: Arc<dyn Behavior>) -> Self {
        self.scripted.push(behavior);
        self
    }

    pub fn with_landmarks(mut self, landmarks: usize) -> Self {
        self.landmarks = landmarks;
        self
    }

    pub fn with_horizon(mut self, horizon: u64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Gaussian motor noise on every policy agent.
    pub fn with_motor_noise(mut self, sigma: f64) -> Self {
        self.u_noise = Some(sigma);
        self
    }

    /// Agents that never touch each other.
    pub fn without_contact(mut self) -> Self {
        self.contact = false;
        self
    }
}

fn uniform(rng: &mut ChaCha8Rng, dim: usize) -> Vector {
    (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect()
}

impl Scenario for PointScenario {
    fn name(&self) -> &str {
        "point"
    }

    fn make_world(&self) -> Result<World, ConfigError> {
        let policy = (0..self.policy_agents).map(|k| {
            let agent = Agent::new(format!("agent {k}")).collide(self.contact);
            match self.u_noise {
                Some(sigma) => agent.u_noise(sigma),
                None => agent,
            }
        });
        let scripted = self
            .scripted
            .iter()
            .enumerate()
            .map(|(k, b)| {
                Agent::new(format!("scripted {k}"))
                    .collide(self.contact)
                    .scripted(Arc::clone(b))
            });
        World::builder(self.params.clone())
            .agents(policy)
            .agents(scripted)
            .landmarks((0..self.landmarks).map(|k| Landmark::new(format!("landmark {k}")).collide(false)))
            .build()
    }

    fn reset_world(&self, world: &mut World, rng: &mut ChaCha8Rng) {
        let dim_p = world.params().dim_p;
        let dim_c = world.params().dim_c;
        for agent in &mut world.agents {
            agent.body.position = uniform(rng, dim_p);
            agent.body.velocity = vector::zeros(dim_p);
            agent.comm = vector::zeros(dim_c);
            agent.action = Action::zeros(dim_p, dim_c);
        }
        for landmark in &mut world.landmarks {
            landmark.body.position = uniform(rng, dim_p);
            landmark.body.velocity = vector::zeros(dim_p);
        }
    }

    fn observation(&self, agent: usize, world: &World) -> Observation {
        let me = &world.agents[agent];
        let mut obs: Observation = me.body.velocity.to_vec();
        obs.extend_from_slice(&me.body.position);
        for (k, other) in world.agents.iter().enumerate() {
            if k != agent {
                obs.extend_from_slice(&other.comm);
            }
        }
        obs
    }

    fn reward(&self, agent: usize, world: &World) -> f64 {
        -vector::norm(&world.agents[agent].body.position)
    }

    fn done(&self, _agent: usize, world: &World) -> bool {
        self.horizon.is_some_and(|h| world.tick().0 >= h)
    }

    fn info(&self, agent: usize, world: &World) -> Info {
        let mut info = Info::new();
        info.insert("x".into(), world.agents[agent].body.position[0]);
        info.insert("tick".into(), world.tick().0 as f64);
        info
    }
}

/// Always returns the same action.
pub struct ConstBehavior {
    pub u: Vec<f64>,
}

impl ConstBehavior {
    pub fn new(u: &[f64]) -> Self {
        Self { u: u.to_vec() }
    }
}

impl Behavior for ConstBehavior {
    fn name(&self) -> &str {
        "const"
    }

    fn act(&self, _agent: usize, world: &World, _rng: &mut dyn rand::RngCore) -> Action {
        Action::motor(&self.u, world.params().dim_c)
    }
}

/// Zero action; counts how often it was consulted.
#[derive(Default)]
pub struct CountingBehavior {
    calls: AtomicUsize,
}

impl CountingBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Behavior for CountingBehavior {
    fn name(&self) -> &str {
        "counting"
    }

    fn act(&self, _agent: usize, world: &World, _rng: &mut dyn rand::RngCore) -> Action {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Action::zeros(world.params().dim_p, world.params().dim_c)
    }
}

/// Render sink recording `(tick, requester)` pairs.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub seen: Arc<Mutex<Vec<(u64, ParticipantId)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> Vec<(u64, ParticipantId)> {
        self.seen.lock().unwrap().clone()
    }
}

impl RenderSink for RecordingSink {
    fn render(&mut self, world: &World, requested_by: ParticipantId) {
        self.seen.lock().unwrap().push((world.tick().0, requested_by));
    }
}
