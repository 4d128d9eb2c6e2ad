//! The [`Scenario`] trait: what a world contains and how agents are scored.

use rand_chacha::ChaCha8Rng;
use tandem_core::{ConfigError, ParticipantId};
use tandem_physics::World;

use crate::request::{Info, Observation};

/// Task definition plugged into a [`SimulationHost`](crate::SimulationHost).
///
/// Agent indices passed to the per-agent methods are indices into
/// `world.agents`. The host only asks about policy agents (those without a
/// [`Behavior`](tandem_physics::Behavior)).
///
/// # Example
///
/// ```
/// use rand::Rng;
/// use rand_chacha::ChaCha8Rng;
/// use tandem_core::ConfigError;
/// use tandem_engine::{Observation, Scenario};
/// use tandem_physics::{Agent, World, WorldParams};
///
/// /// One agent rewarded for staying near the origin.
/// struct Home;
///
/// impl Scenario for Home {
///     fn name(&self) -> &str {
///         "home"
///     }
///
///     fn make_world(&self) -> Result<World, ConfigError> {
///         World::builder(WorldParams::default())
///             .agent(Agent::new("agent 0"))
///             .build()
///     }
///
///     fn reset_world(&self, world: &mut World, rng: &mut ChaCha8Rng) {
///         for agent in &mut world.agents {
///             for x in agent.body.position.iter_mut() {
///                 *x = rng.random_range(-1.0..1.0);
///             }
///         }
///     }
///
///     fn observation(&self, agent: usize, world: &World) -> Observation {
///         world.agents[agent].body.position.to_vec()
///     }
///
///     fn reward(&self, agent: usize, world: &World) -> f64 {
///         -tandem_core::vector::norm(&world.agents[agent].body.position)
///     }
/// }
/// ```
pub trait Scenario: Send + 'static {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Build the world's entities. Called once by the host.
    fn make_world(&self) -> Result<World, ConfigError>;

    /// Reinitialize entity state for a new episode.
    fn reset_world(&self, world: &mut World, rng: &mut ChaCha8Rng);

    /// Observation of agent `agent`.
    fn observation(&self, agent: usize, world: &World) -> Observation;

    /// Reward of agent `agent` for the tick just taken.
    fn reward(&self, agent: usize, world: &World) -> f64;

    /// Whether agent `agent`'s episode has ended. Default: never.
    fn done(&self, _agent: usize, _world: &World) -> bool {
        false
    }

    /// Diagnostics for agent `agent`. Default: empty.
    fn info(&self, _agent: usize, _world: &World) -> Info {
        Info::new()
    }

    /// Runs after physics and before observations are computed.
    fn post_step(&self, _world: &mut World) {}
}

/// Receives render requests drained by the host at the start of a cycle.
///
/// Closures `FnMut(&World, ParticipantId)` implement this trait.
pub trait RenderSink: Send + 'static {
    /// Render `world` on behalf of `requested_by`.
    fn render(&mut self, world: &World, requested_by: ParticipantId);
}

impl<F> RenderSink for F
where
    F: FnMut(&World, ParticipantId) + Send + 'static,
{
    fn render(&mut self, world: &World, requested_by: ParticipantId) {
        self(world, requested_by)
    }
}
