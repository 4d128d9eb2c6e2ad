//! The [`World`] container and its validating [`WorldBuilder`].

use tandem_core::{ConfigError, TickId};

use crate::entity::{Agent, Body, Landmark};
use crate::params::WorldParams;

/// Ordered agents and landmarks plus the global constants.
///
/// Entity indices are stable for the lifetime of the world: agents come
/// first, in insertion order, followed by landmarks. Entities are never
/// added or removed after [`WorldBuilder::build`].
#[derive(Clone, Debug)]
pub struct World {
    params: WorldParams,
    /// Agents, in insertion order.
    pub agents: Vec<Agent>,
    /// Landmarks, in insertion order.
    pub landmarks: Vec<Landmark>,
    tick: TickId,
}

impl World {
    /// Start building a world with the given constants.
    pub fn builder(params: WorldParams) -> WorldBuilder {
        WorldBuilder {
            params,
            agents: Vec::new(),
            landmarks: Vec::new(),
        }
    }

    /// Global constants.
    pub fn params(&self) -> &WorldParams {
        &self.params
    }

    /// Ticks advanced since construction or the last tick reset.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    pub(crate) fn advance_tick(&mut self) {
        self.tick = self.tick.next();
    }

    /// Rewind the tick counter to zero.
    pub fn reset_tick(&mut self) {
        self.tick = TickId::default();
    }

    /// Agents plus landmarks.
    pub fn entity_count(&self) -> usize {
        self.agents.len() + self.landmarks.len()
    }

    /// The body at entity index `index` (agents first).
    ///
    /// # Panics
    ///
    /// Panics if `index >= entity_count()`.
    pub fn body(&self, index: usize) -> &Body {
        match self.agents.get(index) {
            Some(agent) => &agent.body,
            None => &self.landmarks[index - self.agents.len()].body,
        }
    }

    /// Mutable access to the body at entity index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= entity_count()`.
    pub fn body_mut(&mut self, index: usize) -> &mut Body {
        let n = self.agents.len();
        if index < n {
            &mut self.agents[index].body
        } else {
            &mut self.landmarks[index - n].body
        }
    }

    /// All bodies in entity-index order.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.agents
            .iter()
            .map(|a| &a.body)
            .chain(self.landmarks.iter().map(|l| &l.body))
    }

    /// All bodies in entity-index order, mutably.
    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.agents
            .iter_mut()
            .map(|a| &mut a.body)
            .chain(self.landmarks.iter_mut().map(|l| &mut l.body))
    }

    /// Indices of agents driven by controllers (not scripted).
    pub fn policy_agents(&self) -> impl Iterator<Item = usize> + '_ {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.is_scripted())
            .map(|(i, _)| i)
    }

    /// Indices of agents driven by a [`Behavior`](crate::Behavior).
    pub fn scripted_agents(&self) -> impl Iterator<Item = usize> + '_ {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_scripted())
            .map(|(i, _)| i)
    }
}

/// Collects entities and validates the whole world at [`build`](Self::build).
#[derive(Debug)]
pub struct WorldBuilder {
    params: WorldParams,
    agents: Vec<Agent>,
    landmarks: Vec<Landmark>,
}

impl WorldBuilder {
    /// Add one agent.
    pub fn agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add several agents.
    pub fn agents(mut self, agents: impl IntoIterator<Item = Agent>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Add one landmark.
    pub fn landmark(mut self, landmark: Landmark) -> Self {
        self.landmarks.push(landmark);
        self
    }

    /// Add several landmarks.
    pub fn landmarks(mut self, landmarks: impl IntoIterator<Item = Landmark>) -> Self {
        self.landmarks.extend(landmarks);
        self
    }

    /// Validate constants and every entity, filling unset vectors with zeros.
    pub fn build(mut self) -> Result<World, ConfigError> {
        self.params.validate()?;
        let (dim_p, dim_c) = (self.params.dim_p, self.params.dim_c);
        for agent in &mut self.agents {
            agent.finalize(dim_p, dim_c)?;
        }
        for landmark in &mut self.landmarks {
            landmark.body.finalize(dim_p)?;
        }
        tracing::debug!(
            agents = self.agents.len(),
            landmarks = self.landmarks.len(),
            dim_p,
            dim_c,
            "world built"
        );
        Ok(World {
            params: self.params,
            agents: self.agents,
            landmarks: self.landmarks,
            tick: TickId::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Behavior;
    use crate::entity::Action;
    use rand::RngCore;
    use std::sync::Arc;

    struct Idle;

    impl Behavior for Idle {
        fn name(&self) -> &str {
            "idle"
        }
        fn act(&self, _: usize, world: &World, _: &mut dyn RngCore) -> Action {
            Action::zeros(world.params().dim_p, world.params().dim_c)
        }
    }

    fn world() -> World {
        World::builder(WorldParams::default())
            .agent(Agent::new("a0"))
            .agent(Agent::new("a1").scripted(Arc::new(Idle)))
            .agent(Agent::new("a2"))
            .landmark(Landmark::new("l0").at(&[1.0, 1.0]))
            .build()
            .unwrap()
    }

    #[test]
    fn entity_indices_put_agents_first() {
        let w = world();
        assert_eq!(w.entity_count(), 4);
        assert_eq!(w.body(0).name, "a0");
        assert_eq!(w.body(3).name, "l0");
        let names: Vec<_> = w.bodies().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["a0", "a1", "a2", "l0"]);
    }

    #[test]
    fn policy_and_scripted_agents_partition() {
        let w = world();
        assert_eq!(w.policy_agents().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(w.scripted_agents().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn build_rejects_bad_params() {
        let err = World::builder(WorldParams {
            contact_margin: 0.0,
            ..Default::default()
        })
        .build()
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidContactMargin { .. }));
    }

    #[test]
    fn build_rejects_bad_landmark() {
        let err = World::builder(WorldParams::default())
            .landmark(Landmark::new("l").at(&[1.0]))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DimensionMismatch { .. }));
    }

    #[test]
    fn tick_starts_at_zero() {
        let mut w = world();
        assert_eq!(w.tick(), TickId(0));
        w.advance_tick();
        w.advance_tick();
        assert_eq!(w.tick(), TickId(2));
        w.reset_tick();
        assert_eq!(w.tick(), TickId(0));
    }
}
