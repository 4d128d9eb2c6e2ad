//! [`PhysicsEngine`]: advances a [`World`] by one tick.

use tandem_core::{vector, Vector};

use crate::contact::collision_force;
use crate::entity::Action;
use crate::noise;
use crate::world::World;

/// Deterministic single-tick integrator.
///
/// Owns the per-entity force buffer, which is zeroed at the start of
/// every tick and left intact afterwards so callers can inspect it with
/// [`last_forces`](Self::last_forces).
#[derive(Clone, Debug)]
pub struct PhysicsEngine {
    seed: u64,
    episode: u64,
    forces: Vec<Vector>,
    contacts: usize,
}

impl PhysicsEngine {
    /// An engine whose noise is keyed by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            episode: 0,
            forces: Vec::new(),
            contacts: 0,
        }
    }

    /// The noise seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The episode whose noise stream the next ticks draw from.
    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Switch to the noise stream of `episode`. Ticks of different
    /// episodes never share noise, even when the tick counter restarts.
    pub fn set_episode(&mut self, episode: u64) {
        self.episode = episode;
    }

    /// Forces accumulated during the last [`step`](Self::step), one per
    /// entity (agents first). Empty before the first step.
    pub fn last_forces(&self) -> &[Vector] {
        &self.forces
    }

    /// Colliding pairs evaluated during the last step.
    pub fn last_contacts(&self) -> usize {
        self.contacts
    }

    /// Drop the forces of the previous tick.
    pub fn clear(&mut self) {
        self.forces.clear();
        self.contacts = 0;
    }

    /// Advance `world` by exactly one tick.
    pub fn step(&mut self, world: &mut World) {
        let mut rng = noise::tick_rng(self.seed, self.episode, world.tick());

        // Scripted actions see the world as it was before any is assigned.
        let scripted: Vec<(usize, Action)> = world
            .agents
            .iter()
            .enumerate()
            .filter_map(|(i, agent)| agent.behavior.as_ref().map(|b| (i, b)))
            .map(|(i, b)| (i, b.act(i, world, &mut rng)))
            .collect();
        for (i, action) in scripted {
            world.agents[i].action = action;
        }

        let dim_p = world.params().dim_p;
        self.forces.clear();
        self.forces.resize(world.entity_count(), vector::zeros(dim_p));

        for (i, agent) in world.agents.iter().enumerate() {
            if !agent.body.movable {
                continue;
            }
            let force = &mut self.forces[i];
            vector::add_scaled(force, &agent.action.u, 1.0);
            if let Some(sigma) = agent.u_noise {
                let n = noise::gaussian(&mut rng, dim_p, sigma);
                vector::add_scaled(force, &n, 1.0);
            }
        }

        self.contacts = 0;
        let n = world.entity_count();
        for a in 0..n {
            for b in (a + 1)..n {
                if let Some((on_a, on_b)) =
                    collision_force(world.body(a), world.body(b), world.params())
                {
                    vector::add_scaled(&mut self.forces[a], &on_a, 1.0);
                    vector::add_scaled(&mut self.forces[b], &on_b, 1.0);
                    self.contacts += 1;
                }
            }
        }

        let params = world.params().clone();
        for (body, force) in world.bodies_mut().zip(&self.forces) {
            vector::scale(&mut body.velocity, 1.0 - params.damping);
            if body.movable {
                vector::add_scaled(&mut body.velocity, force, params.dt / body.mass);
            }
            if let Some(max) = body.max_speed {
                let speed = vector::norm(&body.velocity);
                if speed > max {
                    vector::scale(&mut body.velocity, max / speed);
                }
            }
            vector::add_scaled(&mut body.position, &body.velocity, params.dt);
        }

        let dim_c = params.dim_c;
        for agent in world.agents.iter_mut().filter(|a| !a.is_scripted()) {
            if agent.silent {
                agent.comm = vector::zeros(dim_c);
                continue;
            }
            agent.comm = agent.action.c.clone();
            if let Some(sigma) = agent.c_noise {
                let n = noise::gaussian(&mut rng, dim_c, sigma);
                vector::add_scaled(&mut agent.comm, &n, 1.0);
            }
        }

        debug_assert!(
            world
                .bodies()
                .all(|b| b.position.iter().chain(&b.velocity).all(|x| x.is_finite())),
            "non-finite state after tick {}",
            world.tick()
        );
        world.advance_tick();
        tracing::trace!(tick = %world.tick(), contacts = self.contacts, "physics tick");
    }
}
