//! Benchmark profiles and utilities for the Tandem lockstep core.
//!
//! Provides pre-built worlds for benchmarks and examples:
//!
//! - [`reference_world`]: 8 agents and 8 landmarks in 2-D
//! - [`stress_world`]: 128 agents and 32 landmarks in 2-D
//! - [`scatter`]: deterministic placement via seed
//! - [`reference_spread`]: the cooperative coverage scenario used by the demo

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::Rng;
use tandem_physics::{noise, Agent, Landmark, World, WorldParams};
use tandem_scenarios::Spread;

/// Reference profile: 8 agents (28 agent pairs) plus 8 landmarks.
pub fn reference_world(seed: u64) -> World {
    profile(8, 8, seed)
}

/// Stress profile: 128 agents plus 32 landmarks (12 720 pairs per tick).
pub fn stress_world(seed: u64) -> World {
    profile(128, 32, seed)
}

fn profile(agents: usize, landmarks: usize, seed: u64) -> World {
    let mut world = World::builder(WorldParams::default())
        .agents((0..agents).map(|k| Agent::new(format!("agent {k}")).size(0.05).u_noise(0.1)))
        .landmarks((0..landmarks).map(|k| Landmark::new(format!("landmark {k}")).size(0.1)))
        .build()
        .unwrap();
    scatter(&mut world, seed);
    world
}

/// Place every entity uniformly in `[-1, 1]^D`, deterministically per seed.
pub fn scatter(world: &mut World, seed: u64) {
    let mut rng = noise::episode_rng(seed, 0);
    for body in world.bodies_mut() {
        for x in body.position.iter_mut() {
            *x = rng.random_range(-1.0..1.0);
        }
    }
}

/// Spread with `agents` agents, as driven by the lockstep demo.
pub fn reference_spread(agents: usize) -> Spread {
    Spread::new(agents)
}
