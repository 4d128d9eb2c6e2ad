//! Soft-contact particle world and its deterministic integrator.
//!
//! A [`World`] holds ordered agents and landmarks. [`PhysicsEngine::step`]
//! advances it by exactly one tick:
//!
//! 1. scripted agents ([`Behavior`]) choose their actions
//! 2. the scratch force buffer is zeroed
//! 3. motor forces (action plus optional Gaussian noise) accumulate
//! 4. pairwise softplus contact forces accumulate
//! 5. damping, acceleration, speed clamp and position update
//! 6. communication state is refreshed
//! 7. the tick counter advances
//!
//! All randomness comes from a ChaCha8 stream keyed by `seed XOR tick` on a
//! per-episode stream (see [`PhysicsEngine::set_episode`]),
//! so two worlds built from the same configuration and fed the same
//! actions evolve identically.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod behavior;
pub mod contact;
pub mod engine;
pub mod entity;
pub mod noise;
pub mod params;
pub mod world;

pub use behavior::Behavior;
pub use contact::{collision_force, softplus, MIN_SEPARATION};
pub use engine::PhysicsEngine;
pub use entity::{Action, Agent, Body, Landmark};
pub use params::WorldParams;
pub use world::{World, WorldBuilder};
