//! Tandem: lockstep multi-agent particle simulation for reinforcement learning.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Tandem sub-crates. For most users, adding `tandem` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::thread;
//! use tandem::prelude::*;
//! use tandem::scenarios::Spread;
//!
//! let host = SimulationHost::new(Spread::new(2), EnvConfig::default()).unwrap();
//! let controllers: Vec<_> = (0..2).map(|_| host.spawn_controller().unwrap()).collect();
//! let mut running = HostThread::spawn(host).unwrap();
//!
//! thread::scope(|s| {
//!     for mut c in controllers {
//!         s.spawn(move || {
//!             c.reset().unwrap();
//!             for _ in 0..5 {
//!                 let outcome = c.step(Action::zeros(2, 2)).unwrap();
//!                 assert!(outcome.reward.is_finite());
//!             }
//!         });
//!     }
//! });
//!
//! let host = running.shutdown().unwrap();
//! assert_eq!(host.world().tick(), TickId(5));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tandem-core` | IDs, vectors, shared error types |
//! | [`sync`] | `tandem-sync` | Cycle barrier and participant mailboxes |
//! | [`physics`] | `tandem-physics` | Entities, world, contact model, physics tick |
//! | [`engine`] | `tandem-engine` | Simulation host, controllers, host thread |
//! | [`scenarios`] | `tandem-scenarios` | Reference scenarios (spread, chase) |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core IDs, vector helpers and errors (`tandem-core`).
pub use tandem_core as types;

/// Cycle barrier (`tandem-sync`).
///
/// [`sync::Barrier`] collects one submission per registered participant
/// and hands each its own result; [`sync::Mailbox`] is the participant side.
pub use tandem_sync as sync;

/// Particle physics (`tandem-physics`).
///
/// Build a [`physics::World`] with [`physics::WorldBuilder`] and advance it
/// with [`physics::PhysicsEngine`].
pub use tandem_physics as physics;

/// Lockstep orchestration (`tandem-engine`).
///
/// [`engine::SimulationHost`] runs one barrier cycle per call;
/// [`engine::HostThread`] runs it in the background.
pub use tandem_engine as engine;

/// Reference scenarios (`tandem-scenarios`).
pub use tandem_scenarios as scenarios;

/// Common imports for typical Tandem usage.
///
/// ```rust
/// use tandem::prelude::*;
/// ```
///
/// This imports the scenario and behavior traits, world construction types,
/// the host and controller types, and the error types.
pub mod prelude {
    // Core types
    pub use tandem_core::{BarrierError, ConfigError, CycleId, ParticipantId, TickId, Vector};

    // Sync
    pub use tandem_sync::BarrierConfig;

    // Physics
    pub use tandem_physics::{
        Action, Agent, Behavior, Body, Landmark, PhysicsEngine, World, WorldBuilder, WorldParams,
    };

    // Engine
    pub use tandem_engine::{
        AgentInfo, ControllerError, ControllerFactory, ControllerHandle, CycleKind, CycleMetrics,
        EnvConfig, HostError, HostThread, Info, Observation, RenderSink, Request, Response,
        Scenario, SimulationHost, StepOutcome,
    };

    // Needed to implement `Scenario::reset_world`.
    pub use rand_chacha::ChaCha8Rng;
}
