//! Lockstep tick orchestration for Tandem worlds.
//!
//! A [`SimulationHost`] owns the [`World`](tandem_physics::World), the
//! [`PhysicsEngine`](tandem_physics::PhysicsEngine) and the consumer side
//! of a [`Barrier`](tandem_sync::Barrier). Each agent controller holds a
//! [`ControllerHandle`] and calls
//! [`submit_and_await`](ControllerHandle::submit_and_await) once per tick;
//! the host calls [`advance_or_reset`](SimulationHost::advance_or_reset)
//! once per tick, either inline or on a [`HostThread`].
//!
//! What a world contains and how agents are observed and rewarded is
//! supplied by a [`Scenario`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod host_thread;
pub mod metrics;
pub mod request;
pub mod scenario;

pub use config::EnvConfig;
pub use controller::{ControllerFactory, ControllerHandle};
pub use error::{ControllerError, HostError};
pub use host::SimulationHost;
pub use host_thread::HostThread;
pub use metrics::{CycleKind, CycleMetrics, CycleReport};
pub use request::{AgentInfo, Info, Observation, RejectReason, Request, Response, StepOutcome};
pub use scenario::{RenderSink, Scenario};
