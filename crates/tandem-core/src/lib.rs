//! Core types for the Tandem lockstep simulation core.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers shared by the barrier and the physics engine, the
//! small fixed-dimension vector type used for positions and forces, and
//! the error taxonomy returned by every other crate in the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod vector;

pub use error::{BarrierError, ConfigError};
pub use id::{CycleId, ParticipantId, TickId};
pub use vector::Vector;
