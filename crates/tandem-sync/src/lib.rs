//! Identity-ordered rendezvous barrier for lockstep multi-agent stepping.
//!
//! A [`Barrier`] collects exactly one submission from every registered
//! participant per cycle, releases the single consumer once the cycle is
//! complete, hands it the batch sorted by [`ParticipantId`], and fans the
//! consumer's results back out through each participant's private
//! single-slot [`Mailbox`].
//!
//! ```text
//! Controller threads (N)               Consumer (world owner)
//!     |                                     |
//!     |--mailbox.submit(s)--> inbox ------->| await_cycle()
//!     |                      [Mutex+Condvar]| sorted by id
//!     |                                     | ... advance world ...
//!     |<--outbox[id]: bounded(1)------------| dispatch(results)
//!     | mailbox.receive()                   |
//! ```
//!
//! Ordering never depends on arrival: position `i` of a collected batch
//! always belongs to the participant with the `i`-th smallest identity in
//! the cycle roster.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod barrier;
pub mod config;
pub mod mailbox;

pub use barrier::{Barrier, CyclePhase, Registrar};
pub use config::BarrierConfig;
pub use mailbox::Mailbox;
pub use tandem_core::{BarrierError, CycleId, ParticipantId};
