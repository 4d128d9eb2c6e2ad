//! Error types for the Tandem simulation core.
//!
//! Organized by subsystem: [`BarrierError`] for the rendezvous protocol
//! and [`ConfigError`] for world construction. Both are returned
//! synchronously from the call that detected the problem; there is no
//! background error channel.

use std::time::Duration;

use thiserror::Error;

use crate::id::ParticipantId;

/// Errors from the synchronization barrier and its mailboxes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BarrierError {
    /// A result batch does not carry exactly one item per participant of
    /// the cycle. Nothing was delivered; the cycle is still open.
    #[error("batch has {got} items but the cycle has {expected} participants")]
    MismatchedBatchSize {
        /// Participants in the cycle roster.
        expected: usize,
        /// Items in the rejected batch.
        got: usize,
    },
    /// A participant submitted again before its previous submission was
    /// answered.
    #[error("participant {participant} already has an outstanding submission")]
    DoubleSubmission {
        /// The offending participant.
        participant: ParticipantId,
    },
    /// A deadline expired before the cycle completed or the result arrived.
    ///
    /// Recoverable: the caller may retry, or deregister the participants
    /// listed in `missing`.
    #[error("barrier timed out after {waited:?}; {} participant(s) missing", .missing.len())]
    BarrierTimeout {
        /// How long the caller waited.
        waited: Duration,
        /// Participants whose submission (consumer side) or result
        /// (producer side) never arrived.
        missing: Vec<ParticipantId>,
    },
    /// The identity is not (or no longer) registered with this barrier.
    #[error("participant {participant} is not registered")]
    UnknownParticipant {
        /// The unknown identity.
        participant: ParticipantId,
    },
    /// `await_cycle` was called before the previous cycle was dispatched.
    #[error("previous cycle has not been dispatched yet")]
    DispatchPending,
    /// `dispatch` was called while no collected cycle is awaiting results.
    #[error("no collected cycle is awaiting dispatch")]
    NoCycleInFlight,
    /// A participant's outbox still holds an unconsumed result from an
    /// earlier cycle. Nothing was delivered.
    #[error("outbox of participant {participant} still holds an unconsumed result")]
    OutboxOccupied {
        /// The participant with the stale result.
        participant: ParticipantId,
    },
    /// The barrier was closed; no further cycles will run.
    #[error("barrier closed")]
    Closed,
}

/// Invalid world or engine configuration, detected at construction.
///
/// Every variant is fatal for the configuration that produced it.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Mass is zero, negative, or not finite.
    #[error("entity '{entity}' has non-positive mass {mass}")]
    NonPositiveMass {
        /// Entity name.
        entity: String,
        /// The rejected mass.
        mass: f64,
    },
    /// `dt` is negative or not finite.
    #[error("dt must be finite and non-negative, got {value}")]
    InvalidTimestep {
        /// The rejected value.
        value: f64,
    },
    /// `contact_margin` is not strictly positive and finite.
    #[error("contact_margin must be finite and positive, got {value}")]
    InvalidContactMargin {
        /// The rejected value.
        value: f64,
    },
    /// `damping` is outside `[0, 1]`.
    #[error("damping must lie in [0, 1], got {value}")]
    InvalidDamping {
        /// The rejected value.
        value: f64,
    },
    /// `contact_force` is negative or not finite.
    #[error("contact_force must be finite and non-negative, got {value}")]
    InvalidContactForce {
        /// The rejected value.
        value: f64,
    },
    /// Positional dimension is zero.
    #[error("dim_p must be at least 1")]
    InvalidDimension,
    /// A vector does not have the dimension the world expects.
    #[error("entity '{entity}': {what} has length {got}, expected {expected}")]
    DimensionMismatch {
        /// Entity name.
        entity: String,
        /// Which vector (position, velocity, ...).
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },
    /// Size is negative or not finite.
    #[error("entity '{entity}' has invalid size {size}")]
    NegativeSize {
        /// Entity name.
        entity: String,
        /// The rejected size.
        size: f64,
    },
    /// `max_speed` is set but not strictly positive and finite.
    #[error("entity '{entity}' has invalid max_speed {value}")]
    InvalidMaxSpeed {
        /// Entity name.
        entity: String,
        /// The rejected value.
        value: f64,
    },
    /// A noise magnitude is negative or not finite.
    #[error("entity '{entity}' has invalid {which} noise {value}")]
    InvalidNoise {
        /// Entity name.
        entity: String,
        /// `"motor"` or `"communication"`.
        which: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// An action sensitivity (`accel`) is negative or not finite.
    #[error("action sensitivity must be finite and non-negative, got {value}")]
    InvalidSensitivity {
        /// The rejected value.
        value: f64,
    },
}
