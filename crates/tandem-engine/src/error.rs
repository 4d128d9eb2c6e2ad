//! Host and controller error types.

use tandem_core::{BarrierError, ConfigError};
use thiserror::Error;

use crate::request::RejectReason;

/// Errors from [`SimulationHost`](crate::SimulationHost).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum HostError {
    /// The barrier failed (timeout, close, protocol violation).
    #[error(transparent)]
    Barrier(#[from] BarrierError),
    /// The world or environment configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A cycle's participant count did not match the policy agents. Every
    /// participant was sent [`RejectReason::MismatchedBatchSize`].
    #[error("cycle had {got} participants but the world has {expected} policy agents")]
    MismatchedBatchSize {
        /// Policy agents in the world.
        expected: usize,
        /// Participants in the cycle.
        got: usize,
    },
    /// A submitted action had the wrong dimension. Every participant was
    /// sent [`RejectReason::ActionDimension`].
    #[error("action {what} of agent {agent} has length {got}, expected {expected}")]
    ActionDimension {
        /// Rank of the offending participant.
        agent: usize,
        /// `"u"` or `"c"`.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },
    /// A submitted action had a NaN or infinite component. Every
    /// participant was sent [`RejectReason::NonFiniteAction`].
    #[error("action {what} of agent {agent} is not finite")]
    NonFiniteAction {
        /// Rank of the offending participant.
        agent: usize,
        /// `"u"` or `"c"`.
        what: &'static str,
    },
}

impl HostError {
    /// The host-side error for a step rejected because of one bad action.
    pub(crate) fn from_rejected_step(reason: &RejectReason) -> Option<Self> {
        match *reason {
            RejectReason::ActionDimension {
                agent,
                what,
                expected,
                got,
            } => Some(Self::ActionDimension {
                agent,
                what,
                expected,
                got,
            }),
            RejectReason::NonFiniteAction { agent, what } => {
                Some(Self::NonFiniteAction { agent, what })
            }
            RejectReason::MismatchedBatchSize { .. } | RejectReason::MixedCycle => None,
        }
    }
}

/// Errors surfaced to a [`ControllerHandle`](crate::ControllerHandle).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ControllerError {
    /// The barrier failed (timeout, close, protocol violation).
    #[error(transparent)]
    Barrier(#[from] BarrierError),
    /// The host refused the cycle.
    #[error("request rejected: {0}")]
    Rejected(RejectReason),
    /// The host answered with a response of the wrong kind.
    #[error("expected a {expected} response")]
    UnexpectedResponse {
        /// The response kind the call expected.
        expected: &'static str,
    },
}
