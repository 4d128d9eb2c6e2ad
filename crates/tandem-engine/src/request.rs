//! Messages exchanged between controllers and the host.

use std::sync::Arc;

use indexmap::IndexMap;
use tandem_physics::Action;
use thiserror::Error;

/// Flat per-agent observation.
pub type Observation = Vec<f64>;

/// Named diagnostic values for one agent, in insertion order.
pub type Info = IndexMap<String, f64>;

/// What a controller asks for this tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    /// Apply an action and advance one tick. The host multiplies `u` by
    /// the agent's sensitivity before it becomes a force.
    Step(Action),
    /// Start a new episode.
    Reset,
    /// Ask the host to render. Does not take part in the barrier.
    Render,
}

impl Request {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Step(_) => "step",
            Request::Reset => "reset",
            Request::Render => "render",
        }
    }
}

/// Diagnostic info attached to a step result.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentInfo {
    /// This agent's own info.
    Own(Info),
    /// Every policy agent's info, in identity order. Shared between all
    /// responses of a cycle.
    All(Arc<[Info]>),
}

/// Per-agent result of a step cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// Observation after the tick.
    pub observation: Observation,
    /// Reward for the tick, or the team sum with `shared_reward`.
    pub reward: f64,
    /// Whether the agent's episode has ended.
    pub done: bool,
    /// Diagnostics.
    pub info: AgentInfo,
}

/// Why the host refused a cycle. Every participant of the cycle receives
/// the same reason and the world is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The cycle's participant count does not match the number of policy
    /// agents in the world.
    #[error("{got} participants for {expected} policy agents")]
    MismatchedBatchSize {
        /// Policy agents in the world.
        expected: usize,
        /// Participants in the cycle.
        got: usize,
    },
    /// An action vector has the wrong length.
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
    /// An action component is NaN or infinite, before or after scaling
    /// by the agent's sensitivity.
    #[error("action {what} of agent {agent} is not finite")]
    NonFiniteAction {
        /// Rank of the offending participant.
        agent: usize,
        /// `"u"` or `"c"`.
        what: &'static str,
    },
    /// Step and reset requests arrived in the same cycle.
    #[error("step and reset requests mixed in one cycle")]
    MixedCycle,
}

/// What the host sends back to a controller.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// Result of a step cycle.
    Step(StepOutcome),
    /// Initial observation of a new episode.
    Reset(Observation),
    /// The cycle was refused.
    Rejected(RejectReason),
}
