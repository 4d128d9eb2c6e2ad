//! Per-cycle metrics reported by the host.

use tandem_core::{CycleId, TickId};

use crate::request::RejectReason;

/// Timing of a single host cycle.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CycleMetrics {
    /// Wall-clock time for the whole cycle.
    pub total_us: u64,
    /// Time blocked in the barrier waiting for submissions.
    pub wait_us: u64,
    /// Time spent in the physics engine.
    pub physics_us: u64,
    /// Time spent computing observations, rewards and info.
    pub scenario_us: u64,
    /// Time spent delivering responses.
    pub dispatch_us: u64,
    /// Participants in the cycle roster.
    pub participants: usize,
    /// Render requests forwarded before the cycle.
    pub renders: usize,
    /// World tick after the cycle.
    pub tick: TickId,
}

/// What a cycle did.
#[derive(Clone, Debug, PartialEq)]
pub enum CycleKind {
    /// Physics advanced one tick.
    Step,
    /// A new episode started.
    Reset,
    /// Every participant was refused; the world is untouched.
    Rejected(RejectReason),
    /// No participants were registered.
    Idle,
}

/// Outcome of [`SimulationHost::advance_or_reset`](crate::SimulationHost::advance_or_reset).
#[derive(Clone, Debug, PartialEq)]
pub struct CycleReport {
    /// Barrier cycle that was completed.
    pub cycle: CycleId,
    /// What the cycle did.
    pub kind: CycleKind,
    /// Timings.
    pub metrics: CycleMetrics,
}
