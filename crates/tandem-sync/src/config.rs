//! Barrier timeouts.

use std::time::Duration;

/// Default deadlines applied by [`Barrier::await_cycle`](crate::Barrier::await_cycle)
/// and [`Mailbox::receive`](crate::Mailbox::receive).
///
/// `None` blocks indefinitely. The explicit-deadline variants
/// (`await_cycle_deadline`, `receive_deadline`) ignore these defaults.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarrierConfig {
    /// How long the consumer waits for a full cycle. Default: 30 s.
    pub cycle_timeout: Option<Duration>,
    /// How long a participant waits for its result. Default: 30 s.
    pub receive_timeout: Option<Duration>,
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            cycle_timeout: Some(Duration::from_secs(30)),
            receive_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl BarrierConfig {
    /// No deadlines: both sides block until the protocol completes.
    pub fn unbounded() -> Self {
        Self {
            cycle_timeout: None,
            receive_timeout: None,
        }
    }

    /// The same timeout on both sides.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cycle_timeout: Some(timeout),
            receive_timeout: Some(timeout),
        }
    }
}
