//! Strongly-typed identifiers.

use std::fmt;

/// Identifies one participant (agent controller) registered with a barrier.
///
/// Assigned monotonically starting at 0 by the barrier's own counter and
/// never reused within that barrier's lifetime. The derived `Ord` is the
/// ordering key used to normalize every collected batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ParticipantId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the physical world advances one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickId(pub u64);

impl TickId {
    /// The tick that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Counts completed barrier cycles (collect, sort, dispatch).
///
/// Distinct from [`TickId`]: reset cycles and rejected cycles complete a
/// barrier cycle without advancing the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleId(pub u64);

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CycleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_ids_order_numerically() {
        let mut ids = vec![ParticipantId(3), ParticipantId(0), ParticipantId(10)];
        ids.sort();
        assert_eq!(ids, vec![ParticipantId(0), ParticipantId(3), ParticipantId(10)]);
    }

    #[test]
    fn tick_next_increments() {
        assert_eq!(TickId(0).next(), TickId(1));
        assert_eq!(TickId::default(), TickId(0));
    }

    #[test]
    fn display_is_bare_number() {
        assert_eq!(ParticipantId(7).to_string(), "7");
        assert_eq!(TickId(42).to_string(), "42");
        assert_eq!(CycleId::from(5).to_string(), "5");
    }
}
