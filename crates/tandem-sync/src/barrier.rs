//! The consumer side of the rendezvous: [`Barrier`] and [`Registrar`].
//!
//! # Cycle state machine
//!
//! ```text
//! Collecting ──(every roster id submitted)──> Dispatching ──(dispatch)──> Collecting
//! ```
//!
//! The roster of a cycle is frozen when the consumer starts waiting in
//! [`Barrier::await_cycle`]. Participants registered after that point
//! join the next cycle; their early submissions wait in the inbox.
//! A participant deregistered while the cycle is still collecting is
//! dropped from the roster so the cycle can complete without it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, TrySendError};
use indexmap::IndexMap;
use tandem_core::{BarrierError, CycleId, ParticipantId};

use crate::config::BarrierConfig;
use crate::mailbox::Mailbox;

/// Which half of the cycle the barrier is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    /// Accepting submissions for the next release.
    Collecting,
    /// A batch was released; the consumer owes a [`Barrier::dispatch`].
    Dispatching,
}

// ── Shared state ─────────────────────────────────────────────────

/// Mutable barrier state. Every field is guarded by one mutex so that
/// insertion and the "is the roster complete" check never race.
pub(crate) struct State<S, R> {
    /// Registered participants and their outbox senders, in ascending
    /// identity order (ids are allocated under this lock).
    registry: IndexMap<ParticipantId, Sender<R>>,
    /// Pending submissions keyed by identity.
    inbox: BTreeMap<ParticipantId, S>,
    /// Frozen roster of the cycle being collected or dispatched.
    roster: Option<Vec<ParticipantId>>,
    phase: CyclePhase,
    cycle: CycleId,
    closed: bool,
}

impl<S, R> State<S, R> {
    fn missing(&self) -> Vec<ParticipantId> {
        self.roster
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|id| !self.inbox.contains_key(*id))
            .copied()
            .collect()
    }
}

pub(crate) struct Shared<S, R> {
    state: Mutex<State<S, R>>,
    /// Signalled on every submission, deregistration and close. Only the
    /// consumer waits on it.
    submitted: Condvar,
    next_id: AtomicU64,
    pub(crate) config: BarrierConfig,
}

impl<S, R> Shared<S, R> {
    fn lock(&self) -> MutexGuard<'_, State<S, R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(self: &Arc<Self>) -> Result<Mailbox<S, R>, BarrierError> {
        let mut state = self.lock();
        if state.closed {
            return Err(BarrierError::Closed);
        }
        let id = ParticipantId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = crossbeam_channel::bounded(1);
        state.registry.insert(id, tx);
        let count = state.registry.len();
        drop(state);
        tracing::debug!(participant = %id, participants = count, "participant registered");
        Ok(Mailbox::new(id, Arc::clone(self), rx))
    }

    pub(crate) fn submit(&self, id: ParticipantId, payload: S) -> Result<(), BarrierError> {
        let mut state = self.lock();
        if state.closed {
            return Err(BarrierError::Closed);
        }
        if !state.registry.contains_key(&id) {
            return Err(BarrierError::UnknownParticipant { participant: id });
        }
        if state.inbox.contains_key(&id) {
            return Err(BarrierError::DoubleSubmission { participant: id });
        }
        state.inbox.insert(id, payload);
        let pending = state.inbox.len();
        drop(state);
        tracing::trace!(participant = %id, pending, "submission received");
        self.submitted.notify_all();
        Ok(())
    }

    pub(crate) fn deregister(&self, id: ParticipantId) -> bool {
        let mut state = self.lock();
        let removed = state.registry.shift_remove(&id).is_some();
        state.inbox.remove(&id);
        if state.phase == CyclePhase::Collecting {
            if let Some(roster) = state.roster.as_mut() {
                roster.retain(|p| *p != id);
            }
        }
        drop(state);
        if removed {
            tracing::debug!(participant = %id, "participant deregistered");
            self.submitted.notify_all();
        }
        removed
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        state.inbox.clear();
        state.roster = None;
        // Dropping the senders wakes every blocked `Mailbox::receive`.
        state.registry.clear();
        drop(state);
        tracing::debug!("barrier closed");
        self.submitted.notify_all();
    }
}

// ── Barrier ──────────────────────────────────────────────────────

/// Rendezvous coordinator, owned by the single consumer.
///
/// `S` is the submission type (participant → consumer), `R` the result
/// type (consumer → participant). The consumer-side methods take
/// `&mut self`, so there is exactly one consumer per barrier by
/// construction; participants interact only through their [`Mailbox`].
///
/// Dropping the barrier closes it, unblocking every participant with
/// [`BarrierError::Closed`].
///
/// # Example
///
/// ```
/// use tandem_sync::{Barrier, BarrierConfig};
///
/// let mut barrier: Barrier<u32, u32> = Barrier::new(BarrierConfig::default());
/// let mut a = barrier.register().unwrap();
/// let mut b = barrier.register().unwrap();
///
/// b.submit(20).unwrap();
/// a.submit(10).unwrap();
/// assert_eq!(barrier.await_cycle().unwrap(), vec![10, 20]);
///
/// barrier.dispatch(vec![1, 2]).unwrap();
/// assert_eq!(a.receive().unwrap(), 1);
/// assert_eq!(b.receive().unwrap(), 2);
/// ```
pub struct Barrier<S, R> {
    shared: Arc<Shared<S, R>>,
}

impl<S, R> Barrier<S, R> {
    /// Create an empty barrier with no participants.
    pub fn new(config: BarrierConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    registry: IndexMap::new(),
                    inbox: BTreeMap::new(),
                    roster: None,
                    phase: CyclePhase::Collecting,
                    cycle: CycleId(0),
                    closed: false,
                }),
                submitted: Condvar::new(),
                next_id: AtomicU64::new(0),
                config,
            }),
        }
    }

    /// Register a new participant and return its mailbox.
    ///
    /// Identities start at 0 and increase by one per call. Safe to call
    /// while a cycle is in flight; the participant joins the next cycle.
    pub fn register(&self) -> Result<Mailbox<S, R>, BarrierError> {
        self.shared.register()
    }

    /// A cloneable handle that registers participants from other threads.
    pub fn registrar(&self) -> Registrar<S, R> {
        Registrar {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Remove a participant. Returns `false` if it was not registered.
    ///
    /// Its pending submission, if any, is discarded. Equivalent to
    /// dropping the participant's [`Mailbox`].
    pub fn deregister(&self, id: ParticipantId) -> bool {
        self.shared.deregister(id)
    }

    /// Block until every participant of the cycle has submitted, using
    /// the configured [`BarrierConfig::cycle_timeout`].
    ///
    /// Returns the payloads sorted by ascending [`ParticipantId`].
    ///
    /// # Errors
    ///
    /// - [`BarrierError::DispatchPending`] if the previous batch was not
    ///   dispatched yet.
    /// - [`BarrierError::BarrierTimeout`] if the deadline expires first;
    ///   the submissions received so far stay in the inbox and the call
    ///   may be retried.
    /// - [`BarrierError::Closed`] if the barrier is closed while waiting.
    pub fn await_cycle(&mut self) -> Result<Vec<S>, BarrierError> {
        let deadline = self
            .shared
            .config
            .cycle_timeout
            .map(|t| Instant::now() + t);
        self.collect(deadline)
    }

    /// [`await_cycle`](Self::await_cycle) with an explicit deadline.
    pub fn await_cycle_deadline(&mut self, deadline: Instant) -> Result<Vec<S>, BarrierError> {
        self.collect(Some(deadline))
    }

    /// [`await_cycle`](Self::await_cycle) with an explicit timeout.
    pub fn await_cycle_timeout(&mut self, timeout: Duration) -> Result<Vec<S>, BarrierError> {
        self.collect(Some(Instant::now() + timeout))
    }

    fn collect(&mut self, deadline: Option<Instant>) -> Result<Vec<S>, BarrierError> {
        let start = Instant::now();
        let shared = &*self.shared;
        let mut state = shared.lock();

        if state.closed {
            return Err(BarrierError::Closed);
        }
        if state.phase == CyclePhase::Dispatching {
            return Err(BarrierError::DispatchPending);
        }
        if state.roster.is_none() {
            let mut roster: Vec<ParticipantId> = state.registry.keys().copied().collect();
            roster.sort_unstable();
            state.roster = Some(roster);
        }

        loop {
            if state.closed {
                return Err(BarrierError::Closed);
            }
            if state.missing().is_empty() {
                break;
            }
            state = match deadline {
                None => shared
                    .submitted
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        let missing = state.missing();
                        // Unfreeze so late registrations join the retry.
                        state.roster = None;
                        drop(state);
                        tracing::warn!(
                            missing = missing.len(),
                            waited_ms = start.elapsed().as_millis() as u64,
                            "cycle timed out waiting for submissions"
                        );
                        return Err(BarrierError::BarrierTimeout {
                            waited: start.elapsed(),
                            missing,
                        });
                    }
                    shared
                        .submitted
                        .wait_timeout(state, deadline - now)
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|e| e.into_inner().0)
                }
            };
        }

        // Roster is sorted and every id has an inbox entry.
        let roster = state.roster.take().unwrap_or_default();
        let mut batch = Vec::with_capacity(roster.len());
        for id in &roster {
            if let Some(payload) = state.inbox.remove(id) {
                batch.push(payload);
            }
        }
        debug_assert_eq!(batch.len(), roster.len());
        let cycle = state.cycle;
        state.roster = Some(roster);
        state.phase = CyclePhase::Dispatching;
        drop(state);

        tracing::debug!(
            cycle = %cycle,
            participants = batch.len(),
            wait_us = start.elapsed().as_micros() as u64,
            "cycle released"
        );
        Ok(batch)
    }

    /// Deliver `results[i]` to the participant with the `i`-th smallest
    /// identity of the released cycle, and reopen collection.
    ///
    /// Returns the id of the completed cycle.
    ///
    /// # Errors
    ///
    /// Fails without delivering anything if no batch is awaiting
    /// dispatch, if `results` is not exactly one item per roster
    /// participant, or if an outbox still holds an unconsumed result.
    pub fn dispatch(&mut self, results: Vec<R>) -> Result<CycleId, BarrierError> {
        let mut state = self.shared.lock();
        if state.closed {
            return Err(BarrierError::Closed);
        }
        if state.phase != CyclePhase::Dispatching {
            return Err(BarrierError::NoCycleInFlight);
        }
        let roster = state.roster.take().unwrap_or_default();
        if results.len() != roster.len() {
            let err = BarrierError::MismatchedBatchSize {
                expected: roster.len(),
                got: results.len(),
            };
            state.roster = Some(roster);
            return Err(err);
        }
        if let Some(busy) = roster.iter().find(|id| {
            state
                .registry
                .get(*id)
                .is_some_and(|outbox| outbox.is_full())
        }) {
            let err = BarrierError::OutboxOccupied { participant: *busy };
            state.roster = Some(roster);
            return Err(err);
        }

        for (id, result) in roster.iter().zip(results) {
            match state.registry.get(id) {
                Some(outbox) => match outbox.try_send(result) {
                    Ok(()) => {}
                    Err(TrySendError::Disconnected(_)) | Err(TrySendError::Full(_)) => {
                        tracing::warn!(participant = %id, "result dropped: outbox unavailable");
                    }
                },
                None => {
                    tracing::warn!(participant = %id, "result dropped: participant left mid-cycle");
                }
            }
        }

        let completed = state.cycle;
        state.cycle = CycleId(completed.0 + 1);
        state.phase = CyclePhase::Collecting;
        drop(state);
        tracing::debug!(cycle = %completed, participants = roster.len(), "cycle dispatched");
        Ok(completed)
    }

    /// Close the barrier. Every blocked participant and any later call
    /// fails with [`BarrierError::Closed`]. Idempotent.
    pub fn close(&self) {
        self.shared.close();
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Number of currently registered participants.
    pub fn participant_count(&self) -> usize {
        self.shared.lock().registry.len()
    }

    /// Currently registered identities in ascending order.
    pub fn participants(&self) -> Vec<ParticipantId> {
        self.shared.lock().registry.keys().copied().collect()
    }

    /// Roster of the released cycle, while a dispatch is owed.
    pub fn pending_roster(&self) -> Option<Vec<ParticipantId>> {
        let state = self.shared.lock();
        match state.phase {
            CyclePhase::Dispatching => state.roster.clone(),
            CyclePhase::Collecting => None,
        }
    }

    /// Number of submissions waiting in the inbox.
    pub fn pending_submissions(&self) -> usize {
        self.shared.lock().inbox.len()
    }

    /// Id of the cycle currently being collected or dispatched.
    pub fn cycle(&self) -> CycleId {
        self.shared.lock().cycle
    }

    /// Current phase of the cycle state machine.
    pub fn phase(&self) -> CyclePhase {
        self.shared.lock().phase
    }

    /// The barrier's default deadlines.
    pub fn config(&self) -> &BarrierConfig {
        &self.shared.config
    }
}

impl<S, R> Drop for Barrier<S, R> {
    fn drop(&mut self) {
        self.shared.close();
    }
}

impl<S, R> std::fmt::Debug for Barrier<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("Barrier")
            .field("participants", &state.registry.len())
            .field("pending", &state.inbox.len())
            .field("phase", &state.phase)
            .field("cycle", &state.cycle)
            .field("closed", &state.closed)
            .finish()
    }
}

// ── Registrar ────────────────────────────────────────────────────

/// Cloneable, thread-safe handle for registering participants.
///
/// Holds no consumer rights: it cannot collect or dispatch.
pub struct Registrar<S, R> {
    shared: Arc<Shared<S, R>>,
}

impl<S, R> Registrar<S, R> {
    /// Register a new participant. See [`Barrier::register`].
    pub fn register(&self) -> Result<Mailbox<S, R>, BarrierError> {
        self.shared.register()
    }

    /// Close the barrier from outside the consumer thread. See
    /// [`Barrier::close`].
    pub fn close(&self) {
        self.shared.close();
    }

    /// Whether the barrier was closed.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

impl<S, R> Clone for Registrar<S, R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn barrier() -> Barrier<i32, i32> {
        Barrier::new(BarrierConfig::with_timeout(Duration::from_secs(5)))
    }

    #[test]
    fn identities_start_at_zero_and_increase() {
        let b = barrier();
        let ids: Vec<_> = (0..4).map(|_| b.register().unwrap().id()).collect();
        assert_eq!(
            ids,
            vec![
                ParticipantId(0),
                ParticipantId(1),
                ParticipantId(2),
                ParticipantId(3)
            ]
        );
    }

    #[test]
    fn identities_are_not_reused_after_deregister() {
        let b = barrier();
        let m0 = b.register().unwrap();
        drop(m0);
        assert_eq!(b.participant_count(), 0);
        assert_eq!(b.register().unwrap().id(), ParticipantId(1));
    }

    #[test]
    fn batch_is_sorted_by_identity_not_arrival() {
        let mut b = barrier();
        let mut ms: Vec<_> = (0..3).map(|_| b.register().unwrap()).collect();
        ms[2].submit(30).unwrap();
        ms[0].submit(10).unwrap();
        ms[1].submit(20).unwrap();
        assert_eq!(b.await_cycle().unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn empty_barrier_releases_immediately() {
        let mut b = barrier();
        assert!(b.await_cycle().unwrap().is_empty());
        assert_eq!(b.dispatch(vec![]).unwrap(), CycleId(0));
        assert_eq!(b.cycle(), CycleId(1));
    }

    #[test]
    fn mismatched_dispatch_delivers_nothing_and_keeps_cycle_open() {
        let mut b = barrier();
        let mut m0 = b.register().unwrap();
        let mut m1 = b.register().unwrap();
        m0.submit(1).unwrap();
        m1.submit(2).unwrap();
        b.await_cycle().unwrap();

        assert_eq!(
            b.dispatch(vec![7]),
            Err(BarrierError::MismatchedBatchSize {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(b.phase(), CyclePhase::Dispatching);
        assert!(matches!(
            m0.receive_timeout(Duration::from_millis(10)),
            Err(BarrierError::BarrierTimeout { .. })
        ));

        b.dispatch(vec![7, 8]).unwrap();
        assert_eq!(m0.receive().unwrap(), 7);
        assert_eq!(m1.receive().unwrap(), 8);
    }

    #[test]
    fn await_before_dispatch_is_rejected() {
        let mut b = barrier();
        let mut m = b.register().unwrap();
        m.submit(1).unwrap();
        b.await_cycle().unwrap();
        assert_eq!(b.await_cycle(), Err(BarrierError::DispatchPending));
    }

    #[test]
    fn dispatch_without_cycle_is_rejected() {
        let mut b = barrier();
        let _m = b.register().unwrap();
        assert_eq!(b.dispatch(vec![1]), Err(BarrierError::NoCycleInFlight));
    }

    #[test]
    fn barrier_level_double_submission_is_detected() {
        let b = barrier();
        let m = b.register().unwrap();
        b.shared.submit(m.id(), 1).unwrap();
        assert_eq!(
            b.shared.submit(m.id(), 2),
            Err(BarrierError::DoubleSubmission {
                participant: m.id()
            })
        );
    }

    #[test]
    fn unknown_participant_cannot_submit() {
        let b = barrier();
        assert_eq!(
            b.shared.submit(ParticipantId(9), 1),
            Err(BarrierError::UnknownParticipant {
                participant: ParticipantId(9)
            })
        );
    }

    #[test]
    fn timeout_reports_missing_participants() {
        let mut b = barrier();
        let mut m0 = b.register().unwrap();
        let _m1 = b.register().unwrap();
        m0.submit(1).unwrap();

        match b.await_cycle_timeout(Duration::from_millis(20)) {
            Err(BarrierError::BarrierTimeout { missing, .. }) => {
                assert_eq!(missing, vec![ParticipantId(1)]);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        // The early submission survives the timeout.
        assert_eq!(b.pending_submissions(), 1);
        assert_eq!(b.phase(), CyclePhase::Collecting);
    }

    #[test]
    fn deregistering_a_straggler_completes_the_cycle() {
        let mut b = barrier();
        let mut m0 = b.register().unwrap();
        let m1 = b.register().unwrap();
        m0.submit(5).unwrap();

        let straggler = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            drop(m1);
        });
        assert_eq!(b.await_cycle().unwrap(), vec![5]);
        straggler.join().unwrap();
        b.dispatch(vec![6]).unwrap();
        assert_eq!(m0.receive().unwrap(), 6);
    }

    #[test]
    fn late_registration_joins_next_cycle() {
        let mut b = barrier();
        let mut m0 = b.register().unwrap();
        let registrar = b.registrar();

        // Freeze the roster with only m0, then let a newcomer submit early.
        assert!(matches!(
            b.await_cycle_timeout(Duration::from_millis(5)),
            Err(BarrierError::BarrierTimeout { .. })
        ));
        let handle = thread::spawn(move || {
            let mut late = registrar.register().unwrap();
            late.submit(99).unwrap();
            late
        });
        let mut late = handle.join().unwrap();
        m0.submit(1).unwrap();

        // Both are registered before this await starts, so both count.
        assert_eq!(b.await_cycle().unwrap(), vec![1, 99]);
        b.dispatch(vec![10, 20]).unwrap();
        assert_eq!(late.receive().unwrap(), 20);
        assert_eq!(m0.receive().unwrap(), 10);
    }

    #[test]
    fn newcomer_does_not_satisfy_a_frozen_roster() {
        let mut b = barrier();
        let mut m0 = b.register().unwrap();
        let _m1 = b.register().unwrap();
        let registrar = b.registrar();

        let waiter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            // Registered after the consumer froze the roster {0, 1}.
            let mut late = registrar.register().unwrap();
            late.submit(99).unwrap();
            m0.submit(1).unwrap();
            (m0, late)
        });
        let result = b.await_cycle_timeout(Duration::from_millis(200));
        let (_m0, _late) = waiter.join().unwrap();
        match result {
            Err(BarrierError::BarrierTimeout { missing, .. }) => {
                assert_eq!(missing, vec![ParticipantId(1)]);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn close_unblocks_consumer_and_participants() {
        let mut b = barrier();
        let mut m0 = b.register().unwrap();
        let _m1 = b.register().unwrap();
        m0.submit(1).unwrap();

        let mut waiting = b.register().unwrap();
        let participant = thread::spawn(move || waiting.receive());
        thread::sleep(Duration::from_millis(20));
        b.close();
        assert_eq!(participant.join().unwrap(), Err(BarrierError::Closed));
        assert_eq!(b.await_cycle(), Err(BarrierError::Closed));
        assert_eq!(m0.receive(), Err(BarrierError::Closed));
        assert!(b.register().is_err());
    }
}
