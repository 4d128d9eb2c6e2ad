//! The participant side of the rendezvous: [`Mailbox`].
//!
//! Each mailbox owns the receiving end of a bounded(1) crossbeam channel
//! (its outbox) and a reference to the shared inbox. Blocking is done by
//! the channel itself, never by polling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tandem_core::{BarrierError, ParticipantId};

use crate::barrier::Shared;

/// A participant's handle into a [`Barrier`](crate::Barrier).
///
/// Enforces producer discipline at the call site: after
/// [`submit`](Self::submit), a second `submit` fails with
/// [`BarrierError::DoubleSubmission`] until [`receive`](Self::receive)
/// has returned the cycle's result.
///
/// Dropping the mailbox deregisters the participant.
pub struct Mailbox<S, R> {
    id: ParticipantId,
    shared: Arc<Shared<S, R>>,
    outbox: Receiver<R>,
    outstanding: bool,
}

impl<S, R> Mailbox<S, R> {
    pub(crate) fn new(id: ParticipantId, shared: Arc<Shared<S, R>>, outbox: Receiver<R>) -> Self {
        Self {
            id,
            shared,
            outbox,
            outstanding: false,
        }
    }

    /// This participant's identity.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Whether a submission is still waiting for its result.
    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    /// Deposit this cycle's payload. Never blocks on the consumer.
    pub fn submit(&mut self, payload: S) -> Result<(), BarrierError> {
        if self.outstanding {
            return Err(BarrierError::DoubleSubmission {
                participant: self.id,
            });
        }
        self.shared.submit(self.id, payload)?;
        self.outstanding = true;
        Ok(())
    }

    /// Block until this participant's result arrives, using the barrier's
    /// configured [`receive_timeout`](crate::BarrierConfig::receive_timeout).
    pub fn receive(&mut self) -> Result<R, BarrierError> {
        let deadline = self
            .shared
            .config
            .receive_timeout
            .map(|t| Instant::now() + t);
        self.receive_until(deadline)
    }

    /// [`receive`](Self::receive) with an explicit deadline.
    pub fn receive_deadline(&mut self, deadline: Instant) -> Result<R, BarrierError> {
        self.receive_until(Some(deadline))
    }

    /// [`receive`](Self::receive) with an explicit timeout.
    pub fn receive_timeout(&mut self, timeout: Duration) -> Result<R, BarrierError> {
        self.receive_until(Some(Instant::now() + timeout))
    }

    /// Submit and then block for the result.
    pub fn exchange(&mut self, payload: S) -> Result<R, BarrierError> {
        self.submit(payload)?;
        self.receive()
    }

    fn receive_until(&mut self, deadline: Option<Instant>) -> Result<R, BarrierError> {
        let start = Instant::now();
        let received = match deadline {
            None => self.outbox.recv().map_err(|_| RecvTimeoutError::Disconnected),
            Some(deadline) => self.outbox.recv_deadline(deadline),
        };
        match received {
            Ok(result) => {
                self.outstanding = false;
                Ok(result)
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    participant = %self.id,
                    waited_ms = start.elapsed().as_millis() as u64,
                    "timed out waiting for result"
                );
                Err(BarrierError::BarrierTimeout {
                    waited: start.elapsed(),
                    missing: vec![self.id],
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                if self.shared.is_closed() {
                    Err(BarrierError::Closed)
                } else {
                    Err(BarrierError::UnknownParticipant {
                        participant: self.id,
                    })
                }
            }
        }
    }
}

impl<S, R> Drop for Mailbox<S, R> {
    fn drop(&mut self) {
        self.shared.deregister(self.id);
    }
}

impl<S, R> std::fmt::Debug for Mailbox<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("id", &self.id)
            .field("outstanding", &self.outstanding)
            .finish()
    }
}
