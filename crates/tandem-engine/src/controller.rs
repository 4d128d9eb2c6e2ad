//! The controller side: [`ControllerHandle`] and [`ControllerFactory`].

use crossbeam_channel::Sender;
use tandem_core::{BarrierError, ParticipantId};
use tandem_physics::Action;
use tandem_sync::{Mailbox, Registrar};

use crate::error::ControllerError;
use crate::request::{Observation, Request, Response, StepOutcome};

/// One agent controller's connection to a [`SimulationHost`](crate::SimulationHost).
///
/// The participant with the `k`-th smallest identity drives the `k`-th
/// policy agent. Dropping the handle deregisters the participant.
#[derive(Debug)]
pub struct ControllerHandle {
    mailbox: Mailbox<Request, Response>,
    render: Sender<ParticipantId>,
}

impl ControllerHandle {
    pub(crate) fn new(mailbox: Mailbox<Request, Response>, render: Sender<ParticipantId>) -> Self {
        Self { mailbox, render }
    }

    /// This controller's identity.
    pub fn id(&self) -> ParticipantId {
        self.mailbox.id()
    }

    /// Submit `request` and block until the host answers.
    ///
    /// [`Request::Render`] is queued for the host and returns `Ok(None)`
    /// immediately; it does not take part in the barrier.
    ///
    /// # Errors
    ///
    /// [`ControllerError::Rejected`] if the host refused the cycle, or
    /// [`ControllerError::Barrier`] on timeout, close, or a second
    /// submission while one is outstanding.
    pub fn submit_and_await(&mut self, request: Request) -> Result<Option<Response>, ControllerError> {
        if let Request::Render = request {
            self.render
                .send(self.mailbox.id())
                .map_err(|_| BarrierError::Closed)?;
            return Ok(None);
        }
        match self.mailbox.exchange(request)? {
            Response::Rejected(reason) => {
                tracing::debug!(participant = %self.id(), %reason, "request rejected");
                Err(ControllerError::Rejected(reason))
            }
            response => Ok(Some(response)),
        }
    }

    /// Apply `action` and wait for the tick's outcome.
    ///
    /// The motor force is `action.u` times the agent's `accel`, or
    /// [`EnvConfig::action_sensitivity`](crate::EnvConfig::action_sensitivity)
    /// (5.0 by default) when the agent has none. `action.c` is broadcast
    /// as given.
    pub fn step(&mut self, action: Action) -> Result<StepOutcome, ControllerError> {
        match self.submit_and_await(Request::Step(action))? {
            Some(Response::Step(outcome)) => Ok(outcome),
            _ => Err(ControllerError::UnexpectedResponse { expected: "step" }),
        }
    }

    /// Request a new episode and wait for its first observation.
    pub fn reset(&mut self) -> Result<Observation, ControllerError> {
        match self.submit_and_await(Request::Reset)? {
            Some(Response::Reset(observation)) => Ok(observation),
            _ => Err(ControllerError::UnexpectedResponse { expected: "reset" }),
        }
    }

    /// Queue a render request. Never blocks.
    pub fn render(&mut self) -> Result<(), ControllerError> {
        self.submit_and_await(Request::Render).map(|_| ())
    }
}

/// Cloneable handle that creates [`ControllerHandle`]s from any thread.
#[derive(Clone)]
pub struct ControllerFactory {
    registrar: Registrar<Request, Response>,
    render: Sender<ParticipantId>,
}

impl ControllerFactory {
    pub(crate) fn new(registrar: Registrar<Request, Response>, render: Sender<ParticipantId>) -> Self {
        Self { registrar, render }
    }

    /// Register a new controller. It joins the next barrier cycle.
    pub fn spawn(&self) -> Result<ControllerHandle, ControllerError> {
        let mailbox = self.registrar.register()?;
        Ok(ControllerHandle::new(mailbox, self.render.clone()))
    }
}

impl std::fmt::Debug for ControllerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerFactory")
            .field("closed", &self.registrar.is_closed())
            .finish()
    }
}
