//! [`SimulationHost`]: the world-owning side of the lockstep loop.
//!
//! # Cycle
//!
//! Every call to [`advance_or_reset`](SimulationHost::advance_or_reset):
//!
//! 1. forwards queued render requests to the [`RenderSink`]
//! 2. waits on the barrier for every registered controller
//! 3. classifies the identity-ordered batch: all step, all reset, or mixed
//! 4. applies it to the world (or refuses it)
//! 5. dispatches one [`Response`] per controller, in identity order
//!
//! The world is mutated only here, on the host's thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use tandem_core::{vector, ParticipantId};
use tandem_physics::{noise, Action, PhysicsEngine, World};
use tandem_sync::Barrier;

use crate::config::EnvConfig;
use crate::controller::{ControllerFactory, ControllerHandle};
use crate::error::HostError;
use crate::metrics::{CycleKind, CycleMetrics, CycleReport};
use crate::request::{AgentInfo, Info, Observation, RejectReason, Request, Response, StepOutcome};
use crate::scenario::{RenderSink, Scenario};

// Compile-time assertion: the host can be moved onto its own thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check<Sc: Scenario>() {
        assert_send::<SimulationHost<Sc>>();
    }
};

/// What the collected batch asks for.
enum Batch {
    Step(Vec<Action>),
    Reset,
    Mixed,
    Empty,
}

impl Batch {
    fn classify(requests: Vec<Request>) -> Self {
        if requests.is_empty() {
            return Batch::Empty;
        }
        if requests.iter().all(|r| matches!(r, Request::Reset)) {
            return Batch::Reset;
        }
        let mut actions = Vec::with_capacity(requests.len());
        for request in requests {
            match request {
                Request::Step(action) => actions.push(action),
                Request::Reset | Request::Render => return Batch::Mixed,
            }
        }
        Batch::Step(actions)
    }
}

/// Owns the world and answers controller requests one cycle at a time.
pub struct SimulationHost<Sc: Scenario> {
    scenario: Sc,
    world: World,
    engine: PhysicsEngine,
    barrier: Barrier<Request, Response>,
    render_tx: Sender<ParticipantId>,
    render_rx: Receiver<ParticipantId>,
    render_sink: Option<Box<dyn RenderSink>>,
    config: EnvConfig,
    episode: u64,
    last_metrics: CycleMetrics,
}

impl<Sc: Scenario> SimulationHost<Sc> {
    /// Build the scenario's world and an empty barrier.
    ///
    /// The world is not reset here; controllers normally start with a
    /// reset cycle.
    pub fn new(scenario: Sc, config: EnvConfig) -> Result<Self, HostError> {
        config.validate()?;
        let world = scenario.make_world()?;
        let (render_tx, render_rx) = crossbeam_channel::unbounded();
        tracing::info!(
            scenario = scenario.name(),
            seed = config.seed,
            agents = world.agents.len(),
            policy_agents = world.policy_agents().count(),
            landmarks = world.landmarks.len(),
            "simulation host created"
        );
        Ok(Self {
            engine: PhysicsEngine::new(config.seed),
            barrier: Barrier::new(config.barrier.clone()),
            scenario,
            world,
            render_tx,
            render_rx,
            render_sink: None,
            config,
            episode: 0,
            last_metrics: CycleMetrics::default(),
        })
    }

    /// Forward render requests to `sink`.
    pub fn with_render_sink(mut self, sink: impl RenderSink) -> Self {
        self.render_sink = Some(Box::new(sink));
        self
    }

    /// Register a controller. It joins the next cycle.
    pub fn spawn_controller(&self) -> Result<ControllerHandle, HostError> {
        let mailbox = self.barrier.register()?;
        Ok(ControllerHandle::new(mailbox, self.render_tx.clone()))
    }

    /// A cloneable factory for registering controllers from other threads.
    pub fn controller_factory(&self) -> ControllerFactory {
        ControllerFactory::new(self.barrier.registrar(), self.render_tx.clone())
    }

    /// Run one cycle, waiting at most the configured cycle timeout.
    ///
    /// # Errors
    ///
    /// [`HostError::Barrier`] if the cycle times out or the barrier is
    /// closed; both leave the world untouched. [`HostError::MismatchedBatchSize`],
    /// [`HostError::ActionDimension`] and [`HostError::NonFiniteAction`]
    /// after every participant has been sent the matching [`RejectReason`];
    /// the world is untouched then as well.
    pub fn advance_or_reset(&mut self) -> Result<CycleReport, HostError> {
        let deadline = self.config.barrier.cycle_timeout.map(|t| Instant::now() + t);
        self.run_cycle(deadline)
    }

    /// [`advance_or_reset`](Self::advance_or_reset) with an explicit timeout.
    pub fn advance_or_reset_timeout(&mut self, timeout: Duration) -> Result<CycleReport, HostError> {
        self.run_cycle(Some(Instant::now() + timeout))
    }

    fn run_cycle(&mut self, deadline: Option<Instant>) -> Result<CycleReport, HostError> {
        let start = Instant::now();
        let mut metrics = CycleMetrics {
            renders: self.drain_renders(),
            ..Default::default()
        };

        let wait_start = Instant::now();
        let requests = match deadline {
            Some(deadline) => self.barrier.await_cycle_deadline(deadline)?,
            None => self.barrier.await_cycle()?,
        };
        metrics.wait_us = wait_start.elapsed().as_micros() as u64;
        metrics.participants = requests.len();
        let cycle = self.barrier.cycle();

        let expected = self.world.policy_agents().count();
        let (kind, responses, failure) = match Batch::classify(requests) {
            Batch::Empty => (CycleKind::Idle, Vec::new(), None),
            Batch::Mixed => {
                let reason = RejectReason::MixedCycle;
                tracing::warn!(cycle = %cycle, "rejected cycle mixing step and reset");
                let responses = vec![Response::Rejected(reason.clone()); metrics.participants];
                (CycleKind::Rejected(reason), responses, None)
            }
            _ if metrics.participants != expected => {
                let got = metrics.participants;
                tracing::warn!(cycle = %cycle, expected, got, "participant count does not match policy agents");
                let reason = RejectReason::MismatchedBatchSize { expected, got };
                (
                    CycleKind::Rejected(reason.clone()),
                    vec![Response::Rejected(reason); got],
                    Some(HostError::MismatchedBatchSize { expected, got }),
                )
            }
            Batch::Reset => (CycleKind::Reset, self.reset(), None),
            Batch::Step(actions) => match self.check_actions(&actions) {
                Err(reason) => {
                    tracing::warn!(cycle = %cycle, %reason, "rejected step");
                    let failure = HostError::from_rejected_step(&reason);
                    let responses = vec![Response::Rejected(reason.clone()); actions.len()];
                    (CycleKind::Rejected(reason), responses, failure)
                }
                Ok(()) => {
                    let responses = self.step(actions, &mut metrics);
                    (CycleKind::Step, responses, None)
                }
            },
        };

        let dispatch_start = Instant::now();
        let cycle = self.barrier.dispatch(responses)?;
        metrics.dispatch_us = dispatch_start.elapsed().as_micros() as u64;
        metrics.tick = self.world.tick();
        metrics.total_us = start.elapsed().as_micros() as u64;
        self.last_metrics = metrics.clone();

        if let Some(err) = failure {
            return Err(err);
        }
        Ok(CycleReport {
            cycle,
            kind,
            metrics,
        })
    }

    fn drain_renders(&mut self) -> usize {
        let mut count = 0;
        while let Ok(requested_by) = self.render_rx.try_recv() {
            count += 1;
            match self.render_sink.as_mut() {
                Some(sink) => sink.render(&self.world, requested_by),
                None => tracing::trace!(participant = %requested_by, "render requested without a sink"),
            }
        }
        count
    }

    fn check_actions(&self, actions: &[Action]) -> Result<(), RejectReason> {
        let params = self.world.params();
        let policy = self.world.policy_agents();
        for (agent, (action, index)) in actions.iter().zip(policy).enumerate() {
            if action.u.len() != params.dim_p {
                return Err(RejectReason::ActionDimension {
                    agent,
                    what: "u",
                    expected: params.dim_p,
                    got: action.u.len(),
                });
            }
            if action.c.len() != params.dim_c {
                return Err(RejectReason::ActionDimension {
                    agent,
                    what: "c",
                    expected: params.dim_c,
                    got: action.c.len(),
                });
            }
            let sensitivity = self.sensitivity(index);
            if !action.u.iter().all(|x| (x * sensitivity).is_finite()) {
                return Err(RejectReason::NonFiniteAction { agent, what: "u" });
            }
            if !action.c.iter().all(|x| x.is_finite()) {
                return Err(RejectReason::NonFiniteAction { agent, what: "c" });
            }
        }
        Ok(())
    }

    /// Scale applied to the motor action of agent `index`.
    fn sensitivity(&self, index: usize) -> f64 {
        self.world.agents[index]
            .body
            .accel
            .unwrap_or(self.config.action_sensitivity)
    }

    fn reset(&mut self) -> Vec<Response> {
        let mut rng = noise::episode_rng(self.config.seed, self.episode);
        self.scenario.reset_world(&mut self.world, &mut rng);
        if self.config.reset_tick_counter {
            self.world.reset_tick();
        }
        self.engine.clear();
        self.engine.set_episode(self.episode);
        self.episode += 1;
        tracing::info!(episode = self.episode, tick = %self.world.tick(), "episode reset");
        self.observations()
            .into_iter()
            .map(Response::Reset)
            .collect()
    }

    fn step(&mut self, actions: Vec<Action>, metrics: &mut CycleMetrics) -> Vec<Response> {
        let policy: Vec<usize> = self.world.policy_agents().collect();
        for (&index, mut action) in policy.iter().zip(actions) {
            vector::scale(&mut action.u, self.sensitivity(index));
            self.world.agents[index].action = action;
        }

        let physics_start = Instant::now();
        self.engine.step(&mut self.world);
        metrics.physics_us = physics_start.elapsed().as_micros() as u64;

        let scenario_start = Instant::now();
        self.scenario.post_step(&mut self.world);
        let observations = self.observations();
        let mut rewards: Vec<f64> = policy
            .iter()
            .map(|&i| self.scenario.reward(i, &self.world))
            .collect();
        if self.config.shared_reward {
            let total: f64 = rewards.iter().sum();
            rewards.iter_mut().for_each(|r| *r = total);
        }
        let infos: Vec<Info> = policy
            .iter()
            .map(|&i| self.scenario.info(i, &self.world))
            .collect();
        let infos: Vec<AgentInfo> = if self.config.broadcast_info {
            let all: Arc<[Info]> = infos.into();
            policy.iter().map(|_| AgentInfo::All(Arc::clone(&all))).collect()
        } else {
            infos.into_iter().map(AgentInfo::Own).collect()
        };

        let responses = policy
            .iter()
            .zip(observations)
            .zip(rewards)
            .zip(infos)
            .map(|(((&i, observation), reward), info)| {
                Response::Step(StepOutcome {
                    observation,
                    reward,
                    done: self.scenario.done(i, &self.world),
                    info,
                })
            })
            .collect();
        metrics.scenario_us = scenario_start.elapsed().as_micros() as u64;
        tracing::debug!(tick = %self.world.tick(), agents = policy.len(), "world advanced");
        responses
    }

    fn observations(&self) -> Vec<Observation> {
        self.world
            .policy_agents()
            .map(|i| self.scenario.observation(i, &self.world))
            .collect()
    }

    // ── Accessors ───────────────────────────────────────────────

    /// The simulated world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for setup between cycles.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The scenario.
    pub fn scenario(&self) -> &Sc {
        &self.scenario
    }

    /// The physics engine, including forces from the last tick.
    pub fn engine(&self) -> &PhysicsEngine {
        &self.engine
    }

    /// The environment configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Number of completed resets.
    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Metrics of the most recent completed cycle.
    pub fn last_metrics(&self) -> &CycleMetrics {
        &self.last_metrics
    }

    /// Currently registered controllers.
    pub fn participant_count(&self) -> usize {
        self.barrier.participant_count()
    }

    /// Close the barrier, unblocking every controller with
    /// [`BarrierError::Closed`](tandem_core::BarrierError::Closed).
    pub fn close(&self) {
        self.barrier.close();
    }

    pub(crate) fn closer(&self) -> tandem_sync::Registrar<Request, Response> {
        self.barrier.registrar()
    }
}

impl<Sc: Scenario> std::fmt::Debug for SimulationHost<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationHost")
            .field("scenario", &self.scenario.name())
            .field("tick", &self.world.tick())
            .field("episode", &self.episode)
            .field("barrier", &self.barrier)
            .finish()
    }
}
