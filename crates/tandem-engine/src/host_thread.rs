//! [`HostThread`]: runs [`SimulationHost::advance_or_reset`] on a
//! dedicated thread until shutdown.
//!
//! The thread owns the host exclusively (moved in via `thread::spawn`)
//! and hands it back from [`shutdown`](HostThread::shutdown) so the
//! caller can inspect the final world.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tandem_core::BarrierError;
use tandem_sync::Registrar;

use crate::controller::ControllerFactory;
use crate::error::HostError;
use crate::host::SimulationHost;
use crate::metrics::CycleKind;
use crate::request::{Request, Response};
use crate::scenario::Scenario;

/// Pause between cycles while no controller is registered.
const IDLE_BACKOFF: Duration = Duration::from_millis(1);

/// State held by the host thread's main loop.
struct HostLoop<Sc: Scenario> {
    host: SimulationHost<Sc>,
    shutdown_flag: Arc<AtomicBool>,
}

impl<Sc: Scenario> HostLoop<Sc> {
    /// Runs until `shutdown_flag` is set or the barrier is closed.
    fn run(mut self) -> SimulationHost<Sc> {
        tracing::info!(scenario = self.host.scenario().name(), "host thread started");
        let mut cycles = 0u64;
        loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                break;
            }
            match self.host.advance_or_reset() {
                Ok(report) => {
                    if report.kind == CycleKind::Idle {
                        thread::sleep(IDLE_BACKOFF);
                    } else {
                        cycles += 1;
                    }
                }
                Err(HostError::Barrier(BarrierError::Closed)) => break,
                Err(HostError::Barrier(BarrierError::BarrierTimeout { missing, .. })) => {
                    tracing::warn!(missing = missing.len(), "host cycle timed out; retrying");
                }
                // Already reported to every controller of the cycle.
                Err(err) => tracing::warn!(error = %err, "host cycle failed"),
            }
        }
        tracing::info!(cycles, tick = %self.host.world().tick(), "host thread stopped");
        self.host
    }
}

/// A [`SimulationHost`] running on its own thread.
///
/// Dropping a running `HostThread` shuts it down and discards the host.
pub struct HostThread<Sc: Scenario> {
    handle: Option<JoinHandle<SimulationHost<Sc>>>,
    shutdown_flag: Arc<AtomicBool>,
    barrier: Registrar<Request, Response>,
    factory: ControllerFactory,
}

impl<Sc: Scenario> HostThread<Sc> {
    /// Move `host` onto a new thread and start cycling.
    pub fn spawn(host: SimulationHost<Sc>) -> std::io::Result<Self> {
        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let barrier = host.closer();
        let factory = host.controller_factory();
        let state = HostLoop {
            host,
            shutdown_flag: Arc::clone(&shutdown_flag),
        };
        let handle = thread::Builder::new()
            .name("tandem-host".into())
            .spawn(move || state.run())?;
        Ok(Self {
            handle: Some(handle),
            shutdown_flag,
            barrier,
            factory,
        })
    }

    /// Factory for registering controllers with the running host.
    ///
    /// Controllers registered here race the host loop: a cycle whose
    /// roster froze before all of them registered releases with only
    /// some, and those receive
    /// [`RejectReason::MismatchedBatchSize`](crate::RejectReason::MismatchedBatchSize).
    /// Register a fixed team with [`SimulationHost::spawn_controller`]
    /// before [`spawn`](Self::spawn); use this factory for controllers
    /// that retry a rejected reset.
    pub fn controllers(&self) -> &ControllerFactory {
        &self.factory
    }

    /// Whether the host thread is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the loop, close the barrier and return the host.
    ///
    /// Controllers blocked in the barrier fail with
    /// [`BarrierError::Closed`]. Returns `None` if the host thread
    /// panicked or was already shut down.
    pub fn shutdown(&mut self) -> Option<SimulationHost<Sc>> {
        self.shutdown_flag.store(true, Ordering::Release);
        self.barrier.close();
        self.handle.take()?.join().ok()
    }
}

impl<Sc: Scenario> Drop for HostThread<Sc> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.shutdown();
        }
    }
}

impl<Sc: Scenario> std::fmt::Debug for HostThread<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostThread")
            .field("running", &self.is_running())
            .finish()
    }
}
