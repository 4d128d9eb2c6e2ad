//! Lockstep demo: three controller threads drive the Spread scenario
//! through a host thread.
//!
//! Demonstrates: build scenario → host → register controllers → spawn
//! host thread → reset → step → render → shutdown.
//!
//! Set `RUST_LOG=tandem_engine=debug` to watch the cycles.

use std::thread;
use std::time::Duration;

use tandem_bench::reference_spread;
use tandem_engine::{AgentInfo, ControllerHandle, EnvConfig, HostThread, SimulationHost};
use tandem_physics::{Action, World};
use tandem_sync::{BarrierConfig, ParticipantId};
use tracing_subscriber::EnvFilter;

const AGENTS: usize = 3;
const STEPS: usize = 100;

/// Head for the landmark with the same index as this controller.
fn run_controller(mut handle: ControllerHandle) -> f64 {
    let i = handle.id().0 as usize;
    let mut obs = handle.reset().expect("reset");
    let mut total = 0.0;
    for step in 0..STEPS {
        let mut action = Action::zeros(2, 2);
        action.u.copy_from_slice(&obs[4 + 2 * i..6 + 2 * i]);
        let outcome = handle.step(action).expect("step");
        total += outcome.reward;
        obs = outcome.observation;

        if i == 0 && (step % 25 == 0 || step == STEPS - 1) {
            println!(
                "  step {:>3}: reward={:>8.4}, covered={}",
                step + 1,
                outcome.reward,
                match &outcome.info {
                    AgentInfo::Own(info) => info.get("occupied").copied().unwrap_or_default(),
                    AgentInfo::All(infos) => infos[i].get("occupied").copied().unwrap_or_default(),
                },
            );
            handle.render().expect("render");
        }
    }
    total
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Tandem Lockstep Demo ===\n");

    let config = EnvConfig {
        seed: 42,
        barrier: BarrierConfig::with_timeout(Duration::from_secs(5)),
        ..Default::default()
    };
    let host = SimulationHost::new(reference_spread(AGENTS), config)
        .expect("host")
        .with_render_sink(|world: &World, who: ParticipantId| {
            println!("  [render for {who}] tick {}", world.tick());
        });
    let handles: Vec<_> = (0..AGENTS)
        .map(|_| host.spawn_controller().expect("controller"))
        .collect();
    let mut running = HostThread::spawn(host).expect("host thread");

    println!("Episode: {STEPS} steps, {AGENTS} agents");
    let totals: Vec<f64> = thread::scope(|s| {
        let workers: Vec<_> = handles
            .into_iter()
            .map(|h| s.spawn(move || run_controller(h)))
            .collect();
        workers.into_iter().map(|w| w.join().expect("controller panicked")).collect()
    });

    let host = running.shutdown().expect("host thread panicked");
    println!("\nFinished at tick {}", host.world().tick());
    let metrics = host.last_metrics();
    println!(
        "Last cycle: total={}μs, wait={}μs, physics={}μs",
        metrics.total_us, metrics.wait_us, metrics.physics_us
    );
    for (k, total) in totals.iter().enumerate() {
        println!("  controller {k}: return={total:>9.3}");
    }
}
