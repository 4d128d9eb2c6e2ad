//! End-to-end: reference scenarios driven by controller threads through
//! a host thread.

use std::thread;
use std::time::Duration;

use tandem_engine::{ControllerHandle, EnvConfig, HostThread, SimulationHost};
use tandem_physics::Action;
use tandem_scenarios::{Chase, Spread};
use tandem_sync::BarrierConfig;

fn config(seed: u64) -> EnvConfig {
    EnvConfig {
        seed,
        barrier: BarrierConfig::with_timeout(Duration::from_secs(10)),
        ..Default::default()
    }
}

/// Agent `i` heads for landmark `i` using only its observation.
fn greedy(mut h: ControllerHandle, landmarks: usize, steps: usize) -> (f64, f64) {
    let i = h.id().0 as usize;
    let mut obs = h.reset().unwrap();
    let mut first = None;
    let mut last = 0.0;
    for _ in 0..steps {
        // [vel 2, pos 2, landmark offsets 2 * L, ...]
        let offset = &obs[4 + 2 * i..6 + 2 * i];
        assert!(landmarks > i);
        let mut action = Action::zeros(2, 2);
        action.u.copy_from_slice(offset);
        let outcome = h.step(action).unwrap();
        first.get_or_insert(outcome.reward);
        last = outcome.reward;
        obs = outcome.observation;
    }
    (first.unwrap_or(last), last)
}

#[test]
fn spread_agents_cover_landmarks() {
    let scenario = Spread::new(3).with_collision_penalty(0.0);
    let host = SimulationHost::new(scenario, config(11)).unwrap();
    let handles: Vec<_> = (0..3).map(|_| host.spawn_controller().unwrap()).collect();
    let mut running = HostThread::spawn(host).unwrap();

    let results: Vec<_> = thread::scope(|s| {
        let workers: Vec<_> = handles
            .into_iter()
            .map(|h| s.spawn(move || greedy(h, 3, 60)))
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    let host = running.shutdown().unwrap();
    assert_eq!(host.world().tick().0, 60);
    for (first, last) in results {
        assert!(last > first, "coverage did not improve: {first} -> {last}");
        assert!(last > -0.5, "agents should end near their landmarks: {last}");
    }
}

#[test]
fn chase_runs_with_scripted_chasers() {
    let host = SimulationHost::new(Chase::new(2, 2).with_shaping(true), config(5)).unwrap();
    let handles: Vec<_> = (0..2).map(|_| host.spawn_controller().unwrap()).collect();
    let mut running = HostThread::spawn(host).unwrap();

    thread::scope(|s| {
        for mut h in handles {
            s.spawn(move || {
                let obs = h.reset().unwrap();
                // vel 2 + pos 2 + obstacles 2 * 2 + other agents 3 * 2
                assert_eq!(obs.len(), 14);
                for _ in 0..20 {
                    let outcome = h.step(Action::zeros(2, 0)).unwrap();
                    assert!(outcome.reward.is_finite());
                }
            });
        }
    });

    let host = running.shutdown().unwrap();
    assert_eq!(host.world().tick().0, 20);
    // Chasers moved on their own.
    assert!(host.world().agents[2..]
        .iter()
        .all(|c| tandem_core::vector::norm(&c.body.velocity) > 0.0));
}
