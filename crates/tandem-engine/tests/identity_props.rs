//! Property tests: whatever order controllers arrive in, each one gets
//! the outcome of its own action.

use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use tandem_engine::{EnvConfig, SimulationHost};
use tandem_physics::Action;
use tandem_sync::BarrierConfig;
use tandem_test_utils::fixtures::PointScenario;

fn arrivals() -> impl Strategy<Value = Vec<(f64, u64)>> {
    prop::collection::vec((-1.0f64..1.0, 0u64..5), 1..5)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn each_controller_sees_its_own_action(plan in arrivals()) {
        let n = plan.len();
        let config = EnvConfig {
            seed: 3,
            barrier: BarrierConfig::with_timeout(Duration::from_secs(10)),
            ..Default::default()
        };
        let mut host = SimulationHost::new(PointScenario::new(n).without_contact(), config).unwrap();
        let handles: Vec<_> = (0..n).map(|_| host.spawn_controller().unwrap()).collect();

        let seen: Vec<(usize, f64)> = thread::scope(|s| {
            let workers: Vec<_> = handles
                .into_iter()
                .map(|mut h| {
                    let (u, delay) = plan[h.id().0 as usize];
                    s.spawn(move || {
                        h.reset().unwrap();
                        thread::sleep(Duration::from_millis(delay));
                        let outcome = h.step(Action::motor(&[u, 0.0], 0)).unwrap();
                        (h.id().0 as usize, outcome.observation[0])
                    })
                })
                .collect();
            host.advance_or_reset().unwrap();
            host.advance_or_reset().unwrap();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        for (k, vx) in seen {
            // Zero start velocity, then u * sensitivity / mass * dt.
            let expected = plan[k].0 * 5.0 * 0.1;
            prop_assert!((vx - expected).abs() < 1e-12, "controller {}: {} vs {}", k, vx, expected);
        }
    }
}
