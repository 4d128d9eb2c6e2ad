//! Criterion benchmarks for one full rendezvous: every participant
//! submits, the consumer collects, dispatches, and every participant
//! receives.

use std::hint::black_box;
use std::thread;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tandem_sync::{Barrier, BarrierConfig};

fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("barrier_cycle");
    for participants in [1usize, 4, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(participants),
            &participants,
            |b, &n| {
                b.iter_custom(|iters| {
                    let mut barrier: Barrier<u64, u64> = Barrier::new(BarrierConfig::unbounded());
                    let mailboxes: Vec<_> = (0..n).map(|_| barrier.register().unwrap()).collect();
                    thread::scope(|s| {
                        for mut m in mailboxes {
                            s.spawn(move || {
                                for i in 0..iters {
                                    black_box(m.exchange(i).unwrap());
                                }
                            });
                        }
                        let start = std::time::Instant::now();
                        for _ in 0..iters {
                            let batch = barrier.await_cycle().unwrap();
                            barrier.dispatch(batch).unwrap();
                        }
                        start.elapsed()
                    })
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_cycle);
criterion_main!(benches);
