//! Deterministic noise streams.
//!
//! Every tick draws from a fresh `ChaCha8Rng` keyed by `seed ^ tick` on a
//! stream chosen by the episode, so the noise at tick `t` of episode `e`
//! depends only on the seed, `e` and `t`. Tick streams are even, the
//! stream handed to episode resets is odd.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tandem_core::{TickId, Vector};

/// The noise stream for tick `tick` of episode `episode`.
pub fn tick_rng(seed: u64, episode: u64, tick: TickId) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ tick.0);
    rng.set_stream(episode.wrapping_mul(2));
    rng
}

/// The stream handed to scenario resets for episode `episode`.
pub fn episode_rng(seed: u64, episode: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(episode.wrapping_mul(2).wrapping_add(1));
    rng
}

/// One standard normal sample via Box-Muller.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-300);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// A vector of `dim` independent `N(0, sigma^2)` samples.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, dim: usize, sigma: f64) -> Vector {
    (0..dim).map(|_| standard_normal(rng) * sigma).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_tick_same_stream() {
        let a = gaussian(&mut tick_rng(7, 2, TickId(3)), 4, 1.0);
        let b = gaussian(&mut tick_rng(7, 2, TickId(3)), 4, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn different_ticks_differ() {
        let a = gaussian(&mut tick_rng(7, 0, TickId(3)), 4, 1.0);
        let b = gaussian(&mut tick_rng(7, 0, TickId(4)), 4, 1.0);
        assert_ne!(a, b);
    }

    #[test]
    fn different_episodes_differ_at_the_same_tick() {
        let a = gaussian(&mut tick_rng(7, 0, TickId(0)), 4, 1.0);
        let b = gaussian(&mut tick_rng(7, 1, TickId(0)), 4, 1.0);
        assert_ne!(a, b);
    }

    #[test]
    fn episode_stream_is_distinct_from_tick_streams() {
        let reset = gaussian(&mut episode_rng(7, 0), 4, 1.0);
        for episode in 0..3 {
            let tick = gaussian(&mut tick_rng(7, episode, TickId(0)), 4, 1.0);
            assert_ne!(reset, tick);
        }
    }

    #[test]
    fn samples_are_roughly_standard() {
        let mut rng = tick_rng(42, 0, TickId(0));
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "variance {var}");
    }

    #[test]
    fn zero_sigma_is_zero() {
        let v = gaussian(&mut tick_rng(1, 0, TickId(1)), 3, 0.0);
        assert!(v.iter().all(|&x| x == 0.0));
    }
}
