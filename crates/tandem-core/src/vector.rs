//! The [`Vector`] type alias and the handful of elementwise helpers the
//! physics engine needs.
//!
//! Uses `SmallVec<[f64; 4]>` so positions, velocities and forces of up to
//! four dimensions never touch the heap. Higher-dimensional worlds spill
//! to the heap transparently.

use smallvec::SmallVec;

/// A D-dimensional real vector (position, velocity, force, action).
pub type Vector = SmallVec<[f64; 4]>;

/// A zero vector of the given dimension.
pub fn zeros(dim: usize) -> Vector {
    smallvec::smallvec![0.0; dim]
}

/// Euclidean length of `v`.
pub fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// `a - b`, elementwise.
///
/// # Panics
///
/// Panics in debug builds if the lengths differ.
pub fn sub(a: &[f64], b: &[f64]) -> Vector {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// `a += b * k`, elementwise.
pub fn add_scaled(a: &mut [f64], b: &[f64], k: f64) {
    debug_assert_eq!(a.len(), b.len());
    for (x, y) in a.iter_mut().zip(b) {
        *x += y * k;
    }
}

/// `a *= k`, elementwise.
pub fn scale(a: &mut [f64], k: f64) {
    for x in a.iter_mut() {
        *x *= k;
    }
}

/// Euclidean distance between two points.
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zeros_has_requested_dim() {
        let z = zeros(3);
        assert_eq!(z.len(), 3);
        assert!(z.iter().all(|&x| x == 0.0));
        assert!(!z.spilled());
    }

    #[test]
    fn norm_of_3_4_is_5() {
        assert!((norm(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn add_scaled_accumulates() {
        let mut a = [1.0, 2.0];
        add_scaled(&mut a, &[1.0, -1.0], 2.0);
        assert_eq!(a, [3.0, 0.0]);
    }

    #[test]
    fn sub_then_norm_is_distance() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 6.0, 3.0];
        assert!((norm(&sub(&a, &b)) - distance(&a, &b)).abs() < 1e-12);
        assert!((distance(&a, &b) - 5.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn scale_scales_norm(
            v in proptest::collection::vec(-1e3f64..1e3, 1..6),
            k in 0.0f64..10.0,
        ) {
            let mut w = v.clone();
            scale(&mut w, k);
            prop_assert!((norm(&w) - k * norm(&v)).abs() <= 1e-9 * (1.0 + k * norm(&v)));
        }
    }
}
