//! Soft contact between two bodies.

use tandem_core::{vector, Vector};

use crate::entity::Body;
use crate::params::WorldParams;

/// Lower bound on the separation used as a divisor.
///
/// Coincident bodies produce a zero `delta`, so the resulting force is
/// zero rather than NaN.
pub const MIN_SEPARATION: f64 = 1e-9;

/// `ln(1 + e^x)`, without overflow for large `x`.
pub fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

/// Contact forces between `a` and `b`, as `(on_a, on_b)`.
///
/// Returns `None` when either body does not collide. The two forces are
/// equal and opposite, except that an immovable body receives exactly
/// zero.
pub fn collision_force(a: &Body, b: &Body, params: &WorldParams) -> Option<(Vector, Vector)> {
    if !a.collide || !b.collide {
        return None;
    }
    let delta = vector::sub(&a.position, &b.position);
    let dist = vector::norm(&delta).max(MIN_SEPARATION);
    let dist_min = a.size + b.size;
    let k = params.contact_margin;
    let penetration = k * softplus(-(dist - dist_min) / k);
    let magnitude = params.contact_force * penetration / dist;

    let dim = delta.len();
    let mut on_a = vector::zeros(dim);
    let mut on_b = vector::zeros(dim);
    if a.movable {
        vector::add_scaled(&mut on_a, &delta, magnitude);
    }
    if b.movable {
        vector::add_scaled(&mut on_b, &delta, -magnitude);
    }
    Some((on_a, on_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Body;

    fn body(name: &str, pos: &[f64], movable: bool) -> Body {
        let mut b = Body::new(name);
        b.position = Vector::from_slice(pos);
        b.velocity = vector::zeros(pos.len());
        b.movable = movable;
        b
    }

    #[test]
    fn softplus_is_stable_at_extremes() {
        assert_eq!(softplus(1e4), 1e4);
        assert!(softplus(-1e4) >= 0.0);
        assert!(softplus(-1e4) < 1e-300);
        assert!((softplus(0.0) - std::f64::consts::LN_2).abs() < 1e-15);
    }

    #[test]
    fn overlapping_bodies_push_apart_symmetrically() {
        let p = WorldParams::default();
        let a = body("a", &[0.0, 0.0], true);
        let b = body("b", &[0.05, 0.0], true);
        let (fa, fb) = collision_force(&a, &b, &p).unwrap();
        assert!(fa[0] < 0.0, "a is pushed away from b");
        assert!(fb[0] > 0.0, "b is pushed away from a");
        for (x, y) in fa.iter().zip(&fb) {
            assert!((x + y).abs() < 1e-12);
        }
        assert_eq!(fa[1], 0.0);
    }

    #[test]
    fn immovable_side_receives_nothing() {
        let p = WorldParams::default();
        let a = body("a", &[0.0, 0.0], true);
        let wall = body("wall", &[0.05, 0.0], false);
        let (fa, fw) = collision_force(&a, &wall, &p).unwrap();
        assert!(fa[0] < 0.0);
        assert!(fw.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn non_colliding_pair_is_skipped() {
        let p = WorldParams::default();
        let a = body("a", &[0.0, 0.0], true);
        let mut b = body("b", &[0.0, 0.0], true);
        b.collide = false;
        assert!(collision_force(&a, &b, &p).is_none());
    }

    #[test]
    fn coincident_bodies_do_not_produce_nan() {
        let p = WorldParams::default();
        let a = body("a", &[1.0, 1.0], true);
        let b = body("b", &[1.0, 1.0], true);
        let (fa, fb) = collision_force(&a, &b, &p).unwrap();
        assert!(fa.iter().chain(&fb).all(|x| x.is_finite()));
    }

    #[test]
    fn distant_bodies_feel_negligible_force() {
        let p = WorldParams::default();
        let a = body("a", &[0.0, 0.0], true);
        let b = body("b", &[10.0, 0.0], true);
        let (fa, _) = collision_force(&a, &b, &p).unwrap();
        assert!(fa[0].abs() < 1e-12);
    }
}
