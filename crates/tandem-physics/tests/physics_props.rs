//! Property tests for the contact model and the integrator.
//!
//! These hold for arbitrary positions, sizes and actions: contact forces
//! are equal and opposite, immovable bodies never receive force, the
//! speed cap is never exceeded, and nothing becomes NaN.

use proptest::prelude::*;
use tandem_core::{vector, Vector};
use tandem_physics::{collision_force, Agent, Body, Landmark, PhysicsEngine, World, WorldParams};

fn body(pos: [f64; 2], size: f64, movable: bool) -> Body {
    let mut b = Body::new("b");
    b.position = Vector::from_slice(&pos);
    b.velocity = vector::zeros(2);
    b.size = size;
    b.movable = movable;
    b
}

fn coord() -> impl Strategy<Value = f64> {
    -2.0f64..2.0
}

proptest! {
    #[test]
    fn contact_forces_are_equal_and_opposite(
        pa in (coord(), coord()),
        pb in (coord(), coord()),
        sa in 0.0f64..0.5,
        sb in 0.0f64..0.5,
    ) {
        let params = WorldParams::default();
        let a = body([pa.0, pa.1], sa, true);
        let b = body([pb.0, pb.1], sb, true);
        let (fa, fb) = collision_force(&a, &b, &params).unwrap();
        for (x, y) in fa.iter().zip(&fb) {
            prop_assert!(x.is_finite() && y.is_finite());
            prop_assert!((x + y).abs() <= 1e-9 * x.abs().max(1.0));
        }
    }

    #[test]
    fn immovable_bodies_receive_zero(
        pa in (coord(), coord()),
        pb in (coord(), coord()),
        a_movable in any::<bool>(),
        b_movable in any::<bool>(),
    ) {
        let params = WorldParams::default();
        let a = body([pa.0, pa.1], 0.3, a_movable);
        let b = body([pb.0, pb.1], 0.3, b_movable);
        let (fa, fb) = collision_force(&a, &b, &params).unwrap();
        if !a_movable {
            prop_assert!(fa.iter().all(|&x| x == 0.0));
        }
        if !b_movable {
            prop_assert!(fb.iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn speed_never_exceeds_cap(
        ux in -1e3f64..1e3,
        uy in -1e3f64..1e3,
        cap in 0.01f64..10.0,
        ticks in 1usize..10,
    ) {
        let mut world = World::builder(WorldParams::default())
            .agent(Agent::new("a").max_speed(cap).u_noise(1.0))
            .agent(Agent::new("b").max_speed(cap).at(&[0.01, 0.0]))
            .landmark(Landmark::new("l").at(&[0.0, 0.02]))
            .build()
            .unwrap();
        let mut engine = PhysicsEngine::new(3);
        for _ in 0..ticks {
            world.agents[0].action.u = Vector::from_slice(&[ux, uy]);
            world.agents[1].action.u = Vector::from_slice(&[-uy, ux]);
            engine.step(&mut world);
            for agent in &world.agents {
                let speed = vector::norm(&agent.body.velocity);
                prop_assert!(speed <= cap * (1.0 + 1e-12), "speed {} > cap {}", speed, cap);
            }
        }
    }
}
