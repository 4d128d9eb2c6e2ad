//! Reference scenarios for Tandem.
//!
//! - [`Spread`]: cooperative coverage. `N` agents must occupy `N`
//!   landmarks without bumping into each other.
//! - [`Chase`]: pursuit. Controller-driven runners evade scripted
//!   chasers among static obstacles.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod chase;
pub mod spread;

pub use chase::{Chase, Pursue};
pub use spread::Spread;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tandem_core::Vector;

/// A point drawn uniformly from `[-extent, extent]^dim`.
pub(crate) fn uniform_point(rng: &mut ChaCha8Rng, dim: usize, extent: f64) -> Vector {
    (0..dim).map(|_| rng.random_range(-extent..=extent)).collect()
}

/// Whether two bodies overlap.
pub(crate) fn touching(a: &tandem_physics::Body, b: &tandem_physics::Body) -> bool {
    tandem_core::vector::distance(&a.position, &b.position) < a.size + b.size
}
