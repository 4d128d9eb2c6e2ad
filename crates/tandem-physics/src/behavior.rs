//! Scripted agent policies.

use rand::RngCore;

use crate::entity::Action;
use crate::world::World;

/// A policy the engine evaluates for a scripted agent every tick.
///
/// Behaviors see a read-only world: all scripted actions are computed
/// before any of them is assigned, so the order of scripted agents does
/// not matter.
///
/// # Example
///
/// ```
/// use rand::RngCore;
/// use tandem_physics::{Action, Behavior, World};
///
/// /// Always pushes along the first axis.
/// struct Drift;
///
/// impl Behavior for Drift {
///     fn name(&self) -> &str {
///         "drift"
///     }
///
///     fn act(&self, _agent: usize, world: &World, _rng: &mut dyn RngCore) -> Action {
///         let mut action = Action::zeros(world.params().dim_p, world.params().dim_c);
///         action.u[0] = 1.0;
///         action
///     }
/// }
/// ```
pub trait Behavior: Send + Sync + 'static {
    /// Short name for logs and debug output.
    fn name(&self) -> &str;

    /// The action for agent index `agent` this tick.
    ///
    /// `rng` is the tick's deterministic noise stream.
    fn act(&self, agent: usize, world: &World, rng: &mut dyn RngCore) -> Action;
}
