//! Physical entities: [`Body`], [`Agent`], [`Landmark`], and the
//! per-tick [`Action`] an agent carries.
//!
//! Vectors left empty at construction are filled with zeros of the
//! world's dimension by [`WorldBuilder::build`](crate::WorldBuilder::build).

use std::sync::Arc;

use tandem_core::{vector, ConfigError, Vector};

use crate::behavior::Behavior;

/// Physical state and properties shared by agents and landmarks.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// Human-readable name, used in configuration errors and logs.
    pub name: String,
    /// Position, length `dim_p`.
    pub position: Vector,
    /// Velocity, length `dim_p`.
    pub velocity: Vector,
    /// Mass. Must be finite and positive.
    pub mass: f64,
    /// Radius used for contact detection. Must be non-negative.
    pub size: f64,
    /// Whether forces change this body's velocity.
    pub movable: bool,
    /// Whether this body takes part in contact resolution.
    pub collide: bool,
    /// Speed cap applied after integration.
    pub max_speed: Option<f64>,
    /// Action sensitivity. Falls back to the environment default when unset.
    pub accel: Option<f64>,
}

impl Body {
    /// A unit-mass body of size 0.05 at the origin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vector::new(),
            velocity: Vector::new(),
            mass: 1.0,
            size: 0.05,
            movable: false,
            collide: true,
            max_speed: None,
            accel: None,
        }
    }

    /// Fill unset vectors and check every property against `dim_p`.
    pub(crate) fn finalize(&mut self, dim_p: usize) -> Result<(), ConfigError> {
        fill_or_check(&self.name, "position", &mut self.position, dim_p)?;
        fill_or_check(&self.name, "velocity", &mut self.velocity, dim_p)?;
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(ConfigError::NonPositiveMass {
                entity: self.name.clone(),
                mass: self.mass,
            });
        }
        if !self.size.is_finite() || self.size < 0.0 {
            return Err(ConfigError::NegativeSize {
                entity: self.name.clone(),
                size: self.size,
            });
        }
        if let Some(max) = self.max_speed {
            if !max.is_finite() || max <= 0.0 {
                return Err(ConfigError::InvalidMaxSpeed {
                    entity: self.name.clone(),
                    value: max,
                });
            }
        }
        if let Some(accel) = self.accel {
            if !accel.is_finite() || accel < 0.0 {
                return Err(ConfigError::InvalidSensitivity { value: accel });
            }
        }
        Ok(())
    }
}

fn fill_or_check(
    entity: &str,
    what: &'static str,
    v: &mut Vector,
    dim: usize,
) -> Result<(), ConfigError> {
    if v.is_empty() {
        *v = vector::zeros(dim);
        return Ok(());
    }
    if v.len() != dim {
        return Err(ConfigError::DimensionMismatch {
            entity: entity.to_string(),
            what,
            expected: dim,
            got: v.len(),
        });
    }
    Ok(())
}

fn check_noise(entity: &str, which: &'static str, noise: Option<f64>) -> Result<(), ConfigError> {
    match noise {
        Some(value) if !value.is_finite() || value < 0.0 => Err(ConfigError::InvalidNoise {
            entity: entity.to_string(),
            which,
            value,
        }),
        _ => Ok(()),
    }
}

/// Physical motor force `u` and communication utterance `c`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Action {
    /// Motor force, length `dim_p`.
    pub u: Vector,
    /// Communication utterance, length `dim_c`.
    pub c: Vector,
}

impl Action {
    /// A zero action for the given dimensions.
    pub fn zeros(dim_p: usize, dim_c: usize) -> Self {
        Self {
            u: vector::zeros(dim_p),
            c: vector::zeros(dim_c),
        }
    }

    /// Motor-only action with a zero utterance of length `dim_c`.
    pub fn motor(u: &[f64], dim_c: usize) -> Self {
        Self {
            u: Vector::from_slice(u),
            c: vector::zeros(dim_c),
        }
    }
}

/// An entity that acts and may communicate.
///
/// Agents with a [`Behavior`] are scripted: the engine computes their
/// action every tick and they are not driven by controllers.
#[derive(Clone)]
pub struct Agent {
    /// Physical state.
    pub body: Body,
    /// The action applied on the next tick.
    pub action: Action,
    /// Communication state broadcast to other agents, length `dim_c`.
    pub comm: Vector,
    /// Standard deviation of Gaussian motor noise.
    pub u_noise: Option<f64>,
    /// Standard deviation of Gaussian communication noise.
    pub c_noise: Option<f64>,
    /// Silent agents always broadcast zeros.
    pub silent: bool,
    /// Scripted policy, if any.
    pub behavior: Option<Arc<dyn Behavior>>,
}

impl Agent {
    /// A movable, collidable agent with default body properties.
    pub fn new(name: impl Into<String>) -> Self {
        let mut body = Body::new(name);
        body.movable = true;
        Self {
            body,
            action: Action::default(),
            comm: Vector::new(),
            u_noise: None,
            c_noise: None,
            silent: false,
            behavior: None,
        }
    }

    /// Set the contact radius.
    pub fn size(mut self, size: f64) -> Self {
        self.body.size = size;
        self
    }

    /// Set the mass.
    pub fn mass(mut self, mass: f64) -> Self {
        self.body.mass = mass;
        self
    }

    /// Set the action sensitivity.
    pub fn accel(mut self, accel: f64) -> Self {
        self.body.accel = Some(accel);
        self
    }

    /// Cap the speed.
    pub fn max_speed(mut self, max: f64) -> Self {
        self.body.max_speed = Some(max);
        self
    }

    /// Enable or disable contact resolution.
    pub fn collide(mut self, collide: bool) -> Self {
        self.body.collide = collide;
        self
    }

    /// Enable or disable movement.
    pub fn movable(mut self, movable: bool) -> Self {
        self.body.movable = movable;
        self
    }

    /// Set the initial position.
    pub fn at(mut self, position: &[f64]) -> Self {
        self.body.position = Vector::from_slice(position);
        self
    }

    /// Set motor noise.
    pub fn u_noise(mut self, sigma: f64) -> Self {
        self.u_noise = Some(sigma);
        self
    }

    /// Set communication noise.
    pub fn c_noise(mut self, sigma: f64) -> Self {
        self.c_noise = Some(sigma);
        self
    }

    /// Mark the agent silent.
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Attach a scripted policy.
    pub fn scripted(mut self, behavior: Arc<dyn Behavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// The agent's name.
    pub fn name(&self) -> &str {
        &self.body.name
    }

    /// Whether a [`Behavior`] drives this agent.
    pub fn is_scripted(&self) -> bool {
        self.behavior.is_some()
    }

    pub(crate) fn finalize(&mut self, dim_p: usize, dim_c: usize) -> Result<(), ConfigError> {
        self.body.finalize(dim_p)?;
        let name = self.body.name.clone();
        fill_or_check(&name, "action.u", &mut self.action.u, dim_p)?;
        fill_or_check(&name, "action.c", &mut self.action.c, dim_c)?;
        fill_or_check(&name, "comm", &mut self.comm, dim_c)?;
        check_noise(&name, "motor", self.u_noise)?;
        check_noise(&name, "communication", self.c_noise)?;
        Ok(())
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("body", &self.body)
            .field("action", &self.action)
            .field("comm", &self.comm)
            .field("u_noise", &self.u_noise)
            .field("c_noise", &self.c_noise)
            .field("silent", &self.silent)
            .field("behavior", &self.behavior.as_ref().map(|b| b.name()))
            .finish()
    }
}

/// A passive entity: immovable by default, no action.
#[derive(Clone, Debug, PartialEq)]
pub struct Landmark {
    /// Physical state.
    pub body: Body,
}

impl Landmark {
    /// An immovable landmark with default body properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            body: Body::new(name),
        }
    }

    /// Set the contact radius.
    pub fn size(mut self, size: f64) -> Self {
        self.body.size = size;
        self
    }

    /// Enable or disable contact resolution.
    pub fn collide(mut self, collide: bool) -> Self {
        self.body.collide = collide;
        self
    }

    /// Enable or disable movement.
    pub fn movable(mut self, movable: bool) -> Self {
        self.body.movable = movable;
        self
    }

    /// Set the mass.
    pub fn mass(mut self, mass: f64) -> Self {
        self.body.mass = mass;
        self
    }

    /// Set the initial position.
    pub fn at(mut self, position: &[f64]) -> Self {
        self.body.position = Vector::from_slice(position);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_fills_empty_vectors() {
        let mut a = Agent::new("a");
        a.finalize(3, 2).unwrap();
        assert_eq!(a.body.position.len(), 3);
        assert_eq!(a.body.velocity.len(), 3);
        assert_eq!(a.action.u.len(), 3);
        assert_eq!(a.action.c.len(), 2);
        assert_eq!(a.comm.len(), 2);
    }

    #[test]
    fn wrong_position_length_is_rejected() {
        let mut a = Agent::new("a").at(&[1.0, 2.0, 3.0]);
        assert_eq!(
            a.finalize(2, 0),
            Err(ConfigError::DimensionMismatch {
                entity: "a".into(),
                what: "position",
                expected: 2,
                got: 3,
            })
        );
    }

    #[test]
    fn zero_mass_is_rejected() {
        let mut l = Landmark::new("rock").mass(0.0);
        assert!(matches!(
            l.body.finalize(2),
            Err(ConfigError::NonPositiveMass { .. })
        ));
    }

    #[test]
    fn negative_noise_is_rejected() {
        let mut a = Agent::new("a").c_noise(-0.1);
        assert!(matches!(
            a.finalize(2, 1),
            Err(ConfigError::InvalidNoise {
                which: "communication",
                ..
            })
        ));
    }

    #[test]
    fn zero_max_speed_is_rejected() {
        let mut a = Agent::new("a").max_speed(0.0);
        assert!(matches!(
            a.finalize(2, 0),
            Err(ConfigError::InvalidMaxSpeed { .. })
        ));
    }

    #[test]
    fn landmarks_are_immovable_by_default() {
        assert!(!Landmark::new("l").body.movable);
        assert!(Agent::new("a").body.movable);
    }
}
