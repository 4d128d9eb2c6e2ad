//! Global physical constants of a world.

use tandem_core::ConfigError;

/// Dimensions and integration constants shared by every entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldParams {
    /// Positional dimensionality `D`. Default: 2.
    pub dim_p: usize,
    /// Communication channel dimensionality `C`. Default: 0.
    pub dim_c: usize,
    /// Integration timestep in seconds. Default: 0.1.
    pub dt: f64,
    /// Fraction of velocity removed each tick, in `[0, 1]`. Default: 0.25.
    pub damping: f64,
    /// Contact stiffness. Default: 100.
    pub contact_force: f64,
    /// Softplus smoothing width of the contact response. Default: 0.001.
    pub contact_margin: f64,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            dim_p: 2,
            dim_c: 0,
            dt: 0.1,
            damping: 0.25,
            contact_force: 1e2,
            contact_margin: 1e-3,
        }
    }
}

impl WorldParams {
    /// Check every constant for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dim_p == 0 {
            return Err(ConfigError::InvalidDimension);
        }
        if !self.dt.is_finite() || self.dt < 0.0 {
            return Err(ConfigError::InvalidTimestep { value: self.dt });
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(ConfigError::InvalidDamping {
                value: self.damping,
            });
        }
        if !self.contact_force.is_finite() || self.contact_force < 0.0 {
            return Err(ConfigError::InvalidContactForce {
                value: self.contact_force,
            });
        }
        // Divides the separation inside softplus, so zero is rejected too.
        if !self.contact_margin.is_finite() || self.contact_margin <= 0.0 {
            return Err(ConfigError::InvalidContactMargin {
                value: self.contact_margin,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(WorldParams::default().validate().is_ok());
    }

    #[test]
    fn negative_dt_rejected() {
        let p = WorldParams {
            dt: -0.1,
            ..Default::default()
        };
        assert_eq!(p.validate(), Err(ConfigError::InvalidTimestep { value: -0.1 }));
    }

    #[test]
    fn zero_dt_allowed() {
        let p = WorldParams {
            dt: 0.0,
            ..Default::default()
        };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn negative_and_zero_margin_rejected() {
        for margin in [-1e-3, 0.0, f64::NAN] {
            let p = WorldParams {
                contact_margin: margin,
                ..Default::default()
            };
            assert!(matches!(
                p.validate(),
                Err(ConfigError::InvalidContactMargin { .. })
            ));
        }
    }

    #[test]
    fn damping_out_of_range_rejected() {
        let p = WorldParams {
            damping: 1.5,
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(ConfigError::InvalidDamping { .. })));
    }

    #[test]
    fn zero_dimension_rejected() {
        let p = WorldParams {
            dim_p: 0,
            ..Default::default()
        };
        assert_eq!(p.validate(), Err(ConfigError::InvalidDimension));
    }
}
