//! Environment-level configuration.

use tandem_core::ConfigError;
use tandem_sync::BarrierConfig;

/// Sensitivity applied to motor actions of agents without their own `accel`.
///
/// The motor force of a policy agent is `u * sensitivity` plus noise, so a
/// controller sending `u` moves its agent five times as hard as the raw
/// value suggests. Set [`EnvConfig::action_sensitivity`] to 1.0 to apply
/// actions unscaled.
pub const DEFAULT_ACTION_SENSITIVITY: f64 = 5.0;

/// How a [`SimulationHost`](crate::SimulationHost) turns controller
/// requests into world updates and responses.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvConfig {
    /// Seed for physics noise and scenario resets. Default: 0.
    pub seed: u64,
    /// Every agent receives the sum of all agents' rewards. Default: false.
    pub shared_reward: bool,
    /// Every agent receives the info of all agents instead of its own.
    /// Default: false.
    pub broadcast_info: bool,
    /// Rewind the world tick to zero on reset. Default: true.
    pub reset_tick_counter: bool,
    /// Multiplier for the motor action `u` of policy agents whose body has
    /// no `accel`. Default: [`DEFAULT_ACTION_SENSITIVITY`]. The
    /// communication action `c` is never scaled.
    pub action_sensitivity: f64,
    /// Deadlines for the underlying barrier.
    pub barrier: BarrierConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            shared_reward: false,
            broadcast_info: false,
            reset_tick_counter: true,
            action_sensitivity: DEFAULT_ACTION_SENSITIVITY,
            barrier: BarrierConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Check the configuration for unusable values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.action_sensitivity.is_finite() || self.action_sensitivity < 0.0 {
            return Err(ConfigError::InvalidSensitivity {
                value: self.action_sensitivity,
            });
        }
        Ok(())
    }
}
