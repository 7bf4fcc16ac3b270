//! First-order motor plant used to close the simulation loop.
//!
//! `ẋ = Ku·y − λ·x`, forward-Euler integrated at the gate period, in f32.

use serde::{Deserialize, Serialize};
use spd_common::config::ConfigError;
use spd_common::consts::{PLANT_KU, PLANT_LAMBDA};

/// Plant parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantParams {
    /// Input gain [rad/s² per V].
    #[serde(default = "default_ku")]
    pub ku: f32,
    /// Decay rate [1/s].
    #[serde(default = "default_lambda")]
    pub lambda: f32,
}

fn default_ku() -> f32 {
    PLANT_KU
}

fn default_lambda() -> f32 {
    PLANT_LAMBDA
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            ku: PLANT_KU,
            lambda: PLANT_LAMBDA,
        }
    }
}

impl PlantParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ku.is_finite() || !self.lambda.is_finite() {
            return Err(ConfigError::ValidationError(
                "plant parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Simulated plant state.
#[derive(Debug, Clone)]
pub struct FirstOrderPlant {
    params: PlantParams,
    ts: f32,
    velocity: f32,
}

impl FirstOrderPlant {
    pub fn new(params: PlantParams, ts: f32) -> Self {
        Self {
            params,
            ts,
            velocity: 0.0,
        }
    }

    /// True angular velocity [rad/s].
    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Apply actuator command `y` for one sample period.
    #[inline]
    pub fn step(&mut self, y: f32) -> f32 {
        let p = &self.params;
        self.velocity += self.ts * (p.ku * y - p.lambda * self.velocity);
        self.velocity
    }

    #[inline]
    pub fn reset(&mut self) {
        self.velocity = 0.0;
    }
}
