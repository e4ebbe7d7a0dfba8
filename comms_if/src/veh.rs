//! # Vehicle Configuration

use serde::{Deserialize, Serialize};

/// Geometry of the vehicle being planned for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// Overall width of the vehicle in meters
    pub width_m: f64,
}

impl VehicleConfig {
    pub fn new(width_m: f64) -> Self {
        Self { width_m }
    }

    /// Half the width of the vehicle, the minimum clearance a circle must have to be usable.
    pub fn half_width_m(&self) -> f64 {
        self.width_m * 0.5
    }
}
