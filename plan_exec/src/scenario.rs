//! # Planning Scenarios
//!
//! A scenario is a complete planning problem stored as JSON: the start and goal positions, the
//! vehicle, the reference route and the obstacles.
//!
//! ```json
//! {
//!     "start_m": [0.0, 0.0],
//!     "goal_m": [20.0, 0.0],
//!     "vehicle": { "width_m": 1.0 },
//!     "field": { "circles": [ { "centre_m": [10.0, 0.0], "radius_m": 1.5 } ] },
//!     "route_spacing_m": 0.1
//! }
//! ```
//!
//! If no route is given a straight route from the start to the goal is generated, sampled every
//! `route_spacing_m` meters.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fs::File, io::BufReader, path::Path};

use comms_if::{
    route::{RouteMsg, RoutePose},
    veh::VehicleConfig,
};
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use util::maths::{lin_map, map_pi_to_2pi};

use crate::clearance::ObstacleField;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Spacing between poses of generated routes, if the scenario doesn't set one.
pub const DEFAULT_ROUTE_SPACING_M: f64 = 0.1;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub start_m: Point2<f64>,

    pub goal_m: Point2<f64>,

    pub vehicle: VehicleConfig,

    #[serde(default)]
    pub field: ObstacleField,

    /// The reference route, generated on load if empty.
    #[serde(default)]
    pub route: RouteMsg,

    #[serde(default = "default_route_spacing")]
    pub route_spacing_m: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Couldn't open the scenario file: {0}")]
    FileOpenError(std::io::Error),

    #[error("Couldn't parse the scenario: {0}")]
    ParseError(serde_json::Error),

    #[error("Route spacing must be positive, got {0}")]
    InvalidRouteSpacing(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Scenario {
    /// Load a scenario from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let file = File::open(path).map_err(ScenarioError::FileOpenError)?;
        let scenario: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(ScenarioError::ParseError)?;

        scenario.with_default_route()
    }

    /// Parse a scenario from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(json).map_err(ScenarioError::ParseError)?;

        scenario.with_default_route()
    }

    /// Generate a straight route from `start_m` to `goal_m`, with poses no more than `spacing_m`
    /// apart. Both endpoints are included and every pose faces the goal.
    pub fn straight_route(
        start_m: &Point2<f64>,
        goal_m: &Point2<f64>,
        spacing_m: f64,
    ) -> Result<RouteMsg, ScenarioError> {
        if !(spacing_m > 0.0) || !spacing_m.is_finite() {
            return Err(ScenarioError::InvalidRouteSpacing(spacing_m));
        }

        let delta = goal_m - start_m;
        let num_steps = ((delta.norm() / spacing_m).ceil() as usize).max(1);
        let theta_rad = map_pi_to_2pi(delta.y.atan2(delta.x));

        let poses = (0..=num_steps)
            .map(|i| {
                let i = i as f64;
                let range = (0.0, num_steps as f64);
                RoutePose::new(
                    lin_map(range, (start_m.x, goal_m.x), i),
                    lin_map(range, (start_m.y, goal_m.y), i),
                    theta_rad,
                )
            })
            .collect();

        Ok(RouteMsg::new(poses))
    }

    fn with_default_route(mut self) -> Result<Self, ScenarioError> {
        if self.route.is_empty() {
            self.route = Self::straight_route(&self.start_m, &self.goal_m, self.route_spacing_m)?;

            debug!(
                "Generated straight route with {} poses for scenario",
                self.route.len()
            );
        }

        Ok(self)
    }
}

fn default_route_spacing() -> f64 {
    DEFAULT_ROUTE_SPACING_M
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
