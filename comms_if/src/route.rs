//! # Reference Route Messages
//!
//! A reference route is an ordered list of poses that the planner should follow loosely. It is
//! produced by the route publisher and is read-only to the planner.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single pose along the reference route, in the global map frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePose {
    /// X position in meters
    pub x_m: f64,

    /// Y position in meters
    pub y_m: f64,

    /// Heading (angle to the positive X axis) in radians, in the range [0, 2pi].
    #[serde(default)]
    pub theta_rad: f64,
}

/// The reference route message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteMsg {
    /// Poses of the route, ordered from the start of the route to its end.
    pub poses: Vec<RoutePose>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RoutePose {
    pub fn new(x_m: f64, y_m: f64, theta_rad: f64) -> Self {
        Self { x_m, y_m, theta_rad }
    }

    /// The position of this pose as a point.
    pub fn position_m(&self) -> Point2<f64> {
        Point2::new(self.x_m, self.y_m)
    }
}

impl RouteMsg {
    pub fn new(poses: Vec<RoutePose>) -> Self {
        Self { poses }
    }

    /// Number of poses in the route
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Get the pose at `index`, or `None` if beyond the end of the route.
    pub fn get(&self, index: usize) -> Option<&RoutePose> {
        self.poses.get(index)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_route_msg_json() {
        let route: RouteMsg = serde_json::from_str(
            r#"{ "poses": [ { "x_m": 1.0, "y_m": 2.0, "theta_rad": 0.5 }, { "x_m": 3.0, "y_m": 4.0 } ] }"#,
        )
        .unwrap();

        assert_eq!(route.len(), 2);
        assert_eq!(route.get(0), Some(&RoutePose::new(1.0, 2.0, 0.5)));
        assert_eq!(route.get(1).map(|p| p.theta_rad), Some(0.0));
        assert_eq!(route.get(1).map(|p| p.position_m()), Some(Point2::new(3.0, 4.0)));
        assert!(route.get(2).is_none());
    }
}
