//! # Clearance
//!
//! The planner never looks at obstacles directly. Instead it asks an obstacle distance field for
//! the clearance at a point, that is the distance from the point to the nearest obstacle. Any
//! type implementing [`ClearanceMap`] can provide this, two implementations are included:
//! - [`DistanceMap`] - a precomputed grid distance field built from an occupancy grid,
//! - [`ObstacleField`] - an analytic field over circular obstacles and wall segments.
//!
//! The planner queries the map through [`Clearance`], which turns every failed or invalid query
//! into zero clearance, so such points are never considered safe.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod distance_map;
mod obstacle_field;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::route::RoutePose;
use log::{debug, trace};
use nalgebra::Point2;

use crate::circle::Circle;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use distance_map::{DistanceMap, DistanceMapError, DistanceMapParams};
pub use obstacle_field::{
    Bounds, CircularObstacle, ObstacleField, WallSegment, DEFAULT_MAX_DISTANCE_M,
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// An obstacle distance field.
pub trait ClearanceMap {
    /// Distance from `point_m` to the nearest obstacle, in meters.
    fn distance_to_obstacle(&self, point_m: &Point2<f64>) -> Result<f64, ClearanceError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Adapter between the planner and a [`ClearanceMap`].
#[derive(Debug)]
pub struct Clearance<'m, M: ?Sized> {
    map: &'m M,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClearanceError {
    #[error("The point {0} is outside the map")]
    OutsideMap(Point2<f64>),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<F> ClearanceMap for F
where
    F: Fn(&Point2<f64>) -> Result<f64, ClearanceError>,
{
    fn distance_to_obstacle(&self, point_m: &Point2<f64>) -> Result<f64, ClearanceError> {
        self(point_m)
    }
}

impl<'m, M: ClearanceMap + ?Sized> Clearance<'m, M> {
    pub fn new(map: &'m M) -> Self {
        Self { map }
    }

    /// Clearance at the given point.
    ///
    /// Failed queries, and queries returning a negative, NaN or infinite distance, are treated as
    /// having zero clearance.
    pub fn at(&self, point_m: &Point2<f64>) -> f64 {
        match self.map.distance_to_obstacle(point_m) {
            Ok(d) if d.is_finite() && d >= 0.0 => d,
            Ok(d) => {
                debug!(
                    "Invalid clearance {} at ({:.3}, {:.3}), treating as unsafe",
                    d, point_m.x, point_m.y
                );
                0.0
            }
            Err(e) => {
                trace!("Clearance query failed ({}), treating as unsafe", e);
                0.0
            }
        }
    }

    /// Clearance at the position of a route pose.
    pub fn at_pose(&self, pose: &RoutePose) -> f64 {
        self.at(&pose.position_m())
    }

    /// Build a circle at the given point whose radius is the clearance there.
    pub fn circle_at(&self, point_m: &Point2<f64>) -> Circle {
        Circle::new(*point_m, self.at(point_m))
    }

    /// Build a circle at the position of a route pose.
    pub fn circle_at_pose(&self, pose: &RoutePose) -> Circle {
        self.circle_at(&pose.position_m())
    }
}

impl<'m, M: ?Sized> Clone for Clearance<'m, M> {
    fn clone(&self) -> Self {
        Self { map: self.map }
    }
}

impl<'m, M: ?Sized> Copy for Clearance<'m, M> {}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
