//! # Obstacle Field
//!
//! An analytic distance field over a set of circular obstacles and wall segments. The clearance at
//! a point is the distance to the closest obstacle surface, which is zero inside an obstacle, and
//! never more than the field's `max_distance_m`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use super::{ClearanceError, ClearanceMap};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Clearance reported far from every obstacle, if the field doesn't set its own.
pub const DEFAULT_MAX_DISTANCE_M: f64 = 10.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularObstacle {
    pub centre_m: Point2<f64>,
    pub radius_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub start_m: Point2<f64>,
    pub end_m: Point2<f64>,
}

/// Axis aligned bounds of a field, queries outside are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_m: Point2<f64>,
    pub max_m: Point2<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleField {
    #[serde(default)]
    pub circles: Vec<CircularObstacle>,

    #[serde(default)]
    pub walls: Vec<WallSegment>,

    /// If set, queries outside these bounds fail with [`ClearanceError::OutsideMap`].
    #[serde(default)]
    pub bounds: Option<Bounds>,

    /// Upper limit of the clearance, so an empty field is free everywhere.
    #[serde(default = "default_max_distance")]
    pub max_distance_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CircularObstacle {
    pub fn new(centre_m: Point2<f64>, radius_m: f64) -> Self {
        Self { centre_m, radius_m }
    }

    /// Distance from the point to the edge of the obstacle, zero inside.
    pub fn distance_to(&self, point_m: &Point2<f64>) -> f64 {
        ((point_m - self.centre_m).norm() - self.radius_m).max(0.0)
    }
}

impl WallSegment {
    pub fn new(start_m: Point2<f64>, end_m: Point2<f64>) -> Self {
        Self { start_m, end_m }
    }

    /// Distance from the point to the closest point on the segment.
    pub fn distance_to(&self, point_m: &Point2<f64>) -> f64 {
        let seg = self.end_m - self.start_m;
        let len_sq = seg.norm_squared();

        if len_sq <= f64::EPSILON {
            return (point_m - self.start_m).norm();
        }

        let t = ((point_m - self.start_m).dot(&seg) / len_sq).clamp(0.0, 1.0);

        (point_m - (self.start_m + seg * t)).norm()
    }
}

impl Bounds {
    pub fn new(min_m: Point2<f64>, max_m: Point2<f64>) -> Self {
        Self { min_m, max_m }
    }

    /// Returns `true` if the point lies within the bounds (inclusive).
    pub fn contains(&self, point_m: &Point2<f64>) -> bool {
        point_m.x >= self.min_m.x
            && point_m.x <= self.max_m.x
            && point_m.y >= self.min_m.y
            && point_m.y <= self.max_m.y
    }
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self {
            circles: Vec::new(),
            walls: Vec::new(),
            bounds: None,
            max_distance_m: DEFAULT_MAX_DISTANCE_M,
        }
    }
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_circle(mut self, centre_m: Point2<f64>, radius_m: f64) -> Self {
        self.circles.push(CircularObstacle::new(centre_m, radius_m));
        self
    }

    pub fn with_wall(mut self, start_m: Point2<f64>, end_m: Point2<f64>) -> Self {
        self.walls.push(WallSegment::new(start_m, end_m));
        self
    }

    pub fn with_bounds(mut self, min_m: Point2<f64>, max_m: Point2<f64>) -> Self {
        self.bounds = Some(Bounds::new(min_m, max_m));
        self
    }

    pub fn with_max_distance(mut self, max_distance_m: f64) -> Self {
        self.max_distance_m = max_distance_m;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty() && self.walls.is_empty()
    }
}

impl ClearanceMap for ObstacleField {
    fn distance_to_obstacle(&self, point_m: &Point2<f64>) -> Result<f64, ClearanceError> {
        if let Some(ref bounds) = self.bounds {
            if !bounds.contains(point_m) {
                return Err(ClearanceError::OutsideMap(*point_m));
            }
        }

        let circle_dist = self.circles.iter().map(|c| c.distance_to(point_m));
        let wall_dist = self.walls.iter().map(|w| w.distance_to(point_m));

        Ok(circle_dist
            .chain(wall_dist)
            .fold(self.max_distance_m, f64::min))
    }
}

fn default_max_distance() -> f64 {
    DEFAULT_MAX_DISTANCE_M
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wall_distance() {
        let wall = WallSegment::new(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0));

        assert_eq!(wall.distance_to(&Point2::new(2.0, 3.0)), 3.0);
        assert_eq!(wall.distance_to(&Point2::new(-3.0, 4.0)), 5.0);
        assert_eq!(wall.distance_to(&Point2::new(7.0, -4.0)), 5.0);

        let degenerate = WallSegment::new(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0));
        assert_eq!(degenerate.distance_to(&Point2::new(4.0, 5.0)), 5.0);
    }

    #[test]
    fn test_field_distance() {
        let field = ObstacleField::new()
            .with_circle(Point2::new(5.0, 0.0), 1.5)
            .with_wall(Point2::new(-10.0, 3.0), Point2::new(10.0, 3.0));

        assert_eq!(field.distance_to_obstacle(&Point2::new(0.0, 0.0)), Ok(3.0));
        assert_eq!(field.distance_to_obstacle(&Point2::new(5.0, 2.5)), Ok(0.5));
        assert_eq!(field.distance_to_obstacle(&Point2::new(5.0, 0.5)), Ok(0.0));
        assert_eq!(field.distance_to_obstacle(&Point2::new(0.0, 5.0)), Ok(2.0));

        // Far from everything the clearance is clamped
        assert_eq!(field.distance_to_obstacle(&Point2::new(0.0, 30.0)), Ok(10.0));
        let field = field.with_max_distance(2.5);
        assert_eq!(field.distance_to_obstacle(&Point2::new(0.0, 0.0)), Ok(2.5));
        assert_eq!(field.distance_to_obstacle(&Point2::new(5.0, 2.5)), Ok(0.5));
    }

    #[test]
    fn test_empty_field() {
        let field = ObstacleField::new();

        assert!(field.is_empty());
        assert_eq!(
            field.distance_to_obstacle(&Point2::new(0.0, 0.0)),
            Ok(DEFAULT_MAX_DISTANCE_M)
        );
        assert_eq!(
            field.distance_to_obstacle(&Point2::new(-1e6, 1e6)),
            Ok(DEFAULT_MAX_DISTANCE_M)
        );

        // An empty field parsed from JSON gets the same clamp
        let parsed: ObstacleField = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, field);
    }

    #[test]
    fn test_field_errors() {

        let bounded = ObstacleField::new()
            .with_circle(Point2::new(0.0, 0.0), 1.0)
            .with_bounds(Point2::new(-5.0, -5.0), Point2::new(5.0, 5.0));

        assert_eq!(bounded.distance_to_obstacle(&Point2::new(5.0, 0.0)), Ok(4.0));
        assert_eq!(
            bounded.distance_to_obstacle(&Point2::new(5.1, 0.0)),
            Err(ClearanceError::OutsideMap(Point2::new(5.1, 0.0)))
        );
    }
}
