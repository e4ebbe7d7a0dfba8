//! Route-guided corridor builder
//!
//! Places circles along the reference route, hopping forward by roughly one circle radius at a
//! time. The result is not necessarily continuous, gaps are left for the repair pass.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::route::RouteMsg;
use log::{debug, info, trace};
use nalgebra::Point2;

use super::{CirclePlanner, PlannerError, RouteStage};
use crate::{
    circle::Corridor,
    clearance::{Clearance, ClearanceMap},
};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<'m, M: ClearanceMap + ?Sized> CirclePlanner<'m, M> {
    /// Build a corridor from `start` towards `goal` by following `route`.
    ///
    /// The first circle is always the start circle. The builder stops once the last placed circle
    /// overlaps the goal circle, but the goal circle itself is not added.
    pub fn build_initial_corridor(
        &self,
        start: &Point2<f64>,
        goal: &Point2<f64>,
        route: &RouteMsg,
    ) -> Result<Corridor, PlannerError> {
        let connection = self.params.connection_overlap_factor;
        let half_width_m = self.vehicle.half_width_m();

        let goal_circle = self.clearance.circle_at(goal);
        let mut corridor = Corridor::new(vec![self.clearance.circle_at(start)]);

        let mut index = find_closest_route_index(route, start)?;
        let mut current = self.clearance.circle_at_pose(&route.poses[index]);

        debug!(
            "Closest route index to start is {} of {}, clearance {:.3} m",
            index,
            route.len(),
            current.radius_m
        );

        while !current.overlaps(&goal_circle, connection) {
            index = find_next_route_index(route, current.radius_m.powi(2), index)?;
            current = self.clearance.circle_at_pose(&route.poses[index]);

            if current.radius_m <= half_width_m {
                trace!(
                    "Route index {} has clearance {:.3} m, scanning for free pose",
                    index,
                    current.radius_m
                );

                index = find_next_free_route_index(route, &self.clearance, half_width_m, index)?;
                current = self.clearance.circle_at_pose(&route.poses[index]);
            }

            trace!(
                "Placed circle {} at route index {}, ({:.2}, {:.2}) r = {:.3}",
                corridor.len(),
                index,
                current.centre_m.x,
                current.centre_m.y,
                current.radius_m
            );

            corridor.push(current);
        }

        info!(
            "Initial corridor has {} circles, {} gap(s)",
            corridor.len(),
            corridor.gaps(connection).len()
        );

        Ok(corridor)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Find the route index at which the route is closest to `point_m`.
///
/// Scans forward from the start of the route while the distance to the point doesn't increase,
/// stopping at the first local minimum. Routes which approach the point more than once therefore
/// return their first approach.
pub fn find_closest_route_index(
    route: &RouteMsg,
    point_m: &Point2<f64>,
) -> Result<usize, PlannerError> {
    let dist_sq = |i: usize| (route.poses[i].position_m() - point_m).norm_squared();

    if route.is_empty() {
        return Err(PlannerError::EmptyRoute);
    }

    let mut index = 0;
    while index + 1 < route.len() && dist_sq(index + 1) <= dist_sq(index) {
        index += 1;
    }

    Ok(index)
}

/// Find the last route index after `current` which is still closer than `sqrt(radius_sq)` to the
/// pose at `current`.
///
/// At least one index of progress is always made. If the route ends inside the radius the last
/// index is returned, if `current` is already the last index the route is exhausted.
pub fn find_next_route_index(
    route: &RouteMsg,
    radius_sq: f64,
    current: usize,
) -> Result<usize, PlannerError> {
    if current + 1 >= route.len() {
        return Err(PlannerError::RouteExhausted {
            stage: RouteStage::RadiusHop,
            index: current,
        });
    }

    let origin = route.poses[current].position_m();

    let mut next = current + 1;
    while next < route.len() && (route.poses[next].position_m() - origin).norm_squared() < radius_sq
    {
        next += 1;
    }

    // `next` is now the first index outside the radius, step back inside it
    Ok((next - 1).max(current + 1))
}

/// Find the first route index after `current` whose clearance is greater than `half_width_m`.
pub fn find_next_free_route_index<M: ClearanceMap + ?Sized>(
    route: &RouteMsg,
    clearance: &Clearance<'_, M>,
    half_width_m: f64,
    current: usize,
) -> Result<usize, PlannerError> {
    route
        .poses
        .iter()
        .enumerate()
        .skip(current + 1)
        .find(|(_, pose)| clearance.at_pose(pose) > half_width_m)
        .map(|(i, _)| i)
        .ok_or(PlannerError::RouteExhausted {
            stage: RouteStage::FreeScan,
            index: route.len().saturating_sub(1),
        })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        clearance::{ClearanceError, ObstacleField},
        planner::PlannerParams,
    };
    use comms_if::{route::RoutePose, veh::VehicleConfig};

    fn route(points: &[(f64, f64)]) -> RouteMsg {
        RouteMsg::new(
            points
                .iter()
                .map(|&(x, y)| RoutePose::new(x, y, 0.0))
                .collect(),
        )
    }

    fn line_route(n: usize, step_m: f64) -> RouteMsg {
        RouteMsg::new(
            (0..n)
                .map(|i| RoutePose::new(i as f64 * step_m, 0.0, 0.0))
                .collect(),
        )
    }

    #[test]
    fn test_closest_index() {
        let r = route(&[(-3.0, 0.0), (-2.0, 0.0), (-1.0, 0.0), (0.5, 0.0), (2.0, 0.0)]);
        assert_eq!(find_closest_route_index(&r, &Point2::new(0.0, 0.0)), Ok(3));
        assert_eq!(find_closest_route_index(&r, &Point2::new(-5.0, 0.0)), Ok(0));
        assert_eq!(find_closest_route_index(&r, &Point2::new(9.0, 1.0)), Ok(4));

        // First local minimum wins over a closer later approach
        let r = route(&[(0.0, 1.0), (1.0, 2.0), (0.0, 0.1)]);
        assert_eq!(find_closest_route_index(&r, &Point2::new(0.0, 0.0)), Ok(0));

        assert_eq!(
            find_closest_route_index(&RouteMsg::default(), &Point2::new(0.0, 0.0)),
            Err(PlannerError::EmptyRoute)
        );
    }

    #[test]
    fn test_next_index() {
        let r = line_route(11, 1.0);

        // Poses at 1, 2 and 3 m are inside a 3.5 m radius
        assert_eq!(find_next_route_index(&r, 3.5 * 3.5, 0), Ok(3));
        assert_eq!(find_next_route_index(&r, 3.5 * 3.5, 4), Ok(7));

        // Always progresses by at least one
        assert_eq!(find_next_route_index(&r, 0.25, 2), Ok(3));
        assert_eq!(find_next_route_index(&r, 0.0, 9), Ok(10));

        // Stops at the end of the route
        assert_eq!(find_next_route_index(&r, 100.0, 8), Ok(10));
        assert_eq!(
            find_next_route_index(&r, 100.0, 10),
            Err(PlannerError::RouteExhausted {
                stage: RouteStage::RadiusHop,
                index: 10
            })
        );
    }

    #[test]
    fn test_next_free_index() {
        let r = line_route(11, 1.0);
        let map = |p: &Point2<f64>| -> Result<f64, ClearanceError> {
            if p.x > 2.5 && p.x < 6.5 {
                Ok(0.2)
            } else {
                Ok(2.0)
            }
        };
        let clearance = Clearance::new(&map);

        assert_eq!(find_next_free_route_index(&r, &clearance, 0.5, 0), Ok(1));
        assert_eq!(find_next_free_route_index(&r, &clearance, 0.5, 3), Ok(7));
        assert_eq!(
            find_next_free_route_index(&r, &clearance, 5.0, 0),
            Err(PlannerError::RouteExhausted {
                stage: RouteStage::FreeScan,
                index: 10
            })
        );
    }

    #[test]
    fn test_build_straight() {
        let map = |p: &Point2<f64>| -> Result<f64, ClearanceError> { Ok(3.0 - p.y.abs()) };
        let planner = CirclePlanner::new(PlannerParams::default(), VehicleConfig::new(1.0), &map);
        let r = line_route(201, 0.1);

        let corridor = planner
            .build_initial_corridor(&Point2::new(0.0, 0.0), &Point2::new(20.0, 0.0), &r)
            .unwrap();

        assert_eq!(corridor.first().unwrap().centre_m, Point2::new(0.0, 0.0));
        assert!(corridor.is_continuous(1.0));
        assert!(corridor.len() >= 4);

        let goal = planner.clearance().circle_at(&Point2::new(20.0, 0.0));
        assert!(corridor.last().unwrap().overlaps(&goal, 1.0));
        assert!(corridor.iter().all(|c| c.radius_m == 3.0));
    }

    #[test]
    fn test_build_skips_blocked_section() {
        let field = ObstacleField::new().with_circle(Point2::new(10.0, 0.0), 1.5);
        let planner =
            CirclePlanner::new(PlannerParams::default(), VehicleConfig::new(1.0), &field);
        let r = line_route(201, 0.1);

        let corridor = planner
            .build_initial_corridor(&Point2::new(0.0, 0.0), &Point2::new(20.0, 0.0), &r)
            .unwrap();

        // No circle is placed inside the blocked section, leaving a gap around it
        assert!(corridor.iter().all(|c| c.radius_m > 0.5));
        assert!(corridor
            .iter()
            .all(|c| (c.centre_m - Point2::new(10.0, 0.0)).norm() > 2.0 - 1e-9));
        assert!(!corridor.gaps(1.0).is_empty());
    }

    #[test]
    fn test_build_route_too_short() {
        let map = |_: &Point2<f64>| -> Result<f64, ClearanceError> { Ok(1.0) };
        let planner = CirclePlanner::new(PlannerParams::default(), VehicleConfig::new(1.0), &map);
        let r = line_route(6, 1.0);

        assert!(matches!(
            planner.build_initial_corridor(&Point2::new(0.0, 0.0), &Point2::new(20.0, 0.0), &r),
            Err(PlannerError::RouteExhausted {
                stage: RouteStage::RadiusHop,
                ..
            })
        ));
    }
}
