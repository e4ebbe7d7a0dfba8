//! # Circle Planner
//!
//! Plans a corridor of overlapping circles from a start to a goal. Planning happens in two passes:
//!
//! 1. [`CirclePlanner::build_initial_corridor`] walks the reference route, hopping from circle to
//!    circle and skipping over route sections which are too narrow for the vehicle.
//! 2. [`CirclePlanner::repair_gaps`] finds consecutive circles which don't overlap and bridges each
//!    gap with a best-first search over a tree of circles,
//!    [`CirclePlanner::search_corridor`].
//!
//! [`CirclePlanner::plan`] runs both passes and returns a [`PlanReport`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod cancel;
mod corridor;
mod params;
mod repair;
mod search;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fmt, time::Instant};

use comms_if::{route::RouteMsg, veh::VehicleConfig};
use log::{info, warn};
use nalgebra::Point2;
use serde::Serialize;

use crate::{
    circle::Corridor,
    clearance::{Clearance, ClearanceMap},
};

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use cancel::CancelToken;
pub use corridor::{find_closest_route_index, find_next_free_route_index, find_next_route_index};
pub use params::PlannerParams;
pub use repair::{RepairReport, UnresolvedGap};
pub use search::SearchStats;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Plans circle corridors through a clearance map.
///
/// The planner only borrows the map, so many planners can share one map.
pub struct CirclePlanner<'m, M: ?Sized> {
    params: PlannerParams,

    vehicle: VehicleConfig,

    clearance: Clearance<'m, M>,

    cancel: Option<CancelToken>,
}

/// Outcome of a full planning run.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    /// The final corridor, starting at the start position and ending with the goal circle
    pub corridor: Corridor,

    /// Gaps the repair pass could not bridge
    pub unresolved: Vec<UnresolvedGap>,

    /// Number of circles placed by the corridor builder, not including the goal circle
    pub num_initial_circles: usize,

    /// Number of gaps bridged by the repair pass
    pub num_repaired: usize,

    /// Totals over every search run by the repair pass
    pub search_stats: SearchStats,

    /// Wall clock time taken to plan
    pub duration_ms: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlannerError {
    #[error("No path found from the circle at {0} to the circle at {1}")]
    NoPathFound(Point2<f64>, Point2<f64>),

    #[error("The reference route contains no poses")]
    EmptyRoute,

    #[error("Reached the end of the reference route at index {index} while {stage}")]
    RouteExhausted { stage: RouteStage, index: usize },

    #[error("Planning was cancelled")]
    Cancelled,

    #[error("Search exceeded the limit of {0} iterations")]
    IterationLimitReached(usize),

    #[error("Invalid planner parameters: {0}")]
    InvalidParams(String),
}

/// Which scan of the route ran off its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStage {
    /// Hopping to the first pose outside the current circle
    RadiusHop,

    /// Looking for a pose with enough clearance for the vehicle
    FreeScan,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<'m, M: ClearanceMap + ?Sized> CirclePlanner<'m, M> {
    pub fn new(params: PlannerParams, vehicle: VehicleConfig, map: &'m M) -> Self {
        Self {
            params,
            vehicle,
            clearance: Clearance::new(map),
            cancel: None,
        }
    }

    /// Attach a token which can be used to cancel planning from another thread.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn params(&self) -> &PlannerParams {
        &self.params
    }

    pub fn vehicle(&self) -> &VehicleConfig {
        &self.vehicle
    }

    pub fn clearance(&self) -> Clearance<'m, M> {
        self.clearance
    }

    /// Plan a corridor from `start` to `goal` following `route`.
    ///
    /// The corridor builder runs first, then the goal circle is appended to its corridor and every
    /// gap is repaired. Gaps which cannot be bridged are listed in the report rather than failing
    /// the plan.
    pub fn plan(
        &self,
        start: &Point2<f64>,
        goal: &Point2<f64>,
        route: &RouteMsg,
    ) -> Result<PlanReport, PlannerError> {
        let start_time = Instant::now();

        info!(
            "Planning from ({:.2}, {:.2}) to ({:.2}, {:.2}) along a {} pose route",
            start.x,
            start.y,
            goal.x,
            goal.y,
            route.len()
        );

        let mut corridor = self.build_initial_corridor(start, goal, route)?;
        let num_initial_circles = corridor.len();

        corridor.push(self.clearance.circle_at(goal));

        let repair = self.repair_gaps(corridor)?;

        let report = PlanReport {
            num_initial_circles,
            num_repaired: repair.num_repaired,
            search_stats: repair.search_stats,
            duration_ms: util::time::std_duration_to_millis(start_time.elapsed()),
            unresolved: repair.unresolved,
            corridor: repair.corridor,
        };

        if report.is_complete() {
            info!(
                "Planned a {} circle corridor in {:.1} ms",
                report.corridor.len(),
                report.duration_ms
            );
        } else {
            warn!(
                "Planned a {} circle corridor in {:.1} ms with {} unresolved gap(s)",
                report.corridor.len(),
                report.duration_ms,
                report.unresolved.len()
            );
        }

        Ok(report)
    }

    /// Returns an error if cancellation has been requested.
    fn check_cancelled(&self) -> Result<(), PlannerError> {
        match self.cancel {
            Some(ref token) if token.is_cancelled() => Err(PlannerError::Cancelled),
            _ => Ok(()),
        }
    }
}

impl PlanReport {
    /// Returns `true` if every gap in the corridor was bridged.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

impl fmt::Display for RouteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteStage::RadiusHop => write!(f, "hopping out of the current circle"),
            RouteStage::FreeScan => write!(f, "searching for a pose with enough clearance"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        clearance::{ClearanceError, ObstacleField, DEFAULT_MAX_DISTANCE_M},
        scenario::Scenario,
    };
    use comms_if::route::RoutePose;

    fn vehicle() -> VehicleConfig {
        VehicleConfig::new(1.0)
    }

    fn corridor_walls(p: &Point2<f64>) -> Result<f64, ClearanceError> {
        Ok(3.0 - p.y.abs())
    }

    fn straight_route(length_m: f64, step_m: f64) -> RouteMsg {
        let n = (length_m / step_m).round() as usize;
        RouteMsg::new(
            (0..=n)
                .map(|i| RoutePose::new(i as f64 * step_m, 0.0, 0.0))
                .collect(),
        )
    }

    #[test]
    fn test_plan_straight() {
        let map = corridor_walls;
        let planner = CirclePlanner::new(PlannerParams::default(), vehicle(), &map);
        let route = straight_route(20.0, 0.1);

        let report = planner
            .plan(&Point2::new(0.0, 0.0), &Point2::new(20.0, 0.0), &route)
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.num_repaired, 0);
        assert_eq!(report.corridor.first().unwrap().centre_m, Point2::new(0.0, 0.0));
        assert_eq!(report.corridor.last().unwrap().centre_m, Point2::new(20.0, 0.0));
        assert_eq!(report.corridor.len(), report.num_initial_circles + 1);
        assert!(report
            .corridor
            .is_continuous(planner.params().connection_overlap_factor));
    }

    #[test]
    fn test_plan_around_obstacle() {
        // A route straight through an obstacle which is too narrow to pass through, so the
        // builder skips over it and the repair pass finds a way around.
        let field = ObstacleField::new()
            .with_circle(Point2::new(10.0, 0.0), 1.5)
            .with_wall(Point2::new(-5.0, 6.0), Point2::new(25.0, 6.0))
            .with_wall(Point2::new(-5.0, -6.0), Point2::new(25.0, -6.0));
        let planner = CirclePlanner::new(PlannerParams::default(), vehicle(), &field);
        let route = straight_route(20.0, 0.1);

        let report = planner
            .plan(&Point2::new(0.0, 0.0), &Point2::new(20.0, 0.0), &route)
            .unwrap();

        assert!(report.is_complete());
        assert!(report.num_repaired >= 1);
        assert!(report
            .corridor
            .is_continuous(planner.params().connection_overlap_factor));

        for circle in report.corridor.iter() {
            assert!(circle.radius_m > planner.vehicle().half_width_m());
            assert!((circle.centre_m - Point2::new(10.0, 0.0)).norm() > 1.5);
        }
    }

    #[test]
    fn test_plan_obstacle_free_scenario() {
        let scenario = Scenario::from_json_str(
            r#"{
                "start_m": [0.0, 0.0],
                "goal_m": [20.0, 0.0],
                "vehicle": { "width_m": 1.0 }
            }"#,
        )
        .unwrap();
        let planner =
            CirclePlanner::new(PlannerParams::default(), scenario.vehicle, &scenario.field);

        let report = planner
            .plan(&scenario.start_m, &scenario.goal_m, &scenario.route)
            .unwrap();

        // Every circle is at the field's clearance limit, so one hop reaches the goal
        assert!(report.is_complete());
        assert_eq!(report.num_repaired, 0);
        assert_eq!(report.num_initial_circles, 2);
        assert_eq!(report.corridor.len(), 3);
        assert_eq!(report.search_stats, SearchStats::default());
        assert!(report
            .corridor
            .iter()
            .all(|c| c.radius_m == DEFAULT_MAX_DISTANCE_M));
    }

    #[test]
    fn test_plan_empty_route() {
        let map = corridor_walls;
        let planner = CirclePlanner::new(PlannerParams::default(), vehicle(), &map);

        assert_eq!(
            planner
                .plan(
                    &Point2::new(0.0, 0.0),
                    &Point2::new(5.0, 0.0),
                    &RouteMsg::default()
                )
                .unwrap_err(),
            PlannerError::EmptyRoute
        );
    }

    #[test]
    fn test_plan_cancelled() {
        // Gap in the route forces a search, which sees the cancelled token
        let field = ObstacleField::new().with_circle(Point2::new(10.0, 0.0), 1.5);
        let token = CancelToken::new();
        let planner = CirclePlanner::new(PlannerParams::default(), vehicle(), &field)
            .with_cancel_token(token.clone());
        let route = straight_route(20.0, 0.1);

        token.cancel();

        assert_eq!(
            planner
                .plan(&Point2::new(0.0, 0.0), &Point2::new(20.0, 0.0), &route)
                .unwrap_err(),
            PlannerError::Cancelled
        );
    }
}
