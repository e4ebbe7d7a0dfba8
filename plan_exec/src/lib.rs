//! # Planner library.
//!
//! Free-space corridor planning for a ground vehicle. Given a start, a goal, a reference route and
//! an obstacle distance field, the planner produces an ordered chain of overlapping circles which
//! together form a collision-free corridor from the start to the goal.
//!
//! The work is split into three stages, all driven by [`planner::CirclePlanner`]:
//! - the route-guided corridor builder, which walks the reference route placing one circle per
//!   sampled waypoint, sized by the local clearance,
//! - the gap repair pass, which finds consecutive circles that don't overlap enough,
//! - the circle tree search, which the repair pass uses to bridge each gap.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Circle model - the disks and corridors produced by the planner
pub mod circle;

/// Clearance module - obstacle distance fields and the adapter the planner queries them through
pub mod clearance;

/// Planner module - corridor building, gap repair and circle tree search
pub mod planner;

/// Scenario module - self contained planning problems loaded from file
pub mod scenario;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use circle::{Circle, CircleNode, Corridor};
pub use planner::{CancelToken, CirclePlanner, PlanReport, PlannerError, PlannerParams};
