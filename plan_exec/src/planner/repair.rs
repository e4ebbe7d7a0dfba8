//! Gap repair pass

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, warn};
use serde::Serialize;

use super::{CirclePlanner, PlannerError, SearchStats};
use crate::{
    circle::{Circle, Corridor},
    clearance::ClearanceMap,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A gap between two consecutive circles which the search couldn't bridge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnresolvedGap {
    /// Index of `from` in the repaired corridor, `to` is at `index + 1`.
    pub index: usize,

    pub from: Circle,

    pub to: Circle,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepairReport {
    pub corridor: Corridor,

    pub unresolved: Vec<UnresolvedGap>,

    pub num_repaired: usize,

    pub search_stats: SearchStats,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<'m, M: ClearanceMap + ?Sized> CirclePlanner<'m, M> {
    /// Bridge every gap in `corridor` using the circle search.
    ///
    /// Gaps are found between consecutive circles of the input corridor, bridging circles are
    /// inserted between the pair. A gap which has no path across it is recorded in the report and
    /// left in place. Cancellation or hitting the iteration limit stops the whole pass.
    pub fn repair_gaps(&self, corridor: Corridor) -> Result<RepairReport, PlannerError> {
        let connection = self.params.connection_overlap_factor;

        let mut report = RepairReport {
            corridor: Corridor::new(Vec::with_capacity(corridor.len())),
            unresolved: Vec::new(),
            num_repaired: 0,
            search_stats: SearchStats::default(),
        };

        let mut circles = corridor.circles.into_iter();
        let mut previous = match circles.next() {
            Some(c) => c,
            None => return Ok(report),
        };
        report.corridor.push(previous);

        for next in circles {
            if !previous.overlaps(&next, connection) {
                debug!(
                    "Gap after circle {}, {:.2} m between centres",
                    report.corridor.len() - 1,
                    previous.centre_dist_m(&next)
                );

                match self.search_corridor_with_stats(previous, next, &mut report.search_stats) {
                    Ok(bridge) => {
                        // The endpoints are already in the corridor
                        let num_interior = bridge.len().saturating_sub(2);
                        report.corridor.circles.extend(
                            bridge
                                .into_iter()
                                .skip(1)
                                .take(num_interior)
                                .map(|n| n.circle),
                        );
                        report.num_repaired += 1;
                    }
                    Err(PlannerError::NoPathFound(..)) => {
                        warn!(
                            "Could not bridge gap between ({:.2}, {:.2}) and ({:.2}, {:.2})",
                            previous.centre_m.x,
                            previous.centre_m.y,
                            next.centre_m.x,
                            next.centre_m.y
                        );
                        report.unresolved.push(UnresolvedGap {
                            index: report.corridor.len() - 1,
                            from: previous,
                            to: next,
                        });
                    }
                    Err(e) => return Err(e),
                }
            }

            report.corridor.push(next);
            previous = next;
        }

        info!(
            "Repaired {} gap(s), {} unresolved, corridor now {} circles",
            report.num_repaired,
            report.unresolved.len(),
            report.corridor.len()
        );

        Ok(report)
    }
}

impl RepairReport {
    /// Returns `true` if no gaps were left unresolved.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
