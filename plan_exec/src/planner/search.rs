//! Best-first search over a tree of circles
//!
//! Each circle is expanded by sampling points evenly around its boundary and placing a child
//! circle at every point with enough clearance for the vehicle. The cost of stepping from a parent
//! to a child is the parent's radius, and the heuristic is the straight line distance from the
//! child to the goal's centre.
//!
//! Nodes live in an arena and refer to their parents by index. Only the accepted path is copied out
//! of the arena when the search finishes.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    f64::consts::TAU,
    ops::AddAssign,
};

use log::{debug, trace};
use nalgebra::Vector2;
use ordered_float::OrderedFloat;
use serde::Serialize;

use super::{CirclePlanner, PlannerError};
use crate::{
    circle::{Circle, CircleNode},
    clearance::ClearanceMap,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Counters describing the work done by one or more searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Number of nodes popped from the open set
    pub iterations: usize,

    /// Number of nodes expanded and moved to the closed set
    pub expanded: usize,

    /// Number of popped nodes discarded as duplicates of explored nodes
    pub pruned: usize,

    /// Number of child nodes created
    pub created: usize,
}

/// Index of a node in the search arena.
type NodeId = usize;

/// Index of the start node, which is always the first node in the arena.
const ROOT: NodeId = 0;

struct TreeNode {
    node: CircleNode,
    parent: Option<NodeId>,
}

/// Arena owning every node created during a search.
struct SearchTree {
    nodes: Vec<TreeNode>,
}

/// Entry in the open set.
#[derive(Debug, PartialEq, Eq)]
struct OpenEntry {
    f: OrderedFloat<f64>,
    id: NodeId,
}

/// Best known connection to the goal.
struct GoalLink {
    cost: f64,
    parent: NodeId,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<'m, M: ClearanceMap + ?Sized> CirclePlanner<'m, M> {
    /// Search for a chain of overlapping circles from `start` to `goal`.
    ///
    /// The returned path begins with the start circle and ends with the goal circle. Every node
    /// but the goal has `g` equal to its parent's `g` plus its parent's radius. The goal takes the
    /// estimated cost of the node it was linked through.
    pub fn search_corridor(
        &self,
        start: Circle,
        goal: Circle,
    ) -> Result<Vec<CircleNode>, PlannerError> {
        let mut stats = SearchStats::default();
        self.search_corridor_with_stats(start, goal, &mut stats)
    }

    /// As [`CirclePlanner::search_corridor`], adding the work done to `stats`.
    pub fn search_corridor_with_stats(
        &self,
        start: Circle,
        goal: Circle,
        stats: &mut SearchStats,
    ) -> Result<Vec<CircleNode>, PlannerError> {
        let connection = self.params.connection_overlap_factor;

        let start_f = start.centre_dist_m(&goal);
        let mut tree = SearchTree::new(CircleNode::new(start, 0.0, start_f));

        let mut open = BinaryHeap::new();
        open.push(OpenEntry::new(start_f, ROOT));

        let mut closed: Vec<NodeId> = Vec::new();
        let mut goal_link: Option<GoalLink> = None;
        let mut search = SearchStats::default();

        let result = loop {
            self.check_cancelled()?;

            let entry = match open.pop() {
                Some(e) => e,
                None => break goal_link,
            };

            search.iterations += 1;
            if let Some(max) = self.params.max_search_iterations {
                if search.iterations > max {
                    *stats += search;
                    return Err(PlannerError::IterationLimitReached(max));
                }
            }

            let current = tree.get(entry.id).node;

            // Nothing left in the open set can improve on the goal
            if goal_link.as_ref().map_or(false, |link| link.cost < current.f) {
                break goal_link;
            }

            if self.is_explored(&tree, &closed, &current.circle) {
                search.pruned += 1;
                continue;
            }

            for child in self.expand(&current, &goal) {
                let id = tree.insert(child, entry.id);
                open.push(OpenEntry::new(child.f, id));
                search.created += 1;
            }

            if current.circle.overlaps(&goal, connection)
                && goal_link.as_ref().map_or(true, |link| current.f < link.cost)
            {
                trace!(
                    "Linked goal through node {} with cost {:.3}",
                    entry.id,
                    current.f
                );
                goal_link = Some(GoalLink {
                    cost: current.f,
                    parent: entry.id,
                });
            }

            closed.push(entry.id);
            search.expanded += 1;
        };

        debug!(
            "Search finished after {} iterations: {} expanded, {} pruned, {} created",
            search.iterations, search.expanded, search.pruned, search.created
        );
        *stats += search;

        match result {
            Some(link) => {
                let mut path = tree.path_to(link.parent);
                path.push(CircleNode::new(goal, link.cost, link.cost));
                Ok(path)
            }
            None => Err(PlannerError::NoPathFound(start.centre_m, goal.centre_m)),
        }
    }

    /// Returns `true` if `circle` lies close enough to an already expanded circle that it covers
    /// no new ground.
    fn is_explored(&self, tree: &SearchTree, closed: &[NodeId], circle: &Circle) -> bool {
        let duplicate = self.params.duplicate_overlap_factor;

        closed
            .iter()
            .any(|&id| tree.get(id).node.circle.overlaps(circle, duplicate))
    }

    /// Sample children evenly around the boundary of `parent`, keeping those wide enough for the
    /// vehicle.
    fn expand(&self, parent: &CircleNode, goal: &Circle) -> Vec<CircleNode> {
        let num_children = parent
            .circle
            .num_expansion_children(self.params.expansion_density_per_m);

        if num_children == 0 {
            trace!(
                "Circle at ({:.2}, {:.2}) r = {:.3} is too small to expand",
                parent.circle.centre_m.x,
                parent.circle.centre_m.y,
                parent.circle.radius_m
            );
            return Vec::new();
        }

        let half_width_m = self.vehicle.half_width_m();
        let step_rad = TAU / num_children as f64;
        let parent_radius_m = parent.circle.radius_m;
        let g = parent.g + parent_radius_m;

        (0..num_children)
            .filter_map(|i| {
                let angle_rad = step_rad * i as f64;
                let centre_m = parent.circle.centre_m
                    + Vector2::new(angle_rad.cos(), angle_rad.sin()) * parent_radius_m;

                let clearance_m = self.clearance.at(&centre_m);
                if clearance_m > half_width_m {
                    let h = (centre_m - goal.centre_m).norm();
                    Some(CircleNode::new(Circle::new(centre_m, clearance_m), g, g + h))
                } else {
                    None
                }
            })
            .collect()
    }
}

impl SearchTree {
    fn new(root: CircleNode) -> Self {
        Self {
            nodes: vec![TreeNode {
                node: root,
                parent: None,
            }],
        }
    }

    fn insert(&mut self, node: CircleNode, parent: NodeId) -> NodeId {
        self.nodes.push(TreeNode {
            node,
            parent: Some(parent),
        });
        self.nodes.len() - 1
    }

    fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    /// Nodes from the root to `id`, inclusive.
    fn path_to(&self, id: NodeId) -> Vec<CircleNode> {
        let mut path = Vec::new();
        let mut next = Some(id);

        while let Some(id) = next {
            let tree_node = self.get(id);
            path.push(tree_node.node);
            next = tree_node.parent;
        }

        path.reverse();
        path
    }
}

impl OpenEntry {
    fn new(f: f64, id: NodeId) -> Self {
        Self {
            f: OrderedFloat(f),
            id,
        }
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flipped so the heap pops the lowest cost first, ties go to the oldest node
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, other: Self) {
        self.iterations += other.iterations;
        self.expanded += other.expanded;
        self.pruned += other.pruned;
        self.created += other.created;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
