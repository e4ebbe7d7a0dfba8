//! # Distance Map
//!
//! A grid where each cell holds the distance from its centre to the centre of the nearest occupied
//! cell. The map is computed once from an occupancy grid using the exact squared Euclidean distance
//! transform of Felzenszwalb and Huttenlocher, applied along the X axis then the Y axis, so a
//! query is a single cell lookup.
//!
//! Cell `[0, 0]` is the cell whose lower left corner sits at `origin_m`, X indices increase along
//! the +ve X axis and Y indices along the +ve Y axis.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use nalgebra::{Point2, Vector2};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{ClearanceError, ClearanceMap};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Stand-in for infinity in the transform, large but finite so that the parabola intersections
/// stay well defined.
const FAR: f64 = 1e20;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMapParams {
    /// Side length of each (square) cell in meters
    pub cell_size_m: f64,

    /// Number of cells along each axis
    pub num_cells: Vector2<usize>,

    /// Position of the lower left corner of cell `[0, 0]`
    pub origin_m: Point2<f64>,

    /// Distances are clamped to this value, which is also the value of every cell when the grid
    /// has no occupied cells.
    pub max_distance_m: f64,
}

/// Precomputed obstacle distance field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMap {
    params: DistanceMapParams,

    /// Distance to the nearest obstacle for each cell, indexed `[x, y]`
    data: Array2<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DistanceMapError {
    #[error("Occupancy grid has shape {0:?} but the map expects {1:?}")]
    ShapeMismatch((usize, usize), (usize, usize)),

    #[error("Cell size must be positive, got {0}")]
    InvalidCellSize(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DistanceMap {
    /// Compute the distance map from an occupancy grid indexed `[x, y]`, where `true` marks an
    /// occupied cell.
    pub fn from_occupancy(
        params: DistanceMapParams,
        occupied: &Array2<bool>,
    ) -> Result<Self, DistanceMapError> {
        if !(params.cell_size_m > 0.0) {
            return Err(DistanceMapError::InvalidCellSize(params.cell_size_m));
        }

        let shape = (params.num_cells.x, params.num_cells.y);
        if occupied.dim() != shape {
            return Err(DistanceMapError::ShapeMismatch(occupied.dim(), shape));
        }

        let mut sq_dist = occupied.mapv(|o| if o { 0.0 } else { FAR });

        // Transform each column (constant y, varying x), then each row of the result
        let mut scratch = Scratch::new(shape.0.max(shape.1));
        for mut lane in sq_dist.columns_mut() {
            let input = lane.to_vec();
            scratch.transform(&input);
            lane.iter_mut()
                .zip(scratch.output.iter())
                .for_each(|(d, &o)| *d = o);
        }
        for mut lane in sq_dist.rows_mut() {
            let input = lane.to_vec();
            scratch.transform(&input);
            lane.iter_mut()
                .zip(scratch.output.iter())
                .for_each(|(d, &o)| *d = o);
        }

        let cell_size_m = params.cell_size_m;
        let max_distance_m = params.max_distance_m;
        let data = sq_dist.mapv(|d| (d.sqrt() * cell_size_m).min(max_distance_m));

        debug!(
            "Computed {}x{} distance map, {} occupied cells",
            shape.0,
            shape.1,
            occupied.iter().filter(|&&o| o).count()
        );

        Ok(Self { params, data })
    }

    /// Compute the distance map by testing the centre of every cell with `is_occupied`.
    pub fn from_fn<F>(params: DistanceMapParams, is_occupied: F) -> Result<Self, DistanceMapError>
    where
        F: Fn(&Point2<f64>) -> bool,
    {
        if !(params.cell_size_m > 0.0) {
            return Err(DistanceMapError::InvalidCellSize(params.cell_size_m));
        }

        let occupied = Array2::from_shape_fn((params.num_cells.x, params.num_cells.y), |idx| {
            is_occupied(&cell_centre(&params, idx))
        });

        Self::from_occupancy(params, &occupied)
    }

    pub fn params(&self) -> &DistanceMapParams {
        &self.params
    }

    /// Index of the cell containing `point_m`, or `None` if outside the map.
    pub fn index(&self, point_m: &Point2<f64>) -> Option<(usize, usize)> {
        let rel = (point_m - self.params.origin_m) / self.params.cell_size_m;

        if !(rel.x >= 0.0 && rel.y >= 0.0) {
            return None;
        }

        let idx = (rel.x.floor() as usize, rel.y.floor() as usize);

        if idx.0 < self.params.num_cells.x && idx.1 < self.params.num_cells.y {
            Some(idx)
        } else {
            None
        }
    }

    /// Centre of the cell at `idx`.
    pub fn cell_centre(&self, idx: (usize, usize)) -> Point2<f64> {
        cell_centre(&self.params, idx)
    }

    /// Distance stored in the cell containing `point_m`.
    pub fn get(&self, point_m: &Point2<f64>) -> Option<f64> {
        self.index(point_m).map(|idx| self.data[idx])
    }
}

impl ClearanceMap for DistanceMap {
    fn distance_to_obstacle(&self, point_m: &Point2<f64>) -> Result<f64, ClearanceError> {
        self.get(point_m).ok_or(ClearanceError::OutsideMap(*point_m))
    }
}

/// Buffers for the 1D transform, reused between lanes.
struct Scratch {
    /// Locations of the parabolas in the lower envelope
    v: Vec<usize>,

    /// Boundaries between the parabolas
    z: Vec<f64>,

    output: Vec<f64>,
}

impl Scratch {
    fn new(max_len: usize) -> Self {
        Self {
            v: vec![0; max_len],
            z: vec![0.0; max_len + 1],
            output: Vec::with_capacity(max_len),
        }
    }

    /// 1D squared distance transform of `f`, written into `self.output`.
    fn transform(&mut self, f: &[f64]) {
        let n = f.len();
        self.output.clear();

        if n == 0 {
            return;
        }

        let intersect = |q: usize, p: usize| -> f64 {
            let (qf, pf) = (q as f64, p as f64);
            ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
        };

        let mut k = 0;
        self.v[0] = 0;
        self.z[0] = f64::NEG_INFINITY;
        self.z[1] = f64::INFINITY;

        for q in 1..n {
            let mut s = intersect(q, self.v[k]);
            while s <= self.z[k] {
                k -= 1;
                s = intersect(q, self.v[k]);
            }
            k += 1;
            self.v[k] = q;
            self.z[k] = s;
            self.z[k + 1] = f64::INFINITY;
        }

        k = 0;
        for q in 0..n {
            while self.z[k + 1] < q as f64 {
                k += 1;
            }
            let dq = q as f64 - self.v[k] as f64;
            self.output.push(dq * dq + f[self.v[k]]);
        }
    }
}

fn cell_centre(params: &DistanceMapParams, idx: (usize, usize)) -> Point2<f64> {
    params.origin_m
        + Vector2::new(idx.0 as f64 + 0.5, idx.1 as f64 + 0.5) * params.cell_size_m
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
