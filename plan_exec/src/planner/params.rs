//! Parameters for the circle planner

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::PlannerError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerParams {
    /// Overlap factor used to decide whether two circles are connected, i.e. whether the vehicle
    /// can pass from one into the other. Used for gap detection, for the corridor builder's stop
    /// condition, and for linking search circles to the goal.
    pub connection_overlap_factor: f64,

    /// Overlap factor used to decide whether a circle popped by the search covers a region which
    /// has already been explored, in which case it is discarded. Must be tighter (smaller) than
    /// the connection factor.
    pub duplicate_overlap_factor: f64,

    /// Number of children sampled per meter of parent radius when expanding a circle.
    #[serde(default = "default_expansion_density")]
    pub expansion_density_per_m: f64,

    /// Maximum number of loop iterations of a single search, unbounded if not set.
    #[serde(default)]
    pub max_search_iterations: Option<usize>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            connection_overlap_factor: 1.0,
            duplicate_overlap_factor: 0.25,
            expansion_density_per_m: default_expansion_density(),
            max_search_iterations: None,
        }
    }
}

impl PlannerParams {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if !(self.duplicate_overlap_factor > 0.0) {
            return Err(PlannerError::InvalidParams(format!(
                "duplicate_overlap_factor must be positive, got {}",
                self.duplicate_overlap_factor
            )));
        }

        if !(self.connection_overlap_factor > self.duplicate_overlap_factor) {
            return Err(PlannerError::InvalidParams(format!(
                "connection_overlap_factor ({}) must be greater than duplicate_overlap_factor ({})",
                self.connection_overlap_factor, self.duplicate_overlap_factor
            )));
        }

        if !(self.expansion_density_per_m > 0.0) || !self.expansion_density_per_m.is_finite() {
            return Err(PlannerError::InvalidParams(format!(
                "expansion_density_per_m must be positive and finite, got {}",
                self.expansion_density_per_m
            )));
        }

        Ok(())
    }
}

fn default_expansion_density() -> f64 {
    16.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_toml() {
        let params: PlannerParams = util::params::from_toml_str(
            "connection_overlap_factor = 0.9\nduplicate_overlap_factor = 0.2\n",
        )
        .unwrap();

        assert_eq!(params.expansion_density_per_m, 16.0);
        assert_eq!(params.max_search_iterations, None);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_validate() {
        assert!(PlannerParams::default().validate().is_ok());

        let swapped = PlannerParams {
            connection_overlap_factor: 0.2,
            duplicate_overlap_factor: 0.5,
            ..Default::default()
        };
        assert!(matches!(swapped.validate(), Err(PlannerError::InvalidParams(_))));

        let no_density = PlannerParams {
            expansion_density_per_m: 0.0,
            ..Default::default()
        };
        assert!(matches!(no_density.validate(), Err(PlannerError::InvalidParams(_))));
    }
}
