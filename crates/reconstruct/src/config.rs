//! Configuration threaded through every reconstruction pass.

use serde::{Deserialize, Serialize};

use section_kernel::Tolerance;
use section_solver::SolverConfig;

use crate::error::ReconstructError;

/// Tunables for contour merging, surface building and cross-section extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructConfig {
    /// Tolerances for on-plane and coplanarity predicates.
    pub tolerance: Tolerance,
    /// Least-squares settings for the local normal fit.
    pub solver: SolverConfig,
    /// Plane hits whose squared distance to the node exceeds
    /// `distance_filter_factor * flat_radius` are dropped; a hit exactly at the
    /// bound is kept.
    pub distance_filter_factor: f64,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            solver: SolverConfig::default(),
            distance_filter_factor: 1.2,
        }
    }
}

impl ReconstructConfig {
    /// Parse a (possibly partial) JSON configuration; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ReconstructError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ReconstructError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconstructError> {
        if !self.distance_filter_factor.is_finite() || self.distance_filter_factor < 0.0 {
            return Err(ReconstructError::Config(format!(
                "distance_filter_factor must be a non-negative number, got {}",
                self.distance_filter_factor
            )));
        }
        if self.tolerance.coincidence < 0.0 || self.tolerance.parametric < 0.0 {
            return Err(ReconstructError::Config("tolerances must be non-negative".into()));
        }
        Ok(())
    }
}
