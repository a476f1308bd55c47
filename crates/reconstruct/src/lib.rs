//! Cross-section radius reconstruction for traced area trees.
//!
//! Each area tree is processed in three passes:
//!
//! 1. [`collect`]: merge every node's raw contours into one outline and record
//!    where the node was traced.
//! 2. [`surface`]: chain the outlines into a segment soup, connecting each
//!    outline to its nearest outlined ancestor, and fit a local axis per node.
//! 3. [`extract`]: cut the soup with the plane through each node along its
//!    nearest axis and turn the hull of the cut into an equivalent radius.
//!
//! Trees are independent; with the `parallel` feature they run on rayon's pool.

pub mod collect;
pub mod config;
pub mod contour;
pub mod error;
pub mod extract;
pub mod normal;
pub mod pipeline;
pub mod surface;

pub use collect::{collect_node_samples, NodeSample};
pub use config::ReconstructConfig;
pub use contour::{merge_contours, MergedContour};
pub use error::{Degeneracies, Degeneracy, DegeneracyKind, ReconstructError};
pub use extract::{
    equivalent_radius, extract_cross_section, nearest_normal, AxisCosines, CrossSection,
    ProjectionPlane,
};
pub use normal::{fit_normal, resolve_direction};
pub use pipeline::{
    reconstruct_document, reconstruct_tree, DocumentReport, SubtreeOutcome, SubtreeReport,
};
pub use surface::{build_surface, CentroidNormal, SurfaceModel};

use section_tree::Document;

/// Runs reconstruction with a fixed configuration and keeps the last report.
#[derive(Debug, Clone, Default)]
pub struct Reconstructor {
    pub config: ReconstructConfig,
    /// Report of the most recent successful run.
    pub last_report: Option<DocumentReport>,
}

impl Reconstructor {
    pub fn new(config: ReconstructConfig) -> Self {
        Self {
            config,
            last_report: None,
        }
    }

    /// Annotate every node of `doc` with its flat and cross-section radius.
    pub fn run(&mut self, doc: &mut Document) -> Result<&DocumentReport, ReconstructError> {
        let report = reconstruct_document(doc, &self.config)?;
        Ok(self.last_report.insert(report))
    }
}
