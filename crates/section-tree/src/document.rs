use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::tree::AreaTree;
use crate::types::Node;

/// Depth of every section layer, keyed by layer id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerTable {
    pub depths: HashMap<String, f64>,
}

impl LayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, lid: impl Into<String>, depth: f64) {
        self.depths.insert(lid.into(), depth);
    }

    pub fn get(&self, lid: &str) -> Option<f64> {
        self.depths.get(lid).copied()
    }

    /// Resolve a node's depth. A missing layer is a data error.
    pub fn depth_of(&self, node: &Node) -> Result<f64, TreeError> {
        self.get(&node.lid).ok_or_else(|| TreeError::MissingLayer {
            lid: node.lid.clone(),
            oid: node.oid.clone(),
        })
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for LayerTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            depths: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Pixel calibration of the image stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub pixel_width: f64,
}

impl Calibration {
    pub fn new(pixel_width: f64) -> Self {
        Self { pixel_width }
    }
}

/// A whole traced document: layer depths, calibration and area trees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub layers: LayerTable,
    pub calibration: Option<Calibration>,
    pub trees: Vec<AreaTree>,
}

impl Document {
    pub fn new(layers: LayerTable, calibration: Calibration) -> Self {
        Self {
            layers,
            calibration: Some(calibration),
            trees: Vec::new(),
        }
    }

    /// The calibration factor; absent or non-positive values are data errors.
    pub fn pixel_width(&self) -> Result<f64, TreeError> {
        let value = self
            .calibration
            .ok_or(TreeError::MissingCalibration)?
            .pixel_width;
        if !value.is_finite() || value <= 0.0 {
            return Err(TreeError::InvalidCalibration { value });
        }
        Ok(value)
    }

    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        serde_json::from_str(json).map_err(|e| TreeError::ParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, TreeError> {
        serde_json::to_string_pretty(self).map_err(|e| TreeError::ParseError(e.to_string()))
    }

    pub fn tree(&self, oid: &str) -> Option<&AreaTree> {
        self.trees.iter().find(|t| t.oid == oid)
    }
}
