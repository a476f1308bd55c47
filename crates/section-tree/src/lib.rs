//! In-memory data contract for traced area trees.
//!
//! An external reader fills a [`Document`] (layer depths, pixel calibration and
//! one [`AreaTree`] per traced structure); the reconstruction passes annotate the
//! nodes in place and the reader's writer persists them.

pub mod document;
pub mod error;
pub mod tree;
pub mod types;

pub use document::{Calibration, Document, LayerTable};
pub use error::TreeError;
pub use tree::AreaTree;
pub use types::{encode_radius, Contour, Node, NodeId};
