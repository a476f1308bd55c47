//! DocumentBuilder: fluent API for scripting traced documents in tests.
//!
//! Nodes are addressed by their object id and trees by theirs, so scenarios
//! read like the traced structure they describe.

use std::collections::HashMap;

use cross_section::{reconstruct_document, DocumentReport, ReconstructConfig};
use section_tree::{AreaTree, Calibration, Contour, Document, LayerTable, Node, NodeId};

use crate::helpers::HarnessError;

/// A fluent builder for traced documents that can run reconstruction in place.
pub struct DocumentBuilder {
    pub doc: Document,
    pub config: ReconstructConfig,
    /// `(tree index, node id)` for every node oid.
    named_nodes: HashMap<String, (usize, NodeId)>,
    last_report: Option<DocumentReport>,
    auto_check: bool,
}

impl DocumentBuilder {
    /// Empty document with the given pixel width.
    pub fn new(pixel_width: f64) -> Self {
        Self {
            doc: Document::new(LayerTable::new(), Calibration::new(pixel_width)),
            config: ReconstructConfig::default(),
            named_nodes: HashMap::new(),
            last_report: None,
            auto_check: false,
        }
    }

    /// Wrap an existing document, indexing its nodes by oid.
    pub fn from_document(doc: Document) -> Result<Self, HarnessError> {
        let mut builder = Self {
            doc,
            config: ReconstructConfig::default(),
            named_nodes: HashMap::new(),
            last_report: None,
            auto_check: false,
        };
        for (t, tree) in builder.doc.trees.iter().enumerate() {
            for id in tree.preorder() {
                let oid = tree.nodes[id].oid.clone();
                if builder.named_nodes.insert(oid.clone(), (t, id)).is_some() {
                    return Err(HarnessError::DuplicateName { name: oid });
                }
            }
        }
        Ok(builder)
    }

    /// After every run, fail if any tree did not complete.
    pub fn with_auto_check(mut self) -> Self {
        self.auto_check = true;
        self
    }

    pub fn with_config(mut self, config: ReconstructConfig) -> Self {
        self.config = config;
        self
    }

    // ── Structure ───────────────────────────────────────────────────────

    pub fn layer(&mut self, lid: &str, depth: f64) -> &mut Self {
        self.doc.layers.insert(lid, depth);
        self
    }

    /// Register `count` layers `L0..` spaced `spacing` apart starting at depth 0.
    pub fn layer_stack(&mut self, count: usize, spacing: f64) -> &mut Self {
        for i in 0..count {
            self.doc.layers.insert(format!("L{i}"), i as f64 * spacing);
        }
        self
    }

    pub fn tree(&mut self, oid: &str) -> Result<&mut Self, HarnessError> {
        if self.doc.tree(oid).is_some() {
            return Err(HarnessError::DuplicateName { name: oid.into() });
        }
        self.doc.trees.push(AreaTree::new(oid));
        Ok(self)
    }

    /// Add a top-level node to `tree`.
    pub fn root(
        &mut self,
        tree: &str,
        oid: &str,
        lid: &str,
        x: f64,
        y: f64,
    ) -> Result<&mut Self, HarnessError> {
        self.check_name_available(oid)?;
        let t = self.tree_index(tree)?;
        let id = self.doc.trees[t].add_root(Node::new(oid, lid, x, y));
        self.named_nodes.insert(oid.into(), (t, id));
        Ok(self)
    }

    /// Add `oid` as the last child of `parent`, in the parent's tree.
    pub fn child(
        &mut self,
        parent: &str,
        oid: &str,
        lid: &str,
        x: f64,
        y: f64,
    ) -> Result<&mut Self, HarnessError> {
        self.check_name_available(oid)?;
        let (t, parent_id) = self.lookup(parent)?;
        let id = self.doc.trees[t].add_child(parent_id, Node::new(oid, lid, x, y))?;
        self.named_nodes.insert(oid.into(), (t, id));
        Ok(self)
    }

    /// Attach a raw contour to a node.
    pub fn contour(&mut self, oid: &str, contour: Contour) -> Result<&mut Self, HarnessError> {
        let node = self.node_mut(oid)?;
        node.contours.push(contour);
        Ok(self)
    }

    /// A straight chain `prefix0 -> prefix1 -> ...`, one node per layer of
    /// `layers`, each traced at `(x, y)` with `contour`.
    pub fn chain(
        &mut self,
        tree: &str,
        prefix: &str,
        layers: &[&str],
        centers: &[(f64, f64)],
        contour: impl Fn(f64, f64) -> Contour,
    ) -> Result<&mut Self, HarnessError> {
        let mut parent: Option<String> = None;
        for (i, (lid, &(x, y))) in layers.iter().zip(centers).enumerate() {
            let oid = format!("{prefix}{i}");
            match &parent {
                None => self.root(tree, &oid, lid, x, y)?,
                Some(p) => self.child(p, &oid, lid, x, y)?,
            };
            self.contour(&oid, contour(x, y))?;
            parent = Some(oid);
        }
        Ok(self)
    }

    // ── Running ─────────────────────────────────────────────────────────

    /// Reconstruct the whole document in place.
    pub fn run(&mut self) -> Result<&DocumentReport, HarnessError> {
        let report = reconstruct_document(&mut self.doc, &self.config)?;
        if self.auto_check {
            if let Some((oid, err)) = report.failed().next() {
                return Err(HarnessError::AssertionFailed {
                    detail: format!("tree {oid} failed: {err}"),
                });
            }
        }
        Ok(self.last_report.insert(report))
    }

    pub fn last_report(&self) -> Option<&DocumentReport> {
        self.last_report.as_ref()
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn node(&self, oid: &str) -> Result<&Node, HarnessError> {
        let (t, id) = self.lookup(oid)?;
        self.doc.trees[t]
            .get(id)
            .ok_or_else(|| HarnessError::NodeNotFound { name: oid.into() })
    }

    pub fn radius(&self, oid: &str) -> Result<Option<u64>, HarnessError> {
        Ok(self.node(oid)?.cross_radius)
    }

    pub fn flat_radius(&self, oid: &str) -> Result<Option<f64>, HarnessError> {
        Ok(self.node(oid)?.flat_radius)
    }

    /// Oid and radius of every node of `tree`, in document order.
    pub fn radii(&self, tree: &str) -> Result<Vec<(String, Option<u64>)>, HarnessError> {
        let t = self.tree_index(tree)?;
        let tree = &self.doc.trees[t];
        Ok(tree
            .preorder()
            .into_iter()
            .map(|id| (tree.nodes[id].oid.clone(), tree.nodes[id].cross_radius))
            .collect())
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn check_name_available(&self, oid: &str) -> Result<(), HarnessError> {
        if self.named_nodes.contains_key(oid) {
            return Err(HarnessError::DuplicateName { name: oid.into() });
        }
        Ok(())
    }

    fn tree_index(&self, oid: &str) -> Result<usize, HarnessError> {
        self.doc
            .trees
            .iter()
            .position(|t| t.oid == oid)
            .ok_or_else(|| HarnessError::TreeNotFound { name: oid.into() })
    }

    fn lookup(&self, oid: &str) -> Result<(usize, NodeId), HarnessError> {
        self.named_nodes
            .get(oid)
            .copied()
            .ok_or_else(|| HarnessError::NodeNotFound { name: oid.into() })
    }

    fn node_mut(&mut self, oid: &str) -> Result<&mut Node, HarnessError> {
        let (t, id) = self.lookup(oid)?;
        self.doc.trees[t]
            .get_mut(id)
            .ok_or_else(|| HarnessError::NodeNotFound { name: oid.into() })
    }
}
