use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::document::LayerTable;
use crate::error::TreeError;
use crate::types::{Node, NodeId};

/// One traced structure: an arena of nodes plus its top-level nodes in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaTree {
    pub oid: String,
    pub nodes: SlotMap<NodeId, Node>,
    pub roots: Vec<NodeId>,
}

impl AreaTree {
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
        }
    }

    /// Append a top-level node.
    pub fn add_root(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        let id = self.nodes.insert(node);
        self.roots.push(id);
        id
    }

    /// Append `node` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, TreeError> {
        if !self.nodes.contains_key(parent) {
            return Err(TreeError::UnknownNode {
                tree: self.oid.clone(),
            });
        }
        node.parent = Some(parent);
        let id = self.nodes.insert(node);
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find_by_oid(&self, oid: &str) -> Option<NodeId> {
        self.nodes.iter().find(|(_, n)| n.oid == oid).map(|(id, _)| id)
    }

    /// All node ids in document order: parent before children, siblings in order.
    ///
    /// Uses an explicit stack so arbitrarily deep trees do not grow the call stack.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Check every node's layer reference before any pass mutates the tree.
    pub fn validate_layers(&self, layers: &LayerTable) -> Result<(), TreeError> {
        for id in self.preorder() {
            let node = &self.nodes[id];
            layers.depth_of(node)?;
        }
        Ok(())
    }
}
