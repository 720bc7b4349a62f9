//! Tree storage and traversal.
//!
//! Nodes are kept in an id-keyed map with children referenced by id, under
//! a single synthetic root (id `"/"`) that owns all top-level items and is
//! never itself displayed. The tree is rebuilt in full on every structural
//! pass; node objects are not stable across rebuilds.

use std::collections::HashMap;

use crate::surface::RowHandle;

/// Id of the synthetic root node.
pub const ROOT_ID: &str = "/";

/// One displayable row plus its tree-relevant metadata.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Unique row id.
    pub id: String,
    /// Parent id; [`ROOT_ID`] for top-level nodes.
    pub parent: String,
    /// Declared overriding parent, if any.
    pub fixed_parent: Option<String>,
    /// Declared required ancestor, if any.
    pub limit_parent: Option<String>,
    /// Child ids in sibling order.
    pub children: Vec<String>,
    /// Expand/collapse state.
    pub open: bool,
    /// Handle to the presentation row.
    pub handle: RowHandle,
    /// Position of this row in the declared sequence.
    pub decl_index: usize,
}

/// How a traversal callback directs the walk at each node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    /// Descend into this node's children.
    Continue,
    /// Visit siblings but do not descend into this node's subtree.
    SkipChildren,
}

/// The node graph for one synchronization pass.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: HashMap<String, TreeNode>,
    root_children: Vec<String>,
}

impl Tree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a classified node. Children are linked separately once all
    /// rows have been classified.
    pub fn insert(&mut self, node: TreeNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Whether a node with this id exists. The synthetic root counts.
    pub fn contains(&self, id: &str) -> bool {
        id == ROOT_ID || self.nodes.contains_key(id)
    }

    /// Looks up a node by id.
    pub fn get(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Looks up a node by id, mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id)
    }

    /// Number of nodes, excluding the synthetic root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    /// Ids of top-level nodes in sibling order.
    pub fn root_children(&self) -> &[String] {
        &self.root_children
    }

    /// Child ids of a node, or of the root for [`ROOT_ID`].
    pub fn children_of(&self, id: &str) -> &[String] {
        if id == ROOT_ID {
            &self.root_children
        } else {
            self.nodes
                .get(id)
                .map(|node| node.children.as_slice())
                .unwrap_or(&[])
        }
    }

    /// Appends a child to a parent's children list. The child's `parent`
    /// field is assumed to already name the parent.
    pub fn attach_child(&mut self, parent: &str, child: &str) {
        if parent == ROOT_ID {
            self.root_children.push(child.to_string());
        } else if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child.to_string());
        }
    }

    /// Replaces a node's children list wholesale, for sibling re-ordering.
    /// The new list must be a permutation of the old one.
    pub fn replace_children(&mut self, parent: &str, children: Vec<String>) {
        if parent == ROOT_ID {
            self.root_children = children;
        } else if let Some(node) = self.nodes.get_mut(parent) {
            node.children = children;
        }
    }

    /// Ancestor ids of a node, nearest first, ending with [`ROOT_ID`].
    ///
    /// Returns an empty chain for unknown ids. Bounded by the node count,
    /// so a malformed graph cannot loop forever.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = match self.nodes.get(id) {
            Some(node) => node.parent.clone(),
            None => return chain,
        };
        let limit = self.nodes.len() + 1;
        while chain.len() < limit {
            chain.push(current.clone());
            if current == ROOT_ID {
                break;
            }
            current = match self.nodes.get(&current) {
                Some(node) => node.parent.clone(),
                None => break,
            };
        }
        chain
    }

    /// Moves a node under a new parent: unlinks it from the old parent's
    /// children list and appends it to the new parent's.
    pub fn reparent(&mut self, id: &str, new_parent: &str) {
        let old_parent = match self.nodes.get(id) {
            Some(node) => node.parent.clone(),
            None => return,
        };
        if old_parent == new_parent {
            return;
        }
        if old_parent == ROOT_ID {
            self.root_children.retain(|child| child != id);
        } else if let Some(node) = self.nodes.get_mut(&old_parent) {
            node.children.retain(|child| child != id);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = new_parent.to_string();
        }
        self.attach_child(new_parent, id);
    }

    /// Depth-first pre-order walk over every node reachable from the root.
    ///
    /// The callback receives each node and its depth (top-level nodes are
    /// depth 0) and directs descent via [`WalkControl`]. The synthetic
    /// root is not visited.
    pub fn walk<F>(&self, f: &mut F)
    where
        F: FnMut(&TreeNode, usize) -> WalkControl,
    {
        for id in self.root_children.clone() {
            self.walk_node(&id, 0, f);
        }
    }

    /// Depth-first pre-order walk over one subtree, starting at `id`
    /// itself with depth 0.
    pub fn walk_from<F>(&self, id: &str, f: &mut F)
    where
        F: FnMut(&TreeNode, usize) -> WalkControl,
    {
        self.walk_node(id, 0, f);
    }

    fn walk_node<F>(&self, id: &str, depth: usize, f: &mut F)
    where
        F: FnMut(&TreeNode, usize) -> WalkControl,
    {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let control = f(node, depth);
        if control == WalkControl::SkipChildren {
            return;
        }
        for child in node.children.clone() {
            self.walk_node(&child, depth + 1, f);
        }
    }
}
