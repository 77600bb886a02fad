//! Analysis move tree.
//!
//! Nodes live in an arena and are addressed by `NodeId`, which is the node's
//! index and is handed out in creation order. A node owns the `GameState`
//! reached by its move; parents are back-references only. Child order is
//! meaningful: index 0 is the main line, the rest are variations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chess_errors::TreeError;
use crate::game_state::game_state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisNode {
    pub id: NodeId,
    pub state: GameState,
    /// Move text that produced this node; `None` for the root.
    pub notation: Option<String>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub last_visited: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Serialized form of a tree: every node, the root, and the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    pub nodes: Vec<AnalysisNode>,
    pub root_node_id: NodeId,
    pub last_node_id: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTree {
    nodes: Vec<AnalysisNode>,
    root: NodeId,
    current: NodeId,
}

impl AnalysisTree {
    pub fn new(root_state: GameState) -> Self {
        let root = NodeId(0);
        Self {
            nodes: vec![AnalysisNode {
                id: root,
                state: root_state,
                notation: None,
                children: Vec::new(),
                parent: None,
                last_visited: false,
                comment: None,
            }],
            root,
            current: root,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn current(&self) -> NodeId {
        self.current
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&AnalysisNode> {
        self.nodes.get(id.index())
    }

    fn node_ref(&self, id: NodeId) -> Result<&AnalysisNode, TreeError> {
        self.node(id).ok_or(TreeError::UnknownNode(id.0))
    }

    /// The cursor node. The cursor always points at a live node.
    #[inline]
    pub fn current_node(&self) -> &AnalysisNode {
        &self.nodes[self.current.index()]
    }

    #[inline]
    pub fn current_state(&self) -> &GameState {
        &self.current_node().state
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], TreeError> {
        Ok(&self.node_ref(id)?.children)
    }

    /// Add `state` as a child of the cursor, or reuse the child already
    /// reached by `notation`, and move the cursor onto it.
    pub fn commit(&mut self, state: GameState, notation: &str) -> NodeId {
        let parent = self.current;
        let existing = self.nodes[parent.index()]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.index()].notation.as_deref() == Some(notation));

        let target = match existing {
            Some(child) => {
                debug!(node = %child, notation, "commit reused existing child");
                child
            }
            None => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(AnalysisNode {
                    id,
                    state,
                    notation: Some(notation.to_owned()),
                    children: Vec::new(),
                    parent: Some(parent),
                    last_visited: false,
                    comment: None,
                });
                self.nodes[parent.index()].children.push(id);
                debug!(node = %id, parent = %parent, notation, "commit added child");
                id
            }
        };

        self.mark_visited(target);
        self.current = target;
        target
    }

    fn mark_visited(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.index()].parent else {
            return;
        };
        let siblings = self.nodes[parent.index()].children.clone();
        for sibling in siblings {
            self.nodes[sibling.index()].last_visited = sibling == id;
        }
    }

    /// Move the cursor to `id`, marking it as the visited branch of its parent.
    pub fn go_to(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.node_ref(id)?;
        self.mark_visited(id);
        self.current = id;
        Ok(())
    }

    pub fn go_to_start(&mut self) {
        self.current = self.root;
    }

    /// Jump to the last node of the explored line.
    pub fn go_to_end(&mut self) {
        if let Some(&last) = self.current_line().last() {
            self.current = last;
        }
    }

    /// Step back to the parent. Returns false at the root.
    pub fn undo(&mut self) -> bool {
        match self.current_node().parent {
            Some(parent) => {
                self.current = parent;
                true
            }
            None => false,
        }
    }

    /// Step forward along the last visited child, or the main line.
    /// Returns false at a leaf.
    pub fn redo(&mut self) -> bool {
        match self.preferred_child(self.current) {
            Some(child) => {
                self.current = child;
                true
            }
            None => false,
        }
    }

    fn preferred_child(&self, id: NodeId) -> Option<NodeId> {
        let children = &self.nodes[id.index()].children;
        children
            .iter()
            .copied()
            .find(|child| self.nodes[child.index()].last_visited)
            .or_else(|| children.first().copied())
    }

    /// Make `id` the main line among its siblings, keeping the others in order.
    pub fn promote_variation(&mut self, id: NodeId) -> Result<(), TreeError> {
        // The root has no siblings to reorder.
        let Some(parent) = self.node_ref(id)?.parent else {
            return Ok(());
        };
        let children = &mut self.nodes[parent.index()].children;
        if let Some(position) = children.iter().position(|child| *child == id) {
            let promoted = children.remove(position);
            children.insert(0, promoted);
        }
        debug!(node = %id, "variation promoted");
        Ok(())
    }

    /// Root to `id`, both included.
    pub fn path_to(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut path = vec![id];
        let mut cursor = self.node_ref(id)?.parent;
        while let Some(parent) = cursor {
            path.push(parent);
            cursor = self.node_ref(parent)?.parent;
        }
        path.reverse();
        Ok(path)
    }

    /// History from the root to the cursor followed by the explored future
    /// (last visited child, else main line) down to a leaf.
    pub fn current_line(&self) -> Vec<NodeId> {
        let mut line = Vec::new();
        let mut cursor = Some(self.current);
        while let Some(id) = cursor {
            line.push(id);
            cursor = self.nodes[id.index()].parent;
        }
        line.reverse();

        let mut tip = self.current;
        while let Some(child) = self.preferred_child(tip) {
            line.push(child);
            tip = child;
        }
        line
    }

    /// Root followed by index-0 children down to a leaf.
    pub fn main_line(&self) -> Vec<NodeId> {
        let mut line = vec![self.root];
        let mut tip = self.root;
        while let Some(&child) = self.nodes[tip.index()].children.first() {
            line.push(child);
            tip = child;
        }
        line
    }

    pub fn set_comment(&mut self, id: NodeId, comment: Option<String>) -> Result<(), TreeError> {
        self.node_ref(id)?;
        self.nodes[id.index()].comment = comment.filter(|text| !text.trim().is_empty());
        Ok(())
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            nodes: self.nodes.clone(),
            root_node_id: self.root,
            last_node_id: self.current,
        }
    }

    /// Rebuild a tree, refusing anything that is not a rooted out-tree.
    pub fn from_snapshot(snapshot: TreeSnapshot) -> Result<Self, TreeError> {
        let TreeSnapshot {
            nodes,
            root_node_id,
            last_node_id,
        } = snapshot;
        let malformed = |reason: String| Err(TreeError::MalformedSnapshot(reason));

        for (index, node) in nodes.iter().enumerate() {
            if node.id.index() != index {
                return malformed(format!("node at index {index} has id {}", node.id));
            }
        }
        let Some(root) = nodes.get(root_node_id.index()) else {
            return malformed(format!("root {root_node_id} does not exist"));
        };
        if root.parent.is_some() {
            return malformed(format!("root {root_node_id} has a parent"));
        }
        if last_node_id.index() >= nodes.len() {
            return malformed(format!("cursor {last_node_id} does not exist"));
        }

        let mut seen_as_child = vec![false; nodes.len()];
        for node in &nodes {
            for child in &node.children {
                let Some(child_node) = nodes.get(child.index()) else {
                    return malformed(format!("node {} lists missing child {child}", node.id));
                };
                if child_node.parent != Some(node.id) {
                    return malformed(format!("child {child} does not point back to {}", node.id));
                }
                if std::mem::replace(&mut seen_as_child[child.index()], true) {
                    return malformed(format!("node {child} appears twice as a child"));
                }
            }
        }
        for node in &nodes {
            let expected = node.id != root_node_id;
            if seen_as_child[node.id.index()] != expected {
                return malformed(format!("node {} is detached from the tree", node.id));
            }
        }

        // Every parent chain must reach the root within `nodes.len()` steps.
        for node in &nodes {
            let mut cursor = node.parent;
            let mut steps = 0usize;
            while let Some(parent) = cursor {
                steps += 1;
                if steps > nodes.len() {
                    return malformed(format!("cycle through node {}", node.id));
                }
                cursor = nodes[parent.index()].parent;
            }
        }

        Ok(Self {
            nodes,
            root: root_node_id,
            current: last_node_id,
        })
    }
}
