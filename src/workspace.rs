//! Visual tree adapter
//!
//! The editable tree a user manipulates. Nodes live in an arena keyed by id;
//! containers hold an ordered list of child ids and every node records its
//! parent. The arena map doubles as the `id → node` index used for highlight
//! correlation, so it is updated in the same step as every structural edit
//! and never lags behind the tree.
//!
//! Blocks that are not attached anywhere sit at the top level; the first
//! top-level block is the grammar root.

pub mod edit;

use std::collections::{HashMap, HashSet};

use crate::error::{ValidationError, WorkspaceError};
use crate::grammar::{walk_pre_order, Combinator, GrammarNode, NodeId, NodeKind, UiVariant};

pub use edit::{Attachment, FieldEdit};

/// One block in the workspace arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceNode {
    pub id: NodeId,
    pub ui_variant: UiVariant,
    pub combinator: Combinator,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl WorkspaceNode {
    pub fn kind(&self) -> NodeKind {
        self.combinator.kind()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    nodes: HashMap<NodeId, WorkspaceNode>,
    top_level: Vec<NodeId>,
    /// Every id this workspace has handed out or admitted. Fresh ids are
    /// drawn outside this set so an id is never reissued, even after the
    /// node carrying it was deleted.
    issued: HashSet<NodeId>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a workspace whose only top-level block is `tree`.
    pub fn from_tree(tree: GrammarNode) -> Result<Self, WorkspaceError> {
        let mut workspace = Self::new();
        workspace.insert_tree(tree, None)?;
        Ok(workspace)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&WorkspaceNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> Option<&WorkspaceNode> {
        self.top_level.first().and_then(|id| self.nodes.get(id))
    }

    pub fn top_level(&self) -> &[NodeId] {
        &self.top_level
    }

    /// Drop every block. Ids already issued stay retired.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.top_level.clear();
    }

    /// Return to an earlier copy of this workspace. Ids issued since then
    /// stay retired.
    pub(crate) fn roll_back(&mut self, earlier: Workspace) {
        let issued = std::mem::take(&mut self.issued);
        *self = earlier;
        self.issued.extend(issued);
    }

    /// Draw an id that this workspace has never seen.
    pub fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = NodeId::random();
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Create a detached top-level block and return its id.
    pub fn add_block(
        &mut self,
        combinator: Combinator,
        ui_variant: Option<UiVariant>,
    ) -> Result<NodeId, WorkspaceError> {
        let kind = combinator.kind();
        let ui_variant = match ui_variant {
            Some(variant) => check_variant(variant, kind)?,
            None => UiVariant::default_for(kind, true),
        };
        let id = self.fresh_id();
        self.nodes.insert(
            id.clone(),
            WorkspaceNode {
                id: id.clone(),
                ui_variant,
                combinator,
                children: Vec::new(),
                parent: None,
            },
        );
        self.top_level.push(id.clone());
        self.retag(&id);
        Ok(id)
    }

    /// Add a detached subtree, optionally attaching it in one step.
    ///
    /// The whole subtree is checked before anything is inserted: its ids
    /// must be unique and unused, its flavors must denote their kinds, and
    /// no rest node may be followed by a sibling.
    pub fn insert_tree(
        &mut self,
        tree: GrammarNode,
        at: Option<Attachment>,
    ) -> Result<NodeId, WorkspaceError> {
        self.check_subtree(&tree)?;
        if let Some(attachment) = &at {
            self.check_attachment(attachment, tree.kind(), None)?;
        }

        let root = self.materialize(tree, None);
        self.top_level.push(root.clone());
        if let Some(attachment) = at {
            self.connect(&root, attachment)?;
        } else {
            self.retag(&root);
        }
        Ok(root)
    }

    /// Attach a top-level block into a container's child slot.
    pub fn connect(&mut self, child: &NodeId, at: Attachment) -> Result<(), WorkspaceError> {
        let node = self.node(child)?;
        if node.parent.is_some() {
            return Err(WorkspaceError::AlreadyAttached(child.clone()));
        }
        let kind = node.kind();
        self.check_attachment(&at, kind, Some(child))?;

        self.top_level.retain(|id| id != child);
        let parent = self.node_mut(&at.parent)?;
        let index = at.index.unwrap_or(parent.children.len());
        parent.children.insert(index, child.clone());
        self.node_mut(child)?.parent = Some(at.parent.clone());
        self.retag(child);
        Ok(())
    }

    /// Detach a block from its parent and move it to the top level. A block
    /// that already sits at the top level is left alone.
    pub fn disconnect(&mut self, id: &NodeId) -> Result<(), WorkspaceError> {
        let Some(parent) = self.node(id)?.parent.clone() else {
            return Ok(());
        };
        self.node_mut(&parent)?.children.retain(|child| child != id);
        self.node_mut(id)?.parent = None;
        self.top_level.push(id.clone());
        self.retag(id);
        Ok(())
    }

    /// Remove a block and its whole subtree, returning it detached.
    pub fn delete(&mut self, id: &NodeId) -> Result<GrammarNode, WorkspaceError> {
        let snapshot = self.snapshot(id)?;
        let parent = self.node(id)?.parent.clone();
        match parent {
            Some(parent) => self.node_mut(&parent)?.children.retain(|child| child != id),
            None => self.top_level.retain(|top| top != id),
        }
        let mut stack = vec![id.clone()];
        while let Some(next) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&next) {
                stack.extend(removed.children);
            }
        }
        Ok(snapshot)
    }

    /// Change one field of a leaf block. Invalid values leave it untouched.
    pub fn edit(&mut self, id: &NodeId, edit: FieldEdit) -> Result<(), WorkspaceError> {
        let node = self.node(id)?;
        let updated = edit.apply(&node.combinator)?;
        self.node_mut(id)?.combinator = updated;
        Ok(())
    }

    /// Owned copy of the subtree rooted at `id`.
    pub fn snapshot(&self, id: &NodeId) -> Result<GrammarNode, WorkspaceError> {
        let node = self.node(id)?;
        let mut tree = GrammarNode::leaf(
            node.id.clone(),
            node.ui_variant.clone(),
            node.combinator.clone(),
        );
        for child in &node.children {
            tree.push(self.snapshot(child)?)?;
        }
        Ok(tree)
    }

    /// Depth-first pre-order over every top-level tree, yielding each node
    /// with its depth below its top-level block.
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            workspace: self,
            stack: self.top_level.iter().rev().map(|id| (id, 0)).collect(),
        }
    }

    fn node(&self, id: &NodeId) -> Result<&WorkspaceNode, WorkspaceError> {
        self.nodes
            .get(id)
            .ok_or_else(|| WorkspaceError::UnknownNode(id.clone()))
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut WorkspaceNode, WorkspaceError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::UnknownNode(id.clone()))
    }

    /// Sequences take the flavor that is legal at their position.
    fn retag(&mut self, id: &NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.kind() == NodeKind::Sequence {
                node.ui_variant = UiVariant::default_for(NodeKind::Sequence, node.parent.is_none());
            }
        }
    }

    fn check_attachment(
        &self,
        at: &Attachment,
        child_kind: NodeKind,
        child: Option<&NodeId>,
    ) -> Result<(), WorkspaceError> {
        let parent = self.node(&at.parent)?;
        if !parent.kind().is_container() {
            return Err(WorkspaceError::NotAContainer {
                id: parent.id.clone(),
                kind: parent.kind(),
            });
        }
        if let Some(child) = child {
            if self.is_ancestor_or_self(child, &at.parent) {
                return Err(WorkspaceError::Cycle {
                    child: child.clone(),
                    parent: at.parent.clone(),
                });
            }
        }
        let len = parent.children.len();
        let index = at.index.unwrap_or(len);
        if index > len {
            return Err(WorkspaceError::IndexOutOfRange {
                parent: at.parent.clone(),
                index,
                len,
            });
        }

        let mut kinds: Vec<NodeKind> = parent
            .children
            .iter()
            .filter_map(|id| self.nodes.get(id).map(WorkspaceNode::kind))
            .collect();
        kinds.insert(index, child_kind);
        check_rest_last(&at.parent, &kinds)
    }

    /// True when `ancestor` is `node` or lies on the path from `node` to its
    /// top-level block.
    fn is_ancestor_or_self(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent.as_ref());
        }
        false
    }

    /// Check every node of a detached tree, stopping at the first problem.
    fn check_subtree(&self, tree: &GrammarNode) -> Result<(), WorkspaceError> {
        let mut seen = HashSet::new();
        let mut outcome = Ok(());
        walk_pre_order(tree, &mut |node: &GrammarNode, _depth: usize| {
            if outcome.is_err() {
                return false;
            }
            outcome = self.check_detached(node, &mut seen);
            outcome.is_ok()
        });
        outcome
    }

    fn check_detached(
        &self,
        node: &GrammarNode,
        seen: &mut HashSet<NodeId>,
    ) -> Result<(), WorkspaceError> {
        if self.nodes.contains_key(&node.id) || !seen.insert(node.id.clone()) {
            return Err(WorkspaceError::DuplicateId(node.id.clone()));
        }
        check_variant(node.ui_variant.clone(), node.kind())?;
        let kinds: Vec<NodeKind> = node.children().iter().map(GrammarNode::kind).collect();
        check_rest_last(&node.id, &kinds)
    }

    fn materialize(&mut self, tree: GrammarNode, parent: Option<NodeId>) -> NodeId {
        let (id, ui_variant, combinator, children) = tree.into_parts();
        self.issued.insert(id.clone());
        let child_ids = children
            .into_iter()
            .map(|child| self.materialize(child, Some(id.clone())))
            .collect();
        self.nodes.insert(
            id.clone(),
            WorkspaceNode {
                id: id.clone(),
                ui_variant,
                combinator,
                children: child_ids,
                parent,
            },
        );
        self.retag(&id);
        id
    }
}

fn check_variant(variant: UiVariant, kind: NodeKind) -> Result<UiVariant, ValidationError> {
    if !variant.denotes(kind) {
        return Err(ValidationError::VariantMismatch {
            variant: variant.to_string(),
            kind,
        });
    }
    Ok(variant)
}

fn check_rest_last(parent: &NodeId, kinds: &[NodeKind]) -> Result<(), WorkspaceError> {
    let followed = kinds.len().saturating_sub(1);
    if kinds[..followed].contains(&NodeKind::Rest) {
        return Err(WorkspaceError::RestNotLast {
            parent: parent.clone(),
        });
    }
    Ok(())
}

/// Iterator returned by [`Workspace::pre_order`].
pub struct PreOrder<'a> {
    workspace: &'a Workspace,
    stack: Vec<(&'a NodeId, usize)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (&'a WorkspaceNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            if let Some(node) = self.workspace.nodes.get(id) {
                self.stack
                    .extend(node.children.iter().rev().map(|child| (child, depth + 1)));
                return Some((node, depth));
            }
        }
        None
    }
}
