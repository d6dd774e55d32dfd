//! Combinator kinds, node ids and the owned grammar tree

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::variant::UiVariant;
use crate::error::ValidationError;

/// Alphabet used by the block editor for generated ids.
const ID_ALPHABET: &[u8] =
    b"!#$%()*+,-./:;=?@[]^_`{|}~ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ID_LENGTH: usize = 20;

/// Opaque, stable node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    /// A fresh random id. Callers that need uniqueness against a live tree
    /// go through [`crate::workspace::Workspace`], which checks its index.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        NodeId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId::new(id)
    }
}

/// The closed set of logical combinator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Sequence,
    Choice,
    String,
    Rest,
    SubstringN,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Sequence,
        NodeKind::Choice,
        NodeKind::String,
        NodeKind::Rest,
        NodeKind::SubstringN,
    ];

    /// Name used for the `parser` key of canonical grammar JSON.
    pub fn wire_name(self) -> &'static str {
        match self {
            NodeKind::Sequence => "sequence",
            NodeKind::Choice => "choice",
            NodeKind::String => "string",
            NodeKind::Rest => "rest",
            NodeKind::SubstringN => "substring_n",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        NodeKind::ALL.into_iter().find(|kind| kind.wire_name() == name)
    }

    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Sequence | NodeKind::Choice)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Kind-specific fields of a node. Containers keep their children elsewhere
/// (in the arena, or in [`GrammarNode::children`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combinator {
    String { pattern: String, type_name: String },
    Rest { type_name: String },
    SubstringN { length: usize, type_name: String },
    Choice,
    Sequence,
}

impl Combinator {
    pub fn string(
        pattern: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Combinator::String {
            pattern: non_empty("s", pattern.into())?,
            type_name: non_empty("type_name", type_name.into())?,
        })
    }

    pub fn rest(type_name: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Combinator::Rest {
            type_name: non_empty("type_name", type_name.into())?,
        })
    }

    pub fn substring_n(length: i64, type_name: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Combinator::SubstringN {
            length: positive_length(length)?,
            type_name: non_empty("type_name", type_name.into())?,
        })
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Combinator::String { .. } => NodeKind::String,
            Combinator::Rest { .. } => NodeKind::Rest,
            Combinator::SubstringN { .. } => NodeKind::SubstringN,
            Combinator::Choice => NodeKind::Choice,
            Combinator::Sequence => NodeKind::Sequence,
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        match self {
            Combinator::String { type_name, .. }
            | Combinator::Rest { type_name }
            | Combinator::SubstringN { type_name, .. } => Some(type_name),
            Combinator::Choice | Combinator::Sequence => None,
        }
    }
}

pub(crate) fn non_empty(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(value)
}

pub(crate) fn positive_length(length: i64) -> Result<usize, ValidationError> {
    if length <= 0 {
        return Err(ValidationError::NonPositiveLength { value: length });
    }
    usize::try_from(length).map_err(|_| ValidationError::NonPositiveLength { value: length })
}

/// Owned grammar tree node.
///
/// Only Choice and Sequence nodes ever hold children; the constructors and
/// [`GrammarNode::push`] keep it that way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarNode {
    pub id: NodeId,
    pub ui_variant: UiVariant,
    pub combinator: Combinator,
    children: Vec<GrammarNode>,
}

impl GrammarNode {
    /// Build a leaf node. Containers go through [`GrammarNode::choice`] or
    /// [`GrammarNode::sequence`].
    pub fn leaf(id: NodeId, ui_variant: UiVariant, combinator: Combinator) -> Self {
        GrammarNode {
            id,
            ui_variant,
            combinator,
            children: Vec::new(),
        }
    }

    pub fn string(
        id: NodeId,
        pattern: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let combinator = Combinator::string(pattern, type_name)?;
        Ok(Self::leaf(id, UiVariant::default_for(NodeKind::String, false), combinator))
    }

    pub fn rest(id: NodeId, type_name: impl Into<String>) -> Result<Self, ValidationError> {
        let combinator = Combinator::rest(type_name)?;
        Ok(Self::leaf(id, UiVariant::default_for(NodeKind::Rest, false), combinator))
    }

    pub fn substring_n(
        id: NodeId,
        length: i64,
        type_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let combinator = Combinator::substring_n(length, type_name)?;
        Ok(Self::leaf(id, UiVariant::default_for(NodeKind::SubstringN, false), combinator))
    }

    pub fn choice(id: NodeId, children: Vec<GrammarNode>) -> Self {
        GrammarNode {
            id,
            ui_variant: UiVariant::default_for(NodeKind::Choice, false),
            combinator: Combinator::Choice,
            children: children.into_iter().map(GrammarNode::nested).collect(),
        }
    }

    /// A sequence tagged with the root-capable flavor. Sequences among
    /// `children` take the nested flavor.
    pub fn sequence(id: NodeId, children: Vec<GrammarNode>) -> Self {
        GrammarNode {
            id,
            ui_variant: UiVariant::default_for(NodeKind::Sequence, true),
            combinator: Combinator::Sequence,
            children: children.into_iter().map(GrammarNode::nested).collect(),
        }
    }

    /// Sequence flavor follows position: a node placed under a parent
    /// is never root-flavored.
    fn nested(mut self) -> Self {
        if self.kind() == NodeKind::Sequence {
            self.ui_variant = UiVariant::default_for(NodeKind::Sequence, false);
        }
        self
    }

    pub fn with_variant(mut self, ui_variant: UiVariant) -> Self {
        self.ui_variant = ui_variant;
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.combinator.kind()
    }

    pub fn children(&self) -> &[GrammarNode] {
        &self.children
    }

    pub(crate) fn into_parts(self) -> (NodeId, UiVariant, Combinator, Vec<GrammarNode>) {
        (self.id, self.ui_variant, self.combinator, self.children)
    }

    pub fn push(&mut self, child: GrammarNode) -> Result<(), ValidationError> {
        if !self.kind().is_container() {
            return Err(ValidationError::NotAContainer { kind: self.kind() });
        }
        self.children.push(child.nested());
        Ok(())
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(GrammarNode::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_wire_name(kind.wire_name()), Some(kind));
        }
        assert_eq!(NodeKind::from_wire_name("regex"), None);
    }

    #[test]
    fn substring_n_rejects_non_positive_length() {
        assert_eq!(
            Combinator::substring_n(0, "Id"),
            Err(ValidationError::NonPositiveLength { value: 0 })
        );
        assert_eq!(
            Combinator::substring_n(-3, "Id"),
            Err(ValidationError::NonPositiveLength { value: -3 })
        );
        assert!(Combinator::substring_n(2, "Id").is_ok());
    }

    #[test]
    fn string_names_the_empty_field() {
        assert_eq!(
            Combinator::string("", "Id"),
            Err(ValidationError::EmptyField { field: "s" })
        );
        assert_eq!(
            Combinator::string("AHU", ""),
            Err(ValidationError::EmptyField { field: "type_name" })
        );
    }

    #[test]
    fn leaves_refuse_children() {
        let mut leaf = GrammarNode::rest(NodeId::new("r"), "Tail").unwrap();
        let child = GrammarNode::rest(NodeId::new("c"), "Tail").unwrap();
        assert_eq!(
            leaf.push(child),
            Err(ValidationError::NotAContainer {
                kind: NodeKind::Rest
            })
        );
    }

    #[test]
    fn nested_sequences_take_the_inner_flavor() {
        let inner = GrammarNode::sequence(NodeId::new("inner"), Vec::new());
        assert_eq!(inner.ui_variant.as_str(), "sequence");

        let root = GrammarNode::sequence(NodeId::new("root"), vec![inner.clone()]);
        assert_eq!(root.ui_variant.as_str(), "sequence");
        assert_eq!(root.children()[0].ui_variant.as_str(), "sequence-inner");

        let mut choice = GrammarNode::choice(NodeId::new("choice"), Vec::new());
        choice.push(inner).unwrap();
        assert_eq!(choice.children()[0].ui_variant.as_str(), "sequence-inner");
    }

    #[test]
    fn random_ids_use_editor_shape() {
        let id = NodeId::random();
        assert_eq!(id.as_str().chars().count(), ID_LENGTH);
        assert_ne!(id, NodeId::random());
    }
}
