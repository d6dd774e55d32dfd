//! Editor block flavors
//!
//! Several editor blocks can denote the same combinator (a plain string
//! field and a URL-typed string field are both `string`). The flavor is an
//! open tag; its logical kind is the part before the first `-`, which keeps
//! serialized parser names free of presentation suffixes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::NodeKind;

/// Flavor used for a sequence that sits at the top of the workspace.
pub const ROOT_SEQUENCE: &str = "sequence";
/// Flavor used for a sequence nested inside another container.
pub const INNER_SEQUENCE: &str = "sequence-inner";
/// Flavor given to string blocks created by batch import.
pub const IMPORTED_STRING: &str = "string-url";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UiVariant(String);

impl UiVariant {
    pub fn new(tag: impl Into<String>) -> Self {
        UiVariant(tag.into())
    }

    /// The flavor a block gets when nothing more specific was recorded.
    ///
    /// Sequences are the only kind whose flavor depends on position.
    pub fn default_for(kind: NodeKind, at_root: bool) -> Self {
        match kind {
            NodeKind::Sequence if at_root => UiVariant::new(ROOT_SEQUENCE),
            NodeKind::Sequence => UiVariant::new(INNER_SEQUENCE),
            other => UiVariant::new(other.wire_name()),
        }
    }

    /// Logical kind denoted by this flavor, if it names one.
    pub fn logical_kind(&self) -> Option<NodeKind> {
        let base = self.0.split('-').next().unwrap_or_default();
        NodeKind::from_wire_name(base)
    }

    pub fn denotes(&self, kind: NodeKind) -> bool {
        self.logical_kind() == Some(kind)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UiVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
