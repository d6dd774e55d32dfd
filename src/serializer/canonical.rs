//! Tree → canonical grammar JSON

use serde::Serialize;

use crate::error::GrammarError;
use crate::grammar::{Combinator, GrammarNode, NodeId, NodeKind, UiVariant};
use crate::workspace::Workspace;

/// Which audience a serialized grammar is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Persistence and round trips; keeps block flavors.
    Internal,
    /// Tokenizer requests; logical structure only.
    External,
}

/// One node of canonical grammar JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalGrammar {
    pub parser: NodeKind,
    #[serde(rename = "uiParser", skip_serializing_if = "Option::is_none")]
    pub ui_parser: Option<UiVariant>,
    pub args: CanonicalArgs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalArgs {
    pub id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsers: Option<Vec<CanonicalGrammar>>,
}

impl CanonicalGrammar {
    pub fn to_value(&self) -> serde_json::Value {
        // Plain strings, integers and vectors only; this cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Copy of this grammar with every `uiParser` removed.
    pub fn without_presentation(&self) -> CanonicalGrammar {
        CanonicalGrammar {
            parser: self.parser,
            ui_parser: None,
            args: CanonicalArgs {
                parsers: self.args.parsers.as_ref().map(|parsers| {
                    parsers
                        .iter()
                        .map(CanonicalGrammar::without_presentation)
                        .collect()
                }),
                ..self.args.clone()
            },
        }
    }
}

/// Serialize the workspace's root tree.
///
/// External mode refuses anything but a sequence root, so a known-invalid
/// grammar never leaves the editor.
pub fn to_grammar(workspace: &Workspace, mode: Mode) -> Result<CanonicalGrammar, GrammarError> {
    let root = workspace
        .root()
        .ok_or(GrammarError::InvalidRoot { found: None })?;
    if mode == Mode::External && root.kind() != NodeKind::Sequence {
        return Err(GrammarError::InvalidRoot {
            found: Some(root.kind()),
        });
    }
    let tree = workspace.snapshot(&root.id)?;
    Ok(encode_tree(&tree, mode))
}

/// Serialize every top-level block in internal mode, root first.
pub fn encode_workspace(workspace: &Workspace) -> Result<Vec<CanonicalGrammar>, GrammarError> {
    workspace
        .top_level()
        .iter()
        .map(|id| Ok(encode_tree(&workspace.snapshot(id)?, Mode::Internal)))
        .collect()
}

/// Serialize a detached tree, treating `tree` as the root position.
pub fn encode_tree(tree: &GrammarNode, mode: Mode) -> CanonicalGrammar {
    encode_node(tree, true, mode)
}

fn encode_node(node: &GrammarNode, at_root: bool, mode: Mode) -> CanonicalGrammar {
    let kind = node.kind();
    let ui_parser = match mode {
        Mode::External => None,
        Mode::Internal if at_root => Some(node.ui_variant.clone()),
        Mode::Internal if node.ui_variant != UiVariant::default_for(kind, false) => {
            Some(node.ui_variant.clone())
        }
        Mode::Internal => None,
    };

    let mut args = CanonicalArgs {
        id: node.id.clone(),
        s: None,
        type_name: None,
        length: None,
        parsers: None,
    };
    match &node.combinator {
        Combinator::String { pattern, type_name } => {
            args.s = Some(pattern.clone());
            args.type_name = Some(type_name.clone());
        }
        Combinator::Rest { type_name } => {
            args.type_name = Some(type_name.clone());
        }
        Combinator::SubstringN { length, type_name } => {
            args.length = Some(*length);
            args.type_name = Some(type_name.clone());
        }
        Combinator::Choice | Combinator::Sequence => {
            args.parsers = Some(
                node.children()
                    .iter()
                    .map(|child| encode_node(child, false, mode))
                    .collect(),
            );
        }
    }

    CanonicalGrammar {
        parser: kind,
        ui_parser,
        args,
    }
}
