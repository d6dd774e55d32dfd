//! Token → block correlation
//!
//! Selecting a token in the results view lights up the grammar block that
//! produced it. Correlation is a lookup in the workspace index and nothing
//! more: the tree is never touched, and a token whose block has since been
//! deleted simply highlights nothing.

use crate::grammar::NodeId;
use crate::tokenizer::Token;
use crate::workspace::{Workspace, WorkspaceNode};

/// Receives the block to emphasise.
pub trait HighlightSink {
    fn highlight(&mut self, node: &WorkspaceNode);
}

impl<F> HighlightSink for F
where
    F: FnMut(&WorkspaceNode),
{
    fn highlight(&mut self, node: &WorkspaceNode) {
        self(node)
    }
}

/// Highlight the block with `id`. Returns whether one was found.
pub fn highlight_node(
    workspace: &Workspace,
    id: Option<&NodeId>,
    sink: &mut dyn HighlightSink,
) -> bool {
    let Some(id) = id else {
        return false;
    };
    match workspace.get(id) {
        Some(node) => {
            sink.highlight(node);
            true
        }
        None => {
            log::debug!("no block `{}` to highlight", id);
            false
        }
    }
}

/// Highlight the block that produced `token`.
pub fn highlight(workspace: &Workspace, token: &Token, sink: &mut dyn HighlightSink) -> bool {
    highlight_node(workspace, token.source_node_id.as_ref(), sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarNode;

    fn token(id: Option<&str>) -> Token {
        Token {
            value: "AHU".into(),
            length: 3,
            type_name: "Equip".into(),
            source_node_id: id.map(NodeId::new),
            error: None,
        }
    }

    fn workspace() -> Workspace {
        Workspace::from_tree(GrammarNode::sequence(
            NodeId::new("root"),
            vec![GrammarNode::string(NodeId::new("a"), "AHU", "Equip").unwrap()],
        ))
        .unwrap()
    }

    #[test]
    fn live_block_is_highlighted() {
        let workspace = workspace();
        let mut seen = Vec::new();
        let found = highlight(&workspace, &token(Some("a")), &mut |node: &WorkspaceNode| {
            seen.push(node.id.clone())
        });
        assert!(found);
        assert_eq!(seen, vec![NodeId::new("a")]);
    }

    #[test]
    fn deleted_block_is_a_no_op() {
        let mut workspace = workspace();
        workspace.delete(&NodeId::new("a")).unwrap();
        let before = workspace.snapshot(&NodeId::new("root")).unwrap();

        let mut calls = 0;
        let found = highlight(&workspace, &token(Some("a")), &mut |_: &WorkspaceNode| calls += 1);
        assert!(!found);
        assert_eq!(calls, 0);
        assert_eq!(workspace.snapshot(&NodeId::new("root")).unwrap(), before);
    }

    #[test]
    fn token_without_source_highlights_nothing() {
        let workspace = workspace();
        let mut calls = 0;
        assert!(!highlight(&workspace, &token(None), &mut |_: &WorkspaceNode| calls += 1));
        assert_eq!(calls, 0);
    }
}
