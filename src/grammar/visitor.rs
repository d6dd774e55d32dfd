//! Depth-first pre-order traversal of a grammar tree

use super::node::GrammarNode;

/// Visitor for [`walk_pre_order`].
///
/// `depth` is 0 for the node the walk starts from. Return `false` from
/// `enter` to skip a node's children.
pub trait GrammarVisitor {
    fn enter(&mut self, node: &GrammarNode, depth: usize) -> bool;
}

impl<F> GrammarVisitor for F
where
    F: FnMut(&GrammarNode, usize) -> bool,
{
    fn enter(&mut self, node: &GrammarNode, depth: usize) -> bool {
        self(node, depth)
    }
}

pub fn walk_pre_order(root: &GrammarNode, visitor: &mut dyn GrammarVisitor) {
    walk(root, 0, visitor);
}

fn walk(node: &GrammarNode, depth: usize, visitor: &mut dyn GrammarVisitor) {
    if !visitor.enter(node, depth) {
        return;
    }
    for child in node.children() {
        walk(child, depth + 1, visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::NodeId;

    fn sample() -> GrammarNode {
        GrammarNode::sequence(
            NodeId::new("root"),
            vec![
                GrammarNode::choice(
                    NodeId::new("choice"),
                    vec![
                        GrammarNode::string(NodeId::new("a"), "A", "TypeX").unwrap(),
                        GrammarNode::string(NodeId::new("b"), "B", "TypeY").unwrap(),
                    ],
                ),
                GrammarNode::rest(NodeId::new("tail"), "Tail").unwrap(),
            ],
        )
    }

    #[test]
    fn visits_in_pre_order() {
        let mut seen = Vec::new();
        walk_pre_order(&sample(), &mut |node: &GrammarNode, depth: usize| {
            seen.push((node.id.to_string(), depth));
            true
        });
        assert_eq!(
            seen,
            vec![
                ("root".to_string(), 0),
                ("choice".to_string(), 1),
                ("a".to_string(), 2),
                ("b".to_string(), 2),
                ("tail".to_string(), 1),
            ]
        );
    }

    #[test]
    fn returning_false_prunes_children() {
        let mut seen = Vec::new();
        walk_pre_order(&sample(), &mut |node: &GrammarNode, _depth: usize| {
            seen.push(node.id.to_string());
            node.id.as_str() != "choice"
        });
        assert_eq!(seen, vec!["root", "choice", "tail"]);
    }
}
