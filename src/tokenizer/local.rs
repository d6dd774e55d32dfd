//! In-process tokenizer
//!
//! Runs the combinators directly instead of calling out to a service. Used
//! by the CLI and as a reference backend in tests. Matching is greedy and
//! never backtracks: a choice commits to the first alternative that matches
//! without error, and a sequence stops at its first failing child.
//!
//! Lengths count characters, not bytes.
//!
//! A label succeeds only when no combinator reported an error *and* the
//! tokens cover the whole label. This is stricter than the hosted
//! tokenizer, which compares the consumed length alone: there, a grammar
//! that consumes everything and then fails on a trailing literal still
//! reports success. Here it does not.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::grammar::{Combinator, GrammarNode, NodeId};
use crate::serializer::from_grammar;
use crate::tokenizer::client::Transport;
use crate::tokenizer::protocol::{EvaluationRequest, WireResult, WireToken};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEvaluator;

#[async_trait]
impl Transport for LocalEvaluator {
    async fn send(&self, request: &EvaluationRequest) -> Result<Vec<WireResult>, TransportError> {
        let value = serde_json::to_value(&request.parsers)
            .map_err(|err| TransportError::Rejected(err.to_string()))?;
        let grammar = from_grammar(&value).map_err(|err| TransportError::Rejected(err.to_string()))?;
        Ok(request
            .point_labels
            .iter()
            .map(|label| evaluate(&grammar, label))
            .collect())
    }
}

/// A consumed prefix, or the error that stopped matching.
#[derive(Debug)]
struct Piece {
    value: Option<String>,
    type_name: Option<String>,
    length: usize,
    id: NodeId,
    error: Option<String>,
}

impl Piece {
    fn matched(node: &GrammarNode, value: &str, type_name: &str) -> Self {
        Piece {
            value: Some(value.to_string()),
            type_name: Some(type_name.to_string()),
            length: value.chars().count(),
            id: node.id.clone(),
            error: None,
        }
    }

    fn failed(node: &GrammarNode, error: String) -> Self {
        Piece {
            value: None,
            type_name: None,
            length: 0,
            id: node.id.clone(),
            error: Some(error),
        }
    }

    fn consumed_bytes(&self) -> usize {
        self.value.as_ref().map_or(0, String::len)
    }
}

/// Tokenize one label.
///
/// The label succeeds when no combinator reported an error and the tokens
/// cover it completely.
pub fn evaluate(grammar: &GrammarNode, label: &str) -> WireResult {
    let pieces = run(grammar, label);
    let consumed: usize = pieces.iter().map(|piece| piece.length).sum();
    let errors: Vec<String> = pieces.iter().filter_map(|piece| piece.error.clone()).collect();
    let success = errors.is_empty() && consumed == label.chars().count();
    WireResult {
        success,
        errors,
        tokens: pieces
            .into_iter()
            .map(|piece| WireToken {
                token: piece.type_name,
                value: piece.value,
                length: piece.length,
                id: Some(piece.id),
                error: piece.error,
            })
            .collect(),
    }
}

fn run(node: &GrammarNode, target: &str) -> Vec<Piece> {
    match &node.combinator {
        Combinator::String { pattern, type_name } => {
            if target.starts_with(pattern.as_str()) {
                vec![Piece::matched(node, pattern, type_name)]
            } else {
                let got = char_prefix(target, pattern.chars().count());
                vec![Piece::failed(node, format!("Expected {}, got {}", pattern, got))]
            }
        }
        Combinator::Rest { type_name } => vec![Piece::matched(node, target, type_name)],
        Combinator::SubstringN { length, type_name } => {
            let taken = char_prefix(target, *length);
            if taken.chars().count() == *length {
                vec![Piece::matched(node, taken, type_name)]
            } else {
                vec![Piece::failed(
                    node,
                    format!("Expected {} characters, got {}", length, taken),
                )]
            }
        }
        Combinator::Choice => {
            let mut errors = Vec::new();
            for child in node.children() {
                let pieces = run(child, target);
                match pieces.iter().find_map(|piece| piece.error.clone()) {
                    None if !pieces.is_empty() => return pieces,
                    None => {}
                    Some(error) => errors.push(error),
                }
            }
            vec![Piece::failed(node, errors.join(" | "))]
        }
        Combinator::Sequence => {
            let mut pieces = Vec::new();
            let mut remaining = target;
            for child in node.children() {
                let produced = run(child, remaining);
                let failed = produced.iter().any(|piece| piece.error.is_some());
                let advance: usize = produced.iter().map(Piece::consumed_bytes).sum();
                pieces.extend(produced);
                if failed {
                    break;
                }
                remaining = &remaining[advance..];
            }
            pieces
        }
    }
}

/// Up to `count` leading characters of `text`.
fn char_prefix(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> NodeId {
        NodeId::new(raw)
    }

    fn abbreviations() -> GrammarNode {
        GrammarNode::sequence(
            id("root"),
            vec![
                GrammarNode::choice(
                    id("choice"),
                    vec![
                        GrammarNode::string(id("a"), "A", "TypeX").unwrap(),
                        GrammarNode::string(id("b"), "B", "TypeY").unwrap(),
                    ],
                ),
                GrammarNode::rest(id("tail"), "Tail").unwrap(),
            ],
        )
    }

    #[test]
    fn choice_commits_to_first_clean_alternative() {
        let result = evaluate(&abbreviations(), "Bxyz");
        assert!(result.success);
        assert!(result.errors.is_empty());
        let tokens: Vec<_> = result
            .tokens
            .iter()
            .map(|t| (t.value.as_deref(), t.token.as_deref(), t.length, t.id.clone()))
            .collect();
        assert_eq!(
            tokens,
            vec![
                (Some("B"), Some("TypeY"), 1, Some(id("b"))),
                (Some("xyz"), Some("Tail"), 3, Some(id("tail"))),
            ]
        );
    }

    #[test]
    fn failed_choice_joins_alternative_errors() {
        let result = evaluate(&abbreviations(), "Czzz");
        assert!(!result.success);
        assert_eq!(result.errors, vec!["Expected A, got C | Expected B, got C"]);
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].id, Some(id("choice")));
        assert_eq!(result.tokens[0].value, None);
    }

    #[test]
    fn unconsumed_input_is_not_a_success() {
        let grammar = GrammarNode::sequence(
            id("root"),
            vec![GrammarNode::substring_n(id("n"), 2, "Num").unwrap()],
        );
        let result = evaluate(&grammar, "123");
        assert!(result.errors.is_empty());
        assert!(!result.success);
    }

    #[test]
    fn error_after_full_consumption_is_not_a_success() {
        let grammar = GrammarNode::sequence(
            id("root"),
            vec![
                GrammarNode::substring_n(id("n"), 2, "Num").unwrap(),
                GrammarNode::string(id("x"), "X", "Suffix").unwrap(),
            ],
        );
        let result = evaluate(&grammar, "12");
        let consumed: usize = result.tokens.iter().map(|t| t.length).sum();
        assert_eq!(consumed, 2);
        assert_eq!(result.errors, vec!["Expected X, got "]);
        assert!(!result.success);
    }

    #[test]
    fn short_input_fails_substring() {
        let grammar = GrammarNode::sequence(
            id("root"),
            vec![GrammarNode::substring_n(id("n"), 4, "Num").unwrap()],
        );
        let result = evaluate(&grammar, "12");
        assert_eq!(result.errors, vec!["Expected 4 characters, got 12"]);
    }

    #[test]
    fn lengths_count_characters() {
        let grammar = GrammarNode::sequence(
            id("root"),
            vec![
                GrammarNode::substring_n(id("n"), 2, "Deg").unwrap(),
                GrammarNode::rest(id("tail"), "Tail").unwrap(),
            ],
        );
        let result = evaluate(&grammar, "°CΩ");
        assert!(result.success);
        assert_eq!(result.tokens[0].value.as_deref(), Some("°C"));
        assert_eq!(result.tokens[0].length, 2);
        assert_eq!(result.tokens[1].value.as_deref(), Some("Ω"));
    }

    #[tokio::test]
    async fn transport_answers_in_input_order() {
        use crate::corpus::TestCorpus;
        use crate::serializer::{encode_tree, Mode};

        let grammar = encode_tree(&abbreviations(), Mode::External);
        let corpus = TestCorpus::new(vec!["Czzz".into(), "Axy".into()]);
        let results = LocalEvaluator
            .send(&EvaluationRequest::new(&grammar, &corpus))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[1].success);
    }
}
