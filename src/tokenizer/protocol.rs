//! Request and response shapes
//!
//! The wire shapes mirror the tokenizer service JSON exactly. The domain
//! shapes are what the rest of the crate works with: nullable wire fields
//! are flattened and the producing node id is typed.

use serde::{Deserialize, Serialize};

use crate::corpus::TestCorpus;
use crate::grammar::NodeId;
use crate::serializer::CanonicalGrammar;

/// Body of a tokenizer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationRequest {
    pub point_labels: Vec<String>,
    pub parsers: CanonicalGrammar,
}

impl EvaluationRequest {
    /// Build a request for `corpus`. Block flavors are stripped from the
    /// grammar whatever mode it was encoded in.
    pub fn new(grammar: &CanonicalGrammar, corpus: &TestCorpus) -> Self {
        EvaluationRequest {
            point_labels: corpus.labels().to_vec(),
            parsers: grammar.without_presentation(),
        }
    }
}

/// One element of the tokenizer response array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireResult {
    pub success: bool,
    #[serde(rename = "_errors", default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub tokens: Vec<WireToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireToken {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    pub length: usize,
    #[serde(default)]
    pub id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of tokenizing one point label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenizationResult {
    pub success: bool,
    pub errors: Vec<String>,
    pub tokens: Vec<Token>,
}

/// A typed substring, or the error recorded where matching stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub value: String,
    pub length: usize,
    pub type_name: String,
    /// Grammar node that produced this token, when the tokenizer said so.
    pub source_node_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Token {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl From<WireToken> for Token {
    fn from(wire: WireToken) -> Self {
        Token {
            value: wire.value.unwrap_or_default(),
            length: wire.length,
            type_name: wire.token.unwrap_or_default(),
            source_node_id: wire.id,
            error: wire.error,
        }
    }
}

impl From<WireResult> for TokenizationResult {
    fn from(wire: WireResult) -> Self {
        TokenizationResult {
            success: wire.success,
            errors: wire.errors,
            tokens: wire.tokens.into_iter().map(Token::from).collect(),
        }
    }
}
