//! Error taxonomy for the grammar workbench
//!
//! Structural errors (`ValidationError`, `WorkspaceError`, `GrammarError`) are
//! resolved before anything is sent to a tokenizer. Remote errors are reported
//! per evaluation batch. `PersistenceError` never reaches the user; the
//! persistence port logs it and carries on.

use thiserror::Error;

use crate::grammar::{NodeId, NodeKind};

/// A node's own fields violate a local invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field `{field}` must not be empty")]
    EmptyField { field: &'static str },

    #[error("field `length` must be greater than zero, got {value}")]
    NonPositiveLength { value: i64 },

    #[error("field `{field}` does not apply to a {kind} node")]
    FieldNotApplicable { field: &'static str, kind: NodeKind },

    #[error("a {kind} node cannot hold children")]
    NotAContainer { kind: NodeKind },

    #[error("block flavor `{variant}` does not denote a {kind} node")]
    VariantMismatch { variant: String, kind: NodeKind },
}

/// A structural edit of the workspace was rejected. The tree is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    #[error("no node with id `{0}` in the workspace")]
    UnknownNode(NodeId),

    #[error("node `{id}` is a {kind} and has no child slot")]
    NotAContainer { id: NodeId, kind: NodeKind },

    #[error("node `{0}` is already attached to a parent")]
    AlreadyAttached(NodeId),

    #[error("attaching `{child}` under `{parent}` would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },

    #[error("a rest node must be the last child of `{parent}`")]
    RestNotLast { parent: NodeId },

    #[error("child index {index} is out of range for `{parent}` ({len} children)")]
    IndexOutOfRange {
        parent: NodeId,
        index: usize,
        len: usize,
    },

    #[error("id `{0}` is already in use")]
    DuplicateId(NodeId),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Canonical grammar JSON could not be turned into a tree, or a tree cannot be
/// serialized for evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("malformed grammar at {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("unknown combinator `{0}`")]
    UnknownCombinator(String),

    #[error("grammar root must be a sequence, found {}", describe_root(.found))]
    InvalidRoot { found: Option<NodeKind> },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

fn describe_root(found: &Option<NodeKind>) -> String {
    match found {
        Some(kind) => format!("a {} node", kind),
        None => "an empty workspace".to_string(),
    }
}

/// Failure reported by a tokenizer transport for a single attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Network or timeout class failure; worth retrying.
    #[error("transient tokenizer failure: {0}")]
    Transient(String),

    /// The tokenizer refused the request; retrying will not help.
    #[error("tokenizer rejected the request: {0}")]
    Rejected(String),
}

/// Batch-level evaluation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("tokenizer rejected the batch: {0}")]
    Rejected(String),

    #[error("evaluation failed after {attempts} attempts: {last_error}")]
    EvaluationFailed { attempts: u32, last_error: String },

    #[error("tokenizer returned {got} results for {expected} point labels")]
    MisalignedResponse { expected: usize, got: usize },
}

/// Storage read/write failure. Logged, never surfaced.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A two-column import table could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("line {line}: expected `pattern,type_name`, got `{content}`")]
    MalformedRow { line: usize, content: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}
