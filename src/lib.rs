//! # pointlabel
//!
//! A workbench for point-label grammars: small combinator trees that split
//! abbreviated building-automation names (`AHU-1_SAT`) into typed tokens.
//!
//! The pieces, leaf first:
//!
//! - [`grammar`]: combinator kinds, validated fields and the owned tree form
//! - [`workspace`]: the editable arena tree with its `id → node` index
//! - [`serializer`]: tree ⇄ canonical grammar JSON, plus batch import
//! - [`persistence`]: best-effort snapshots behind a key-value [`persistence::Store`]
//! - [`tokenizer`]: retrying client for an external tokenizer, and an
//!   in-process evaluator
//! - [`highlight`]: token → block correlation
//! - [`editor`]: the session that owns all of the above

pub mod config;
pub mod corpus;
pub mod editor;
pub mod error;
pub mod grammar;
pub mod highlight;
pub mod persistence;
pub mod serializer;
pub mod tokenizer;
pub mod workspace;

pub use corpus::TestCorpus;
pub use editor::Editor;
pub use error::{
    EvaluationError, GrammarError, ImportError, PersistenceError, TransportError, ValidationError,
    WorkspaceError,
};
pub use grammar::{Combinator, GrammarNode, NodeId, NodeKind, UiVariant};
pub use serializer::{from_grammar, to_grammar, CanonicalGrammar, Mode};
pub use tokenizer::{TokenizationResult, TokenizerClient};
pub use workspace::Workspace;
