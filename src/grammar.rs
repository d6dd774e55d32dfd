//! Grammar model
//!
//! The logical side of a point-label grammar: the closed set of combinator
//! kinds, their validated fields, stable node ids, and the owned tree form
//! used for detached subtrees, round-trip comparison and evaluation.
//!
//! Presentation lives beside the logic, never inside it: every node carries
//! a [`UiVariant`] naming the editor block flavor it was built from, but all
//! semantics branch on [`NodeKind`] alone.

pub mod node;
pub mod variant;
pub mod visitor;

pub use node::{Combinator, GrammarNode, NodeId, NodeKind};
pub use variant::UiVariant;
pub use visitor::{walk_pre_order, GrammarVisitor};
