//! Edit requests accepted by the workspace

use crate::error::ValidationError;
use crate::grammar::node::{non_empty, positive_length};
use crate::grammar::{Combinator, NodeId};

/// Where a block goes when it is connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub parent: NodeId,
    /// Child slot; `None` appends after the last child.
    pub index: Option<usize>,
}

impl Attachment {
    pub fn append(parent: NodeId) -> Self {
        Attachment {
            parent,
            index: None,
        }
    }

    pub fn at(parent: NodeId, index: usize) -> Self {
        Attachment {
            parent,
            index: Some(index),
        }
    }
}

/// A single field change on a leaf block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Pattern(String),
    TypeName(String),
    Length(i64),
}

impl FieldEdit {
    fn field(&self) -> &'static str {
        match self {
            FieldEdit::Pattern(_) => "s",
            FieldEdit::TypeName(_) => "type_name",
            FieldEdit::Length(_) => "length",
        }
    }

    /// The combinator with this edit applied, or the reason it cannot be.
    pub fn apply(&self, current: &Combinator) -> Result<Combinator, ValidationError> {
        let mut updated = current.clone();
        match (&mut updated, self) {
            (Combinator::String { pattern, .. }, FieldEdit::Pattern(value)) => {
                *pattern = non_empty("s", value.clone())?;
            }
            (
                Combinator::String { type_name, .. }
                | Combinator::Rest { type_name }
                | Combinator::SubstringN { type_name, .. },
                FieldEdit::TypeName(value),
            ) => {
                *type_name = non_empty("type_name", value.clone())?;
            }
            (Combinator::SubstringN { length, .. }, FieldEdit::Length(value)) => {
                *length = positive_length(*value)?;
            }
            (other, edit) => {
                return Err(ValidationError::FieldNotApplicable {
                    field: edit.field(),
                    kind: other.kind(),
                })
            }
        }
        Ok(updated)
    }
}
