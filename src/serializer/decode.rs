//! Canonical grammar JSON → tree
//!
//! Only the canonical shape is accepted. Anything else found in older
//! persisted data (a `name` key in place of `parser`, stray block fields in
//! `args`) is reported as malformed rather than coerced.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{GrammarError, ValidationError};
use crate::grammar::{Combinator, GrammarNode, NodeId, NodeKind, UiVariant};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StringArgs {
    id: NodeId,
    s: String,
    type_name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RestArgs {
    id: NodeId,
    type_name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SubstringArgs {
    id: NodeId,
    length: i64,
    type_name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ContainerArgs {
    id: NodeId,
    parsers: Vec<Value>,
}

/// Rebuild a tree from canonical grammar JSON.
pub fn from_grammar(value: &Value) -> Result<GrammarNode, GrammarError> {
    decode_node(value, "$", true)
}

pub fn from_grammar_str(text: &str) -> Result<GrammarNode, GrammarError> {
    let value: Value = serde_json::from_str(text).map_err(|err| GrammarError::Malformed {
        path: "$".to_string(),
        reason: err.to_string(),
    })?;
    from_grammar(&value)
}

fn decode_node(value: &Value, path: &str, at_root: bool) -> Result<GrammarNode, GrammarError> {
    let object = value
        .as_object()
        .ok_or_else(|| malformed(path, "expected a grammar object"))?;
    if let Some(key) = object
        .keys()
        .find(|key| !matches!(key.as_str(), "parser" | "args" | "uiParser"))
    {
        return Err(malformed(path, format!("unexpected key `{}`", key)));
    }

    let parser = match object.get("parser") {
        Some(Value::String(parser)) => parser,
        Some(_) => return Err(malformed(path, "`parser` must be a string")),
        None => return Err(malformed(path, "missing field `parser`")),
    };
    let kind = NodeKind::from_wire_name(parser)
        .ok_or_else(|| GrammarError::UnknownCombinator(parser.clone()))?;

    let recorded = match object.get("uiParser") {
        Some(Value::String(tag)) => Some(UiVariant::new(tag.as_str())),
        Some(_) => return Err(malformed(path, "`uiParser` must be a string")),
        None => None,
    };
    // A sequence's flavor is decided by where it sits, nothing else.
    let ui_variant = match (kind, recorded) {
        (NodeKind::Sequence, _) | (_, None) => UiVariant::default_for(kind, at_root),
        (_, Some(tag)) => tag,
    };
    if !ui_variant.denotes(kind) {
        return Err(ValidationError::VariantMismatch {
            variant: ui_variant.to_string(),
            kind,
        }
        .into());
    }

    let args = object
        .get("args")
        .ok_or_else(|| malformed(path, "missing field `args`"))?;
    let node = match kind {
        NodeKind::String => {
            let args: StringArgs = decode_args(args, path)?;
            GrammarNode::leaf(args.id, ui_variant, Combinator::string(args.s, args.type_name)?)
        }
        NodeKind::Rest => {
            let args: RestArgs = decode_args(args, path)?;
            GrammarNode::leaf(args.id, ui_variant, Combinator::rest(args.type_name)?)
        }
        NodeKind::SubstringN => {
            let args: SubstringArgs = decode_args(args, path)?;
            let combinator = Combinator::substring_n(args.length, args.type_name)?;
            GrammarNode::leaf(args.id, ui_variant, combinator)
        }
        NodeKind::Choice | NodeKind::Sequence => {
            let args: ContainerArgs = decode_args(args, path)?;
            let combinator = if kind == NodeKind::Choice {
                Combinator::Choice
            } else {
                Combinator::Sequence
            };
            let mut node = GrammarNode::leaf(args.id, ui_variant, combinator);
            for (index, child) in args.parsers.iter().enumerate() {
                let child_path = format!("{}.args.parsers[{}]", path, index);
                node.push(decode_node(child, &child_path, false)?)?;
            }
            node
        }
    };
    Ok(node)
}

fn decode_args<T: DeserializeOwned>(args: &Value, path: &str) -> Result<T, GrammarError> {
    T::deserialize(args).map_err(|err| malformed(&format!("{}.args", path), err.to_string()))
}

fn malformed(path: &str, reason: impl Into<String>) -> GrammarError {
    GrammarError::Malformed {
        path: path.to_string(),
        reason: reason.into(),
    }
}
