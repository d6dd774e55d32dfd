//! Grammar serializer
//!
//! Converts between the workspace tree and canonical grammar JSON:
//!
//! ```text
//! { "parser": "sequence", "uiParser": "sequence",
//!   "args": { "id": "..", "parsers": [ { "parser": "string", "args": { .. } } ] } }
//! ```
//!
//! Two encodings exist. [`Mode::Internal`] is what the editor persists: it
//! keeps `uiParser` so the exact block flavors come back on load.
//! [`Mode::External`] is what a tokenizer receives: logical structure only,
//! rooted at a sequence.
//!
//! Batch import of `(pattern, type_name)` tables lives in [`batch`].

pub mod batch;
pub mod canonical;
pub mod decode;

pub use batch::{choice_from_pairs, import_pairs, parse_table};
pub use canonical::{encode_tree, encode_workspace, to_grammar, CanonicalArgs, CanonicalGrammar, Mode};
pub use decode::{from_grammar, from_grammar_str};
