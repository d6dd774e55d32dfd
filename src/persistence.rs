//! Persistence port
//!
//! Editor state is kept as two independent blobs in a key-value [`Store`]:
//!
//! - `state`: the workspace root in internal-mode canonical grammar JSON,
//!   or an array of such grammars (root first) while loose blocks sit
//!   beside the root
//! - `pointLabels`: the test corpus as a JSON array of strings
//!
//! Saving is best-effort. A failed write is logged and forgotten; the edit
//! that triggered it has already happened. Loading never fails either:
//! anything unreadable is logged and treated as "no prior state".

pub mod file;
pub mod memory;

use serde_json::Value;

use crate::corpus::TestCorpus;
use crate::error::{GrammarError, PersistenceError};
use crate::serializer::{encode_workspace, from_grammar};
use crate::workspace::Workspace;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const STATE_KEY: &str = "state";
pub const POINT_LABELS_KEY: &str = "pointLabels";

/// Durable key-value storage.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// Editor state recovered by [`Persistence::load`].
#[derive(Debug, Default)]
pub struct Restored {
    pub workspace: Workspace,
    pub corpus: TestCorpus,
}

pub struct Persistence<S> {
    store: S,
}

impl<S: Store> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Snapshot the workspace and the corpus.
    pub fn save(&mut self, workspace: &Workspace, corpus: &TestCorpus) {
        if let Err(err) = self.save_workspace(workspace) {
            log::warn!("could not save workspace: {}", err);
        }
        if let Err(err) = self.save_corpus(corpus) {
            log::warn!("could not save point labels: {}", err);
        }
    }

    fn save_workspace(&mut self, workspace: &Workspace) -> Result<(), PersistenceError> {
        let blocks = match encode_workspace(workspace) {
            Ok(blocks) => blocks,
            Err(err) => {
                // Only reachable when the arena and its snapshots disagree.
                log::warn!("workspace not saved: {}", err);
                return Ok(());
            }
        };
        let encoded = match blocks.as_slice() {
            [] => return self.store.remove(STATE_KEY),
            [root] => serde_json::to_string(root),
            _ => serde_json::to_string(&blocks),
        };
        let text = encoded.map_err(|source| PersistenceError::Encode {
            key: STATE_KEY.to_string(),
            source,
        })?;
        self.store.set(STATE_KEY, &text)
    }

    fn save_corpus(&mut self, corpus: &TestCorpus) -> Result<(), PersistenceError> {
        let text = serde_json::to_string(corpus).map_err(|source| PersistenceError::Encode {
            key: POINT_LABELS_KEY.to_string(),
            source,
        })?;
        self.store.set(POINT_LABELS_KEY, &text)
    }

    /// Restore the last saved state, falling back to empty pieces.
    pub fn load(&self) -> Restored {
        let restored = Restored {
            workspace: self.load_workspace().unwrap_or_default(),
            corpus: self.load_corpus().unwrap_or_default(),
        };
        log::info!(
            "restored {} blocks and {} point labels",
            restored.workspace.len(),
            restored.corpus.len()
        );
        restored
    }

    fn load_workspace(&self) -> Option<Workspace> {
        let text = self.read(STATE_KEY)?;
        match decode_state(&text) {
            Ok(workspace) => Some(workspace),
            Err(err) => {
                log::warn!("discarding saved workspace: {}", err);
                None
            }
        }
    }

    fn load_corpus(&self) -> Option<TestCorpus> {
        let text = self.read(POINT_LABELS_KEY)?;
        match serde_json::from_str(&text) {
            Ok(corpus) => Some(corpus),
            Err(err) => {
                log::warn!("discarding saved point labels: {}", err);
                None
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("could not read `{}`: {}", key, err);
                None
            }
        }
    }
}

fn decode_state(text: &str) -> Result<Workspace, GrammarError> {
    let value: Value = serde_json::from_str(text).map_err(|err| GrammarError::Malformed {
        path: "$".to_string(),
        reason: err.to_string(),
    })?;
    let blocks = match value {
        Value::Array(blocks) => blocks,
        root => vec![root],
    };
    let mut workspace = Workspace::new();
    for block in &blocks {
        workspace.insert_tree(from_grammar(block)?, None)?;
    }
    Ok(workspace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarNode, NodeId};
    use std::io;

    fn sample_workspace() -> Workspace {
        Workspace::from_tree(GrammarNode::sequence(
            NodeId::new("root"),
            vec![
                GrammarNode::string(NodeId::new("a"), "AHU", "Equip").unwrap(),
                GrammarNode::rest(NodeId::new("tail"), "Point").unwrap(),
            ],
        ))
        .unwrap()
    }

    #[test]
    fn saved_state_loads_back() {
        let mut persistence = Persistence::new(MemoryStore::default());
        let workspace = sample_workspace();
        let corpus = TestCorpus::new(vec!["AHU1".into(), "AHU2".into()]);
        persistence.save(&workspace, &corpus);

        let restored = persistence.load();
        assert_eq!(restored.corpus, corpus);
        assert_eq!(
            restored.workspace.snapshot(&NodeId::new("root")).unwrap(),
            workspace.snapshot(&NodeId::new("root")).unwrap()
        );
    }

    #[test]
    fn single_root_is_stored_as_one_grammar() {
        let mut persistence = Persistence::new(MemoryStore::default());
        persistence.save(&sample_workspace(), &TestCorpus::default());
        let text = persistence.store().get(STATE_KEY).unwrap().unwrap();
        assert!(text.starts_with(r#"{"parser":"sequence""#), "{}", text);
    }

    #[test]
    fn loose_blocks_survive_a_reload() {
        let mut workspace = sample_workspace();
        let loose = workspace
            .add_block(crate::grammar::Combinator::rest("Spare").unwrap(), None)
            .unwrap();
        let mut persistence = Persistence::new(MemoryStore::default());
        persistence.save(&workspace, &TestCorpus::default());

        let restored = persistence.load().workspace;
        assert_eq!(restored.top_level(), &[NodeId::new("root"), loose.clone()]);
        assert_eq!(
            restored.snapshot(&loose).unwrap(),
            workspace.snapshot(&loose).unwrap()
        );
        assert_eq!(restored.root().unwrap().id, NodeId::new("root"));
    }

    #[test]
    fn empty_workspace_clears_state_key() {
        let mut persistence = Persistence::new(MemoryStore::default());
        persistence.save(&sample_workspace(), &TestCorpus::default());
        assert!(persistence.store().contains(STATE_KEY));

        persistence.save(&Workspace::new(), &TestCorpus::default());
        assert!(!persistence.store().contains(STATE_KEY));
        assert!(persistence.store().contains(POINT_LABELS_KEY));
    }

    #[test]
    fn corrupt_state_loads_as_empty() {
        let mut store = MemoryStore::default();
        store
            .set(STATE_KEY, r#"{"parser":"regex","args":{"id":"x"}}"#)
            .unwrap();
        store.set(POINT_LABELS_KEY, r#"["AHU1"]"#).unwrap();
        let restored = Persistence::new(store).load();
        assert!(restored.workspace.is_empty());
        assert_eq!(restored.corpus.labels(), &["AHU1"]);
    }

    #[test]
    fn legacy_block_shape_loads_as_empty() {
        let mut store = MemoryStore::default();
        store
            .set(
                STATE_KEY,
                r#"{"name":"sequence","args":{"id":"x","parsers":[]}}"#,
            )
            .unwrap();
        store.set(POINT_LABELS_KEY, "not json").unwrap();
        let restored = Persistence::new(store).load();
        assert!(restored.workspace.is_empty());
        assert!(restored.corpus.is_empty());
    }

    struct BrokenStore;

    impl Store for BrokenStore {
        fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            Err(PersistenceError::Io {
                key: key.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            })
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), PersistenceError> {
            self.get(key).map(|_| ())
        }

        fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
            self.get(key).map(|_| ())
        }
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let mut persistence = Persistence::new(BrokenStore);
        persistence.save(&sample_workspace(), &TestCorpus::default());
        let restored = persistence.load();
        assert!(restored.workspace.is_empty());
        assert!(restored.corpus.is_empty());
    }
}
