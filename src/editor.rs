//! Editor session
//!
//! One [`Editor`] owns everything a user works on: the workspace, the test
//! corpus, the persistence port and the evaluation sequencer. Callers get
//! shared access for reading and go through the editor for anything that
//! changes state, so every meaningful change is followed by a save.

use crate::corpus::TestCorpus;
use crate::error::{EvaluationError, GrammarError, ImportError};
use crate::grammar::{NodeId, UiVariant};
use crate::highlight::{self, HighlightSink};
use crate::persistence::{Persistence, Restored, Store};
use crate::serializer::{self, from_grammar_str, to_grammar, CanonicalGrammar, Mode};
use crate::tokenizer::{
    EvaluationRequest, RequestSeq, RequestSequencer, Token, TokenizationResult, TokenizerClient,
    Transport,
};
use crate::workspace::{Attachment, Workspace};

/// Result of the latest evaluation the editor accepted.
pub type Outcome = Result<Vec<TokenizationResult>, EvaluationError>;

/// An evaluation that has been issued but not yet answered.
#[derive(Debug, Clone)]
pub struct PendingEvaluation {
    pub seq: RequestSeq,
    pub request: EvaluationRequest,
}

pub struct Editor<S: Store> {
    workspace: Workspace,
    corpus: TestCorpus,
    persistence: Persistence<S>,
    sequencer: RequestSequencer,
    outcome: Option<Outcome>,
}

impl<S: Store> Editor<S> {
    /// Start a session from whatever `store` last saved.
    pub fn open(store: S) -> Self {
        let persistence = Persistence::new(store);
        let Restored { workspace, corpus } = persistence.load();
        Editor {
            workspace,
            corpus,
            persistence,
            sequencer: RequestSequencer::new(),
            outcome: None,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn corpus(&self) -> &TestCorpus {
        &self.corpus
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    /// Apply a structural edit and save if it went through.
    ///
    /// `change` may take several workspace steps. When any of them fails the
    /// workspace goes back to how it was before `change` ran.
    pub fn edit<T, E>(&mut self, change: impl FnOnce(&mut Workspace) -> Result<T, E>) -> Result<T, E> {
        let before = self.workspace.clone();
        match change(&mut self.workspace) {
            Ok(output) => {
                self.save();
                Ok(output)
            }
            Err(err) => {
                self.workspace.roll_back(before);
                Err(err)
            }
        }
    }

    pub fn set_corpus(&mut self, corpus: TestCorpus) {
        self.corpus = corpus;
        self.save();
    }

    /// Replace the workspace with a grammar read from canonical JSON.
    ///
    /// The current workspace is kept when the grammar does not decode.
    pub fn load_grammar(&mut self, text: &str) -> Result<NodeId, GrammarError> {
        let tree = from_grammar_str(text)?;
        Workspace::from_tree(tree.clone())?;
        self.workspace.clear();
        let root = self.workspace.insert_tree(tree, None)?;
        self.save();
        Ok(root)
    }

    /// Import `(pattern, type_name)` pairs as one choice block.
    pub fn import_pairs(
        &mut self,
        pairs: &[(String, String)],
        at: Option<Attachment>,
        child_variant: &UiVariant,
    ) -> Result<NodeId, ImportError> {
        let choice = serializer::import_pairs(&mut self.workspace, pairs, at, child_variant)?;
        self.save();
        Ok(choice)
    }

    /// Forget the grammar, the corpus and any results.
    pub fn reset(&mut self) {
        self.workspace.clear();
        self.corpus = TestCorpus::default();
        self.outcome = None;
        self.save();
    }

    pub fn save(&mut self) {
        self.persistence.save(&self.workspace, &self.corpus);
    }

    /// Save one last time and hand the store back.
    pub fn close(mut self) -> S {
        self.save();
        self.persistence.into_store()
    }

    pub fn export(&self, mode: Mode) -> Result<CanonicalGrammar, GrammarError> {
        to_grammar(&self.workspace, mode)
    }

    /// Issue a numbered request for the current grammar and corpus.
    ///
    /// A workspace without a sequence root is refused here, before anything
    /// is numbered or sent.
    pub fn prepare_evaluation(&mut self) -> Result<PendingEvaluation, EvaluationError> {
        let grammar = to_grammar(&self.workspace, Mode::External)?;
        self.save();
        let seq = self.sequencer.issue();
        log::debug!(
            "issuing evaluation {} for {} point labels",
            seq,
            self.corpus.len()
        );
        Ok(PendingEvaluation {
            seq,
            request: EvaluationRequest::new(&grammar, &self.corpus),
        })
    }

    /// Record the answer to `seq`, unless a newer request has been issued
    /// since. Returns whether the outcome was kept.
    pub fn apply_evaluation(&mut self, seq: RequestSeq, outcome: Outcome) -> bool {
        if !self.sequencer.is_current(seq) {
            log::warn!(
                "discarding response to evaluation {}; {:?} is newer",
                seq,
                self.sequencer.latest()
            );
            return false;
        }
        self.outcome = Some(outcome);
        true
    }

    /// Evaluate the current grammar against the corpus and keep the outcome.
    pub async fn evaluate<T: Transport>(&mut self, client: &TokenizerClient<T>) -> Outcome {
        let pending = self.prepare_evaluation()?;
        let outcome = client.send(&pending.request).await;
        self.apply_evaluation(pending.seq, outcome.clone());
        outcome
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Emphasise the block that produced `token`.
    pub fn highlight(&self, token: &Token, sink: &mut dyn HighlightSink) -> bool {
        highlight::highlight(&self.workspace, token, sink)
    }

    pub fn highlight_node(&self, id: &NodeId, sink: &mut dyn HighlightSink) -> bool {
        highlight::highlight_node(&self.workspace, Some(id), sink)
    }
}
