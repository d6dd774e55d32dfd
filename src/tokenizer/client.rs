//! Retrying tokenizer client

use std::time::Duration;

use async_trait::async_trait;

use crate::corpus::TestCorpus;
use crate::error::{EvaluationError, GrammarError, TransportError};
use crate::grammar::NodeKind;
use crate::serializer::{to_grammar, CanonicalGrammar, Mode};
use crate::tokenizer::protocol::{EvaluationRequest, TokenizationResult, WireResult};
use crate::workspace::Workspace;

/// Delivers one request to a tokenizer and returns its raw response.
///
/// Implementations make a single attempt. Retrying is the client's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &EvaluationRequest) -> Result<Vec<WireResult>, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: &EvaluationRequest) -> Result<Vec<WireResult>, TransportError> {
        (**self).send(request).await
    }
}

/// How often and how patiently transient failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

pub struct TokenizerClient<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> TokenizerClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, RetryPolicy::default())
    }

    pub fn with_policy(transport: T, policy: RetryPolicy) -> Self {
        TokenizerClient { transport, policy }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Tokenize `inputs` with `grammar`.
    ///
    /// The grammar must have a sequence root; anything else is refused before
    /// the transport is touched.
    pub async fn evaluate(
        &self,
        grammar: &CanonicalGrammar,
        inputs: &[String],
    ) -> Result<Vec<TokenizationResult>, EvaluationError> {
        if grammar.parser != NodeKind::Sequence {
            return Err(GrammarError::InvalidRoot {
                found: Some(grammar.parser),
            }
            .into());
        }
        let request = EvaluationRequest::new(grammar, &TestCorpus::new(inputs.to_vec()));
        self.send(&request).await
    }

    /// Serialize the workspace root and tokenize `corpus` with it.
    pub async fn evaluate_workspace(
        &self,
        workspace: &Workspace,
        corpus: &TestCorpus,
    ) -> Result<Vec<TokenizationResult>, EvaluationError> {
        let grammar = to_grammar(workspace, Mode::External)?;
        self.send(&EvaluationRequest::new(&grammar, corpus)).await
    }

    /// Send a prepared request, retrying transient failures.
    pub async fn send(
        &self,
        request: &EvaluationRequest,
    ) -> Result<Vec<TokenizationResult>, EvaluationError> {
        let allowed = self.policy.attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.send(request).await {
                Ok(results) => return align(request, results),
                Err(TransportError::Rejected(reason)) => {
                    log::warn!("tokenizer rejected request: {}", reason);
                    return Err(EvaluationError::Rejected(reason));
                }
                Err(TransportError::Transient(reason)) if attempt >= allowed => {
                    log::warn!("giving up after {} attempts: {}", attempt, reason);
                    return Err(EvaluationError::EvaluationFailed {
                        attempts: attempt,
                        last_error: reason,
                    });
                }
                Err(TransportError::Transient(reason)) => {
                    log::debug!("attempt {} of {} failed: {}", attempt, allowed, reason);
                    if !self.policy.backoff.is_zero() {
                        tokio::time::sleep(self.policy.backoff).await;
                    }
                }
            }
        }
    }
}

fn align(
    request: &EvaluationRequest,
    results: Vec<WireResult>,
) -> Result<Vec<TokenizationResult>, EvaluationError> {
    if results.len() != request.point_labels.len() {
        return Err(EvaluationError::MisalignedResponse {
            expected: request.point_labels.len(),
            got: results.len(),
        });
    }
    Ok(results.into_iter().map(TokenizationResult::from).collect())
}
