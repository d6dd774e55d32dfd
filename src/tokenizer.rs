//! Tokenizer client
//!
//! A grammar and a batch of point labels go out; one tokenization result per
//! label comes back, in input order. The wire itself sits behind the
//! [`Transport`] trait so the retry and ordering rules can be exercised
//! against any backend, including the in-process [`LocalEvaluator`].

pub mod client;
pub mod local;
pub mod protocol;
pub mod sequencer;

pub use client::{RetryPolicy, TokenizerClient, Transport};
pub use local::LocalEvaluator;
pub use protocol::{EvaluationRequest, Token, TokenizationResult, WireResult, WireToken};
pub use sequencer::{RequestSeq, RequestSequencer};
