//! Interpolated n-gram language model library.
//!
//! This crate scores and predicts token continuations of free-form text:
//! - Frequency accounting over n-gram orders `1..=n`
//! - Linear interpolation of the per-order maximum likelihood estimates
//! - Greedy argmax and beam-search decoding
//! - Online (train-while-predict) updates
//! - Per-position accuracy scoring
//!
//! Texts are tokenized on whitespace only. A model holds the state of one
//! evaluation unit and is not meant to be shared between threads while it
//! is being updated.

/// N-gram model, decoding and evaluation.
pub mod model;

/// Whitespace tokenization and sentinel tokens.
pub mod text;

/// Configuration errors.
pub mod error;

pub use error::{NGramError, Result};
