//! Top-level module for the n-gram language model.
//!
//! This module provides an interpolated n-gram model over whitespace
//! tokens, including:
//! - Frequency tables for every order (`CountStore`, `Vocabulary`)
//! - Training, online updates and next-token estimation (`NGramModel`)
//! - Greedy and beam-search decoding
//! - Accuracy scoring of per-position predictions (`evaluator`)
//! - Construction and prediction-run parameters (`ModelConfig`, `PredictionInput`)

/// Interpolated n-gram model.
///
/// Handles training, online updates, distribution estimation and decoding.
pub mod ngram_model;

/// Per-order frequency tables.
pub mod count_store;

/// Token interner and observed vocabulary.
pub mod vocabulary;

/// Next-token distributions and the probability floor.
pub mod distribution;

/// Beam-search decoder over `NGramModel` distributions.
///
/// Not exposed, reached through `NGramModel::decode`.
mod beam;

/// Per-position predictions (single token or lookahead sequence).
pub mod prediction;

/// Accuracy of predictions against a ground-truth text.
pub mod evaluator;

/// Serializable model construction parameters.
pub mod config;

/// Driver-level prediction parameters (lookahead, beam width, training switches).
pub mod prediction_input;

pub use config::ModelConfig;
pub use distribution::{Distribution, PROBABILITY_FLOOR};
pub use evaluator::{evaluate, score, Score};
pub use ngram_model::NGramModel;
pub use prediction::Prediction;
pub use prediction_input::PredictionInput;
