use thiserror::Error;

/// Errors raised while configuring a model or a prediction run.
///
/// Every variant is a configuration error: once a model has been built,
/// training, estimation, decoding and scoring never fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NGramError {
	#[error("order must be >= 1, got {0}")]
	InvalidOrder(usize),
	#[error("expected {expected} interpolation weights (one per order), got {actual}")]
	WeightCount { expected: usize, actual: usize },
	#[error("interpolation weights must sum to 1.0, got {0}")]
	WeightSum(f64),
	#[error("interpolation weight #{index} must be a finite value >= 0.0, got {value}")]
	InvalidWeight { index: usize, value: f64 },
	#[error("lookahead must be >= 1, got {0}")]
	InvalidLookahead(usize),
	#[error("beam width must be >= 1, got {0}")]
	InvalidBeamWidth(usize),
}

pub type Result<T> = std::result::Result<T, NGramError>;
