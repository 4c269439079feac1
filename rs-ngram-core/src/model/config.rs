use serde::{Deserialize, Serialize};

use super::ngram_model::NGramModel;
use crate::error::Result;

/// Construction parameters of an `NGramModel`.
///
/// `weights` may be omitted, in which case every order gets `1 / order`.
///
/// ```json
/// { "order": 3, "weights": [0.2, 0.3, 0.5] }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelConfig {
	pub order: usize,
	#[serde(default, alias = "lambdas", skip_serializing_if = "Option::is_none")]
	pub weights: Option<Vec<f64>>,
}

impl ModelConfig {
	pub fn new(order: usize) -> Self {
		Self { order, weights: None }
	}

	pub fn with_weights(order: usize, weights: Vec<f64>) -> Self {
		Self { order, weights: Some(weights) }
	}

	/// Validates the configuration and builds an untrained model.
	///
	/// # Errors
	/// Returns a configuration error under the same conditions as
	/// `NGramModel::with_weights`.
	pub fn build(&self) -> Result<NGramModel> {
		match &self.weights {
			Some(weights) => NGramModel::with_weights(self.order, weights.clone()),
			None => NGramModel::new(self.order),
		}
	}
}
