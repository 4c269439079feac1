use serde::{Deserialize, Serialize};

use crate::error::{NGramError, Result};

/// Driver-level parameters of a prediction run.
///
/// `PredictionInput` groups the knobs an evaluation harness passes through
/// to the model: how far to look ahead, how wide the beam is, and where
/// training signal comes from.
///
/// # Invariants
/// - `lookahead >= 1`
/// - `beam_width >= 1`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PredictionInput {
	/// Number of tokens predicted at each position (1 = greedy argmax).
	lookahead: usize,

	/// Number of hypotheses kept by beam search when `lookahead > 1`.
	beam_width: usize,

	/// Fold each true token into the counts right after predicting it.
	#[serde(alias = "train")]
	pub train_on_pred: bool,

	/// Train on the question text before predicting the answers.
	pub train_on_prompt: bool,
}

impl Default for PredictionInput {
	fn default() -> Self {
		Self { lookahead: 1, beam_width: 3, train_on_pred: false, train_on_prompt: false }
	}
}

impl PredictionInput {
	/// Builds an input, validating both sizes.
	///
	/// # Errors
	/// Returns an error if `lookahead` or `beam_width` is 0.
	pub fn new(lookahead: usize, beam_width: usize) -> Result<Self> {
		let mut input = Self::default();
		input.set_lookahead(lookahead)?;
		input.set_beam_width(beam_width)?;
		Ok(input)
	}

	pub fn lookahead(&self) -> usize {
		self.lookahead
	}

	pub fn beam_width(&self) -> usize {
		self.beam_width
	}

	/// Sets the lookahead (must be >= 1).
	///
	/// # Errors
	/// Returns an error if the value is 0.
	pub fn set_lookahead(&mut self, lookahead: usize) -> Result<()> {
		if lookahead < 1 {
			return Err(NGramError::InvalidLookahead(lookahead));
		}
		self.lookahead = lookahead;
		Ok(())
	}

	/// Sets the beam width (must be >= 1).
	///
	/// # Errors
	/// Returns an error if the value is 0.
	pub fn set_beam_width(&mut self, beam_width: usize) -> Result<()> {
		if beam_width < 1 {
			return Err(NGramError::InvalidBeamWidth(beam_width));
		}
		self.beam_width = beam_width;
		Ok(())
	}

	/// Checks the invariants of a deserialized input.
	pub fn validate(&self) -> Result<()> {
		if self.lookahead < 1 {
			return Err(NGramError::InvalidLookahead(self.lookahead));
		}
		if self.beam_width < 1 {
			return Err(NGramError::InvalidBeamWidth(self.beam_width));
		}
		Ok(())
	}
}
