use super::prediction::Prediction;
use crate::text::tokenize;

/// Outcome of comparing predictions with a ground-truth text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Score {
	/// Positions whose prediction matched the target window.
	pub correct: usize,
	/// Positions that had a full target window.
	pub evaluated: usize,
}

impl Score {
	/// `correct / evaluated`, or 0 when nothing was evaluated.
	pub fn accuracy(&self) -> f64 {
		if self.evaluated == 0 {
			0.0
		} else {
			self.correct as f64 / self.evaluated as f64
		}
	}
}

/// Compares per-position predictions with the ground truth.
///
/// The prediction at position `i` is checked against the ground-truth
/// tokens `[i, i + lookahead)`. Positions without a full window are
/// skipped and do not count as evaluated.
pub fn evaluate(predictions: &[Prediction], ground_truth: &str, lookahead: usize) -> Score {
	let truth = tokenize(ground_truth);
	let mut score = Score::default();
	for (i, prediction) in predictions.iter().enumerate() {
		let Some(window) = truth.get(i..).and_then(|rest| rest.get(..lookahead)) else {
			continue;
		};
		if prediction.matches(window) {
			score.correct += 1;
		}
		score.evaluated += 1;
	}
	score
}

/// Accuracy in `[0, 1]` of `predictions` against `ground_truth`.
///
/// Returns 0 when no position has a full window of `lookahead` tokens.
pub fn score(predictions: &[Prediction], ground_truth: &str, lookahead: usize) -> f64 {
	evaluate(predictions, ground_truth, lookahead).accuracy()
}
