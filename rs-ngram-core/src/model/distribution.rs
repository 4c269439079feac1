use std::cmp::Ordering;

use serde::Serialize;

/// Smallest probability handed out for a vocabulary token.
///
/// Substituted for an interpolated probability of exactly zero so that
/// log-probabilities stay finite. The substitution is not renormalized, so
/// a distribution may sum to slightly more than 1.0.
pub const PROBABILITY_FLOOR: f64 = 1e-7;

/// Compares two scored candidates, best first.
///
/// Higher scores win; equal scores fall back to the lexicographically
/// smaller token so that results never depend on hash iteration order.
pub(crate) fn rank(a: (f64, &str), b: (f64, &str)) -> Ordering {
	b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1))
}

/// Next-token distribution over the whole vocabulary.
///
/// Entries are laid out in vocabulary order (first observation first).
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Distribution {
	entries: Vec<(String, f64)>,
}

impl Distribution {
	pub(crate) fn new(entries: Vec<(String, f64)>) -> Self {
		Self { entries }
	}

	/// Probability of `token`, or `None` if it is not in the vocabulary.
	pub fn get(&self, token: &str) -> Option<f64> {
		self.entries.iter().find(|(t, _)| t == token).map(|(_, p)| *p)
	}

	/// Iterates over `(token, probability)` pairs in vocabulary order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
		self.entries.iter().map(|(t, p)| (t.as_str(), *p))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
