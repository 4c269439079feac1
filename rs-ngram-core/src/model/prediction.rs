use serde::{Deserialize, Serialize};

/// Prediction made at one position of a text.
///
/// Serialized untagged, so a single token is a JSON string and a
/// lookahead sequence is a JSON array of strings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Prediction {
	/// Greedy single-token prediction (lookahead of 1).
	Token(String),
	/// Beam-searched continuation of `lookahead` tokens.
	Sequence(Vec<String>),
}

impl Prediction {
	/// Checks the prediction against a ground-truth window.
	///
	/// A one-token window matches a `Token` by equality, and a `Sequence`
	/// by its first token. Longer windows only match a `Sequence` that is
	/// exactly equal to them.
	pub fn matches<S: AsRef<str>>(&self, window: &[S]) -> bool {
		match (self, window) {
			(Prediction::Token(token), [expected]) => token == expected.as_ref(),
			(Prediction::Token(_), _) => false,
			(Prediction::Sequence(tokens), [expected]) => {
				tokens.first().is_some_and(|token| token == expected.as_ref())
			}
			(Prediction::Sequence(tokens), _) => {
				tokens.len() == window.len() && tokens.iter().zip(window).all(|(t, e)| t == e.as_ref())
			}
		}
	}
}

impl From<&str> for Prediction {
	fn from(token: &str) -> Self {
		Prediction::Token(token.to_owned())
	}
}

impl From<Vec<String>> for Prediction {
	fn from(tokens: Vec<String>) -> Self {
		Prediction::Sequence(tokens)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_token_window() {
		assert!(Prediction::from("5").matches(&["5"]));
		assert!(!Prediction::from("5").matches(&["6"]));
		assert!(Prediction::from(vec!["5".to_owned(), "x".to_owned()]).matches(&["5"]));
	}

	#[test]
	fn sequence_window_requires_exact_match() {
		let prediction = Prediction::from(vec!["x".to_owned(), "=".to_owned()]);
		assert!(prediction.matches(&["x", "="]));
		assert!(!prediction.matches(&["x", "+"]));
		assert!(!prediction.matches(&["x", "=", "5"]));
		assert!(!Prediction::from("x").matches(&["x", "="]));
	}

	#[test]
	fn serializes_untagged() {
		let token = serde_json::to_string(&Prediction::from("a")).unwrap();
		let sequence = serde_json::to_string(&Prediction::from(vec!["a".to_owned(), "b".to_owned()])).unwrap();
		assert_eq!(token, "\"a\"");
		assert_eq!(sequence, "[\"a\",\"b\"]");
	}
}
