/// Start-of-sequence sentinel, repeated `n - 1` times as left padding.
pub const START_TOKEN: &str = "<s>";

/// End-of-sequence sentinel, appended once per trained sequence.
pub const END_TOKEN: &str = "</s>";

/// Returned in place of a prediction when the model has seen nothing yet.
pub const UNKNOWN_TOKEN: &str = "<unk>";

/// Splits a text into tokens on any run of whitespace.
///
/// No normalization is applied: casing and punctuation are kept as is,
/// so `"x = 5."` yields `["x", "=", "5."]`.
pub fn tokenize(text: &str) -> Vec<&str> {
	text.split_whitespace().collect()
}

/// Counts the whitespace tokens of a text without collecting them.
pub fn token_count(text: &str) -> usize {
	text.split_whitespace().count()
}
