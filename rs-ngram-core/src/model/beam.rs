use std::cmp::Ordering;

use super::ngram_model::NGramModel;
use super::vocabulary::{TokenId, Vocabulary};

/// A partial output sequence and its cumulative log-probability.
struct Hypothesis {
	tokens: Vec<TokenId>,
	score: f64,
}

/// One-token extension of a surviving hypothesis.
///
/// Candidates only point at their parent, the token sequence is built for
/// the `beam_width` survivors of each step.
#[derive(Clone, Copy)]
struct Candidate {
	parent: usize,
	token: TokenId,
	score: f64,
	probability: f64,
}

/// Runs beam search for `num_tokens` steps from a context window.
///
/// Every step expands each hypothesis by every vocabulary token, adding
/// `ln(p)` to its score, and keeps the `beam_width` best candidates.
/// Equal scores are ordered by the probability of the last step, then by
/// the token strings of the whole sequence, so the result never depends on
/// hash iteration order. Distinct probabilities can share a logarithm, the
/// second key keeps the first step in line with the argmax.
///
/// `window` is the start-padded context window of the model (`n - 1`
/// entries). Returns the best surviving sequence.
pub(crate) fn search(model: &NGramModel, window: &[Option<TokenId>], num_tokens: usize, beam_width: usize) -> Vec<TokenId> {
	let beam_width = beam_width.max(1);
	let vocabulary = model.store().vocabulary();

	let mut beam = vec![Hypothesis { tokens: Vec::new(), score: 0.0 }];
	let mut probabilities: Vec<f64> = Vec::with_capacity(vocabulary.len());
	let mut extended: Vec<Option<TokenId>> = Vec::with_capacity(window.len());
	let mut candidates: Vec<Candidate> = Vec::new();

	for _ in 0..num_tokens {
		candidates.clear();
		candidates.reserve(beam.len().saturating_mul(vocabulary.len()));
		for (parent, hypothesis) in beam.iter().enumerate() {
			shift_window(window, &hypothesis.tokens, &mut extended);
			model.fill_probabilities(&extended, &mut probabilities);
			for (&token, &p) in vocabulary.ids().iter().zip(&probabilities) {
				candidates.push(Candidate { parent, token, score: hypothesis.score + p.ln(), probability: p });
			}
		}

		let order = |a: &Candidate, b: &Candidate| compare_candidates(vocabulary, &beam, a, b);
		if candidates.len() > beam_width {
			candidates.select_nth_unstable_by(beam_width - 1, order);
			candidates.truncate(beam_width);
		}
		candidates.sort_unstable_by(order);

		beam = candidates
			.iter()
			.map(|candidate| {
				let parent = &beam[candidate.parent];
				let mut tokens = Vec::with_capacity(parent.tokens.len() + 1);
				tokens.extend_from_slice(&parent.tokens);
				tokens.push(candidate.token);
				Hypothesis { tokens, score: candidate.score }
			})
			.collect();
	}

	beam.into_iter().next().map(|best| best.tokens).unwrap_or_default()
}

/// Writes the last `window.len()` entries of `window ++ tokens` to `out`.
fn shift_window(window: &[Option<TokenId>], tokens: &[TokenId], out: &mut Vec<Option<TokenId>>) {
	out.clear();
	let shifted = tokens.len().min(window.len());
	out.extend_from_slice(&window[shifted..]);
	out.extend(tokens[tokens.len() - shifted..].iter().map(|&id| Some(id)));
}

/// Best candidate first: higher score, then higher last-step probability,
/// then the smaller token path.
fn compare_candidates(vocabulary: &Vocabulary, beam: &[Hypothesis], a: &Candidate, b: &Candidate) -> Ordering {
	b.score
		.total_cmp(&a.score)
		.then_with(|| b.probability.total_cmp(&a.probability))
		.then_with(|| compare_paths(vocabulary, (&beam[a.parent].tokens[..], a.token), (&beam[b.parent].tokens[..], b.token)))
}

/// Lexicographic order of two equally long paths, compared by token string.
fn compare_paths(vocabulary: &Vocabulary, a: (&[TokenId], TokenId), b: (&[TokenId], TokenId)) -> Ordering {
	for (x, y) in a.0.iter().zip(b.0) {
		match vocabulary.token(*x).cmp(vocabulary.token(*y)) {
			Ordering::Equal => continue,
			unequal => return unequal,
		}
	}
	vocabulary.token(a.1).cmp(vocabulary.token(b.1))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn shift_window_keeps_the_most_recent_entries() {
		let mut out = Vec::new();
		shift_window(&[Some(0), Some(1)], &[], &mut out);
		assert_eq!(out, vec![Some(0), Some(1)]);
		shift_window(&[Some(0), Some(1)], &[7], &mut out);
		assert_eq!(out, vec![Some(1), Some(7)]);
		shift_window(&[Some(0), None], &[7, 8, 9], &mut out);
		assert_eq!(out, vec![Some(8), Some(9)]);
		shift_window(&[], &[7], &mut out);
		assert!(out.is_empty());
	}

	#[test]
	fn ties_are_broken_by_token_strings() {
		let mut model = NGramModel::with_weights(1, vec![1.0]).unwrap();
		// Every token is seen exactly once, so all unigram scores are equal.
		model.train("zeta alpha mu");
		let best = search(&model, &[], 2, 4);
		let vocabulary = model.store().vocabulary();
		let tokens: Vec<&str> = best.iter().map(|&id| vocabulary.token(id)).collect();
		assert_eq!(tokens, vec!["</s>", "</s>"]);
	}

	#[test]
	fn wider_beams_can_find_better_sequences() {
		let mut model = NGramModel::with_weights(2, vec![0.1, 0.9]).unwrap();
		// After "s", "a" is the greedy choice, but "b c" is the stronger pair.
		model.train("s a x");
		model.train("s a y");
		model.train("s a z");
		model.train("s b c");
		model.train("s b c");
		let vocabulary = model.store().vocabulary();
		let window = model.context_window(&["s"]);

		let greedy: Vec<&str> = search(&model, &window, 2, 1).into_iter().map(|id| vocabulary.token(id)).collect();
		let wide: Vec<&str> = search(&model, &window, 2, 4).into_iter().map(|id| vocabulary.token(id)).collect();
		assert_eq!(greedy[0], "a");
		assert_eq!(wide, vec!["b", "c"]);
	}

	#[test]
	fn huge_beam_widths_are_bounded_by_the_candidates() {
		let mut model = NGramModel::new(2).unwrap();
		model.train("a b a b");
		let window = model.context_window(&["a"]);
		let size = model.store().vocabulary().len();

		let full = search(&model, &window, 2, size * size);
		assert_eq!(search(&model, &window, 2, usize::MAX), full);
		assert_eq!(search(&model, &window, 2, usize::MAX / 4), full);
		assert_eq!(search(&model, &window, 1, usize::MAX), search(&model, &window, 1, 1));
	}

	#[test]
	fn equal_scores_fall_back_to_the_last_probability() {
		let mut model = NGramModel::new(1).unwrap();
		model.train("zeta alpha");
		let vocabulary = model.store().vocabulary();
		let alpha = vocabulary.id("alpha").unwrap();
		let zeta = vocabulary.id("zeta").unwrap();
		let beam = [Hypothesis { tokens: Vec::new(), score: 0.0 }];

		// Two probabilities whose logarithms collide still rank by probability.
		let low = Candidate { parent: 0, token: alpha, score: -1.0, probability: 0.3 };
		let high = Candidate { parent: 0, token: zeta, score: -1.0, probability: f64::from_bits(0.3_f64.to_bits() + 1) };
		assert_eq!(compare_candidates(vocabulary, &beam, &high, &low), Ordering::Less);

		let tied = Candidate { probability: 0.3, ..high };
		assert_eq!(compare_candidates(vocabulary, &beam, &low, &tied), Ordering::Less);
	}
}
