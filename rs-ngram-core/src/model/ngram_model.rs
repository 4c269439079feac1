use std::iter::repeat;

use log::{debug, trace};

use super::beam;
use super::count_store::CountStore;
use super::distribution::{rank, Distribution, PROBABILITY_FLOOR};
use super::prediction::Prediction;
use super::vocabulary::TokenId;
use crate::error::{NGramError, Result};
use crate::text::{tokenize, END_TOKEN, START_TOKEN, UNKNOWN_TOKEN};

/// Relative tolerance on the weight sum: weights are accepted when
/// `|sum - 1| <= WEIGHT_TOLERANCE * max(1, |sum|)`.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Interpolated n-gram language model over whitespace tokens.
///
/// The `NGramModel` keeps frequency tables for every order `1..=n` and
/// estimates the next token by linearly interpolating the maximum
/// likelihood estimate of each order.
///
/// # Responsibilities
/// - Train on whole texts (padded with sentinels)
/// - Fold single observed tokens in while predicting (online update)
/// - Compute the next-token distribution for a context
/// - Predict greedily or with beam search
///
/// # Invariants
/// - `n` is always >= 1
/// - `weights.len() == n`, every weight is finite and >= 0, and they sum to 1
/// - counts only ever grow
///
/// A model is meant for one evaluation unit: build it, train it, predict,
/// drop it. All mutation goes through `&mut self`, so one instance cannot
/// be updated concurrently; distinct instances share nothing.
#[derive(Clone, Debug)]
pub struct NGramModel {
	/// The order of the model (longest n-gram tracked)
	n: usize, // must be >= 1

	/// Interpolation weight of each order, `weights[k - 1]` for order `k`
	weights: Vec<f64>,

	/// Frequency tables, interner and vocabulary
	store: CountStore,

	start: TokenId,
	end: TokenId,
}

impl NGramModel {
	/// Creates a model of order `n` with uniform weights `1 / n`.
	///
	/// # Errors
	/// Returns an error if `n < 1`.
	pub fn new(n: usize) -> Result<Self> {
		if n < 1 {
			return Err(NGramError::InvalidOrder(n));
		}
		Self::with_weights(n, vec![1.0 / n as f64; n])
	}

	/// Creates a model of order `n` with explicit interpolation weights.
	///
	/// # Errors
	/// Returns a configuration error if `n < 1`, if `weights` does not hold
	/// exactly `n` values, if a weight is negative or not finite, or if the
	/// weights do not sum to 1.0 within `WEIGHT_TOLERANCE`.
	pub fn with_weights(n: usize, weights: Vec<f64>) -> Result<Self> {
		if n < 1 {
			return Err(NGramError::InvalidOrder(n));
		}
		if weights.len() != n {
			return Err(NGramError::WeightCount { expected: n, actual: weights.len() });
		}
		if let Some((index, &value)) = weights.iter().enumerate().find(|(_, w)| !w.is_finite() || **w < 0.0) {
			return Err(NGramError::InvalidWeight { index, value });
		}
		let sum: f64 = weights.iter().sum();
		if (sum - 1.0).abs() > WEIGHT_TOLERANCE * sum.abs().max(1.0) {
			return Err(NGramError::WeightSum(sum));
		}

		let mut store = CountStore::new(n);
		let start = store.intern(START_TOKEN);
		let end = store.intern(END_TOKEN);
		Ok(Self { n, weights, store, start, end })
	}

	pub fn order(&self) -> usize {
		self.n
	}

	pub fn weights(&self) -> &[f64] {
		&self.weights
	}

	/// Read access to the frequency tables.
	pub fn store(&self) -> &CountStore {
		&self.store
	}

	pub fn total_unigram_count(&self) -> u64 {
		self.store.total_unigrams()
	}

	/// Vocabulary tokens in first-observation order.
	pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
		let vocabulary = self.store.vocabulary();
		vocabulary.ids().iter().map(move |&id| vocabulary.token(id))
	}

	pub fn vocabulary_size(&self) -> usize {
		self.store.vocabulary().len()
	}

	/// Returns the count of an n-gram given as tokens (0 if never seen).
	pub fn count<S: AsRef<str>>(&self, gram: &[S]) -> u64 {
		let vocabulary = self.store.vocabulary();
		let ids: Option<Vec<TokenId>> = gram.iter().map(|t| vocabulary.id(t.as_ref())).collect();
		ids.map_or(0, |ids| self.store.count(&ids))
	}

	/// Trains the model on a whole text.
	///
	/// The text is split on whitespace, left-padded with `n - 1` start
	/// sentinels and closed with one end sentinel. Every padded token is
	/// counted as a unigram, and every window of length `2..=n` over the
	/// padded sequence is counted for its order.
	///
	/// # Notes
	/// - Counts accumulate across calls, nothing is reset.
	/// - An empty text still contributes its sentinels.
	pub fn train(&mut self, text: &str) {
		let tokens = tokenize(text);
		let mut padded: Vec<TokenId> = Vec::with_capacity(tokens.len() + self.n);
		padded.extend(repeat(self.start).take(self.n - 1));
		for token in &tokens {
			padded.push(self.store.intern(token));
		}
		padded.push(self.end);

		for &id in &padded {
			self.store.record(&[id]);
		}
		for k in 2..=self.n {
			for gram in padded.windows(k) {
				self.store.record(gram);
			}
		}

		debug!(
			"trained on {} tokens (vocabulary: {}, unigram total: {})",
			tokens.len(),
			self.vocabulary_size(),
			self.total_unigram_count()
		);
	}

	/// Folds one observed `token` following `context` into the counts.
	///
	/// Applies the increments `train` would apply for that single position:
	/// the unigram of `token`, and for each order `k >= 2` the k-gram made of
	/// the last `k - 1` tokens of the start-padded context plus `token`.
	/// The history is not re-padded and no end sentinel is added.
	pub fn observe<S: AsRef<str>>(&mut self, context: &[S], token: &str) {
		let token = self.store.intern(token);
		self.store.record(&[token]);
		if self.n == 1 {
			return;
		}

		let width = self.n - 1;
		let kept = context.len().min(width);
		let mut gram: Vec<TokenId> = Vec::with_capacity(self.n);
		gram.extend(repeat(self.start).take(width - kept));
		for t in &context[context.len() - kept..] {
			gram.push(self.store.intern(t.as_ref()));
		}
		gram.push(token);

		for k in 2..=self.n {
			self.store.record(&gram[gram.len() - k..]);
		}
		trace!("observed token #{} after {} context tokens", token, context.len());
	}

	/// Returns the last `n - 1` tokens of the start-padded context as ids.
	///
	/// Tokens the model never interned map to `None`; no count can contain
	/// them, so every order whose suffix includes one estimates 0.
	pub(crate) fn context_window<S: AsRef<str>>(&self, context: &[S]) -> Vec<Option<TokenId>> {
		let width = self.n - 1;
		let kept = context.len().min(width);
		let vocabulary = self.store.vocabulary();
		let mut window = Vec::with_capacity(width);
		window.extend(repeat(Some(self.start)).take(width - kept));
		window.extend(context[context.len() - kept..].iter().map(|t| vocabulary.id(t.as_ref())));
		window
	}

	/// Writes the interpolated probability of every vocabulary token into
	/// `out`, aligned with the vocabulary order.
	///
	/// `window` must hold exactly `n - 1` entries. For each order `k` the
	/// denominator `count(suffix of length k - 1)` is looked up once, then
	/// the numerators are looked up per token through a reused key buffer.
	/// A total of exactly 0 is replaced by `PROBABILITY_FLOOR`.
	pub(crate) fn fill_probabilities(&self, window: &[Option<TokenId>], out: &mut Vec<f64>) {
		let ids = self.store.vocabulary().ids();
		out.clear();
		out.resize(ids.len(), 0.0);

		let total = self.store.total_unigrams();
		if total > 0 {
			let weight = self.weights[0];
			for (slot, &id) in out.iter_mut().zip(ids) {
				let count = self.store.count(&[id]);
				if count > 0 {
					*slot += weight * (count as f64 / total as f64);
				}
			}
		}

		let mut key: Vec<TokenId> = Vec::with_capacity(self.n);
		'orders: for k in 2..=self.n {
			key.clear();
			for id in &window[window.len() - (k - 1)..] {
				match id {
					Some(id) => key.push(*id),
					None => continue 'orders,
				}
			}
			let denominator = self.store.count(&key);
			if denominator == 0 {
				continue;
			}

			let weight = self.weights[k - 1];
			key.push(0);
			for (slot, &id) in out.iter_mut().zip(ids) {
				key[k - 1] = id;
				let count = self.store.count(&key);
				if count > 0 {
					*slot += weight * (count as f64 / denominator as f64);
				}
			}
		}

		for slot in out.iter_mut() {
			if *slot == 0.0 {
				*slot = PROBABILITY_FLOOR;
			}
		}
	}

	/// Computes the next-token distribution over the whole vocabulary.
	///
	/// # Returns
	/// - `{ "<unk>": 1.0 }` if the model has not observed anything yet.
	/// - Otherwise one entry per vocabulary token. The distribution is not
	///   renormalized after floor substitution.
	pub fn next_token_distribution<S: AsRef<str>>(&self, context: &[S]) -> Distribution {
		let vocabulary = self.store.vocabulary();
		if vocabulary.is_empty() {
			return Distribution::new(vec![(UNKNOWN_TOKEN.to_owned(), 1.0)]);
		}

		let mut probabilities = Vec::new();
		self.fill_probabilities(&self.context_window(context), &mut probabilities);
		let entries = vocabulary
			.ids()
			.iter()
			.zip(probabilities)
			.map(|(&id, p)| (vocabulary.token(id).to_owned(), p))
			.collect();
		Distribution::new(entries)
	}

	/// Predicts the single most probable next token.
	///
	/// Ties go to the lexicographically smaller token. Returns `"<unk>"`
	/// if the vocabulary is empty.
	pub fn argmax_next_token<S: AsRef<str>>(&self, context: &[S]) -> String {
		let vocabulary = self.store.vocabulary();
		let mut probabilities = Vec::new();
		self.fill_probabilities(&self.context_window(context), &mut probabilities);
		vocabulary
			.ids()
			.iter()
			.zip(probabilities)
			.map(|(&id, p)| (p, vocabulary.token(id)))
			.min_by(|a, b| rank(*a, *b))
			.map_or_else(|| UNKNOWN_TOKEN.to_owned(), |(_, token)| token.to_owned())
	}

	/// Decodes `num_tokens` tokens after `context` with beam search.
	///
	/// # Returns
	/// - `num_tokens` copies of `"<unk>"` if the vocabulary is empty.
	/// - Otherwise the best sequence kept by a beam of `beam_width`
	///   hypotheses (a width of 0 behaves like 1).
	pub fn decode<S: AsRef<str>>(&self, context: &[S], num_tokens: usize, beam_width: usize) -> Vec<String> {
		let vocabulary = self.store.vocabulary();
		if vocabulary.is_empty() {
			return vec![UNKNOWN_TOKEN.to_owned(); num_tokens];
		}
		beam::search(self, &self.context_window(context), num_tokens, beam_width)
			.into_iter()
			.map(|id| vocabulary.token(id).to_owned())
			.collect()
	}

	/// Predicts a continuation at every position of `text`.
	///
	/// For each prefix `tokens[..i]`, predicts one token by argmax when
	/// `lookahead == 1`, otherwise `lookahead` tokens by beam search. When
	/// `train` is set, the true token `tokens[i]` is observed right after
	/// its prediction, so later positions see more counts while earlier
	/// predictions are left as they were.
	///
	/// # Returns
	/// One prediction per token of `text`, in order.
	pub fn predict_sequence(&mut self, text: &str, train: bool, lookahead: usize, beam_width: usize) -> Vec<Prediction> {
		let tokens = tokenize(text);
		let mut predictions = Vec::with_capacity(tokens.len());

		for i in 0..tokens.len() {
			let context = &tokens[..i];
			let prediction = if lookahead == 1 {
				Prediction::Token(self.argmax_next_token(context))
			} else {
				Prediction::Sequence(self.decode(context, lookahead, beam_width))
			};
			predictions.push(prediction);

			if train {
				self.observe(context, tokens[i]);
			}
		}

		debug!(
			"predicted {} positions (lookahead: {}, beam width: {}, online: {})",
			predictions.len(),
			lookahead,
			beam_width,
			train
		);
		predictions
	}
}
