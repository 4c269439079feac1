use std::collections::HashMap;

use super::vocabulary::{TokenId, Vocabulary};

/// Frequency tables for every n-gram order `1..=n`.
///
/// `tables[k - 1]` maps a k-token key to the number of times it was
/// observed. Keys are boxed slices so that lookups can borrow a
/// `&[TokenId]` scratch buffer instead of allocating.
///
/// # Responsibilities
/// - Intern tokens and track the observed vocabulary
/// - Accumulate k-gram counts (no decrement, no eviction)
/// - Keep the unigram total used as the order-1 denominator
///
/// # Invariants
/// - `tables.len() == n`
/// - `total_unigrams` equals the sum of all counts in `tables[0]`
/// - every id counted as a unigram is part of `vocabulary`
#[derive(Clone, Debug)]
pub struct CountStore {
	n: usize,
	tables: Vec<HashMap<Box<[TokenId]>, u64>>,
	total_unigrams: u64,
	vocabulary: Vocabulary,
}

impl CountStore {
	/// Creates empty tables for orders `1..=n`.
	pub fn new(n: usize) -> Self {
		Self {
			n,
			tables: (0..n).map(|_| HashMap::new()).collect(),
			total_unigrams: 0,
			vocabulary: Vocabulary::new(),
		}
	}

	pub fn order(&self) -> usize {
		self.n
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn intern(&mut self, token: &str) -> TokenId {
		self.vocabulary.intern(token)
	}

	/// Records one observation of `gram`, whose length selects the order.
	///
	/// Unigram observations also bump the unigram total and add the token
	/// to the vocabulary. Empty grams and grams longer than `n` are ignored.
	pub fn record(&mut self, gram: &[TokenId]) {
		let k = gram.len();
		if k == 0 || k > self.n {
			return;
		}
		let table = &mut self.tables[k - 1];
		match table.get_mut(gram) {
			Some(count) => *count += 1,
			None => {
				table.insert(gram.into(), 1);
			}
		}
		if k == 1 {
			self.total_unigrams += 1;
			self.vocabulary.observe(gram[0]);
		}
	}

	/// Returns how many times `gram` was recorded (0 if never).
	pub fn count(&self, gram: &[TokenId]) -> u64 {
		let k = gram.len();
		if k == 0 || k > self.n {
			return 0;
		}
		self.tables[k - 1].get(gram).copied().unwrap_or(0)
	}

	pub fn total_unigrams(&self) -> u64 {
		self.total_unigrams
	}

	/// Sum of every count stored for order `k`.
	pub fn table_total(&self, k: usize) -> u64 {
		match k {
			0 => 0,
			k if k > self.n => 0,
			k => self.tables[k - 1].values().sum(),
		}
	}

	/// Iterates over the keys and counts of order `k`.
	pub fn entries(&self, k: usize) -> impl Iterator<Item = (&[TokenId], u64)> {
		self.tables
			.get(k.wrapping_sub(1))
			.into_iter()
			.flat_map(|table| table.iter().map(|(key, count)| (&key[..], *count)))
	}
}
