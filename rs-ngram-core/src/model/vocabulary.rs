use std::collections::HashMap;

/// Dense identifier of an interned token.
pub type TokenId = u32;

/// Token interner and observed-vocabulary tracker.
///
/// Every string the model ever needs as a key component gets a `TokenId`,
/// but only tokens that were counted as unigrams are part of the
/// vocabulary. The vocabulary is iterated in first-observation order,
/// which is the order candidate distributions are laid out in.
///
/// # Invariants
/// - `tokens[id]` is the string interned under `id`
/// - `observed` holds each id at most once, `seen[id]` mirrors membership
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
	ids: HashMap<String, TokenId>,
	tokens: Vec<String>,
	seen: Vec<bool>,
	observed: Vec<TokenId>,
}

impl Vocabulary {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the id of `token`, interning it on first use.
	///
	/// Interning does not add the token to the vocabulary.
	pub fn intern(&mut self, token: &str) -> TokenId {
		if let Some(&id) = self.ids.get(token) {
			return id;
		}
		let id = self.tokens.len() as TokenId;
		self.tokens.push(token.to_owned());
		self.seen.push(false);
		self.ids.insert(token.to_owned(), id);
		id
	}

	/// Looks up an already interned token.
	pub fn id(&self, token: &str) -> Option<TokenId> {
		self.ids.get(token).copied()
	}

	/// Returns the string behind `id`.
	///
	/// # Panics
	/// Panics if `id` was not produced by this interner.
	pub fn token(&self, id: TokenId) -> &str {
		&self.tokens[id as usize]
	}

	/// Adds an interned token to the vocabulary (no-op if already there).
	pub fn observe(&mut self, id: TokenId) {
		let seen = &mut self.seen[id as usize];
		if !*seen {
			*seen = true;
			self.observed.push(id);
		}
	}

	pub fn contains(&self, id: TokenId) -> bool {
		self.seen.get(id as usize).copied().unwrap_or(false)
	}

	/// Vocabulary ids in first-observation order.
	pub fn ids(&self) -> &[TokenId] {
		&self.observed
	}

	pub fn len(&self) -> usize {
		self.observed.len()
	}

	pub fn is_empty(&self) -> bool {
		self.observed.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn interning_is_stable_and_does_not_observe() {
		let mut vocabulary = Vocabulary::new();
		let a = vocabulary.intern("a");
		assert_eq!(vocabulary.intern("a"), a);
		assert_eq!(vocabulary.token(a), "a");
		assert!(vocabulary.is_empty());
		assert!(!vocabulary.contains(a));
	}

	#[test]
	fn observation_order_is_preserved() {
		let mut vocabulary = Vocabulary::new();
		let b = vocabulary.intern("b");
		let a = vocabulary.intern("a");
		vocabulary.observe(a);
		vocabulary.observe(b);
		vocabulary.observe(a);
		assert_eq!(vocabulary.ids(), &[a, b]);
		assert_eq!(vocabulary.len(), 2);
		assert_eq!(vocabulary.id("c"), None);
	}
}
