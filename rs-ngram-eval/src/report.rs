use serde_json::{Map, Value};

/// Token-weighted accuracy accumulated per answer slot.
///
/// Slot `i` collects the `i`-th answer of every record. Each scored answer
/// contributes `accuracy * tokens` to the weighted sum, so long answers
/// weigh more than short ones.
///
/// # Invariants
/// - `weighted.len() == tokens.len()`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotTotals {
    weighted: Vec<f64>,
    tokens: Vec<usize>,
}

impl SlotTotals {
    /// Makes sure slot `slot` exists, even if nothing is scored in it.
    pub fn touch(&mut self, slot: usize) {
        if self.tokens.len() <= slot {
            self.weighted.resize(slot + 1, 0.0);
            self.tokens.resize(slot + 1, 0);
        }
    }

    /// Adds one scored answer to `slot`.
    pub fn add(&mut self, slot: usize, accuracy: f64, tokens: usize) {
        self.touch(slot);
        self.weighted[slot] += accuracy * tokens as f64;
        self.tokens[slot] += tokens;
    }

    /// Sums another set of totals into this one, slot by slot.
    pub fn merge(&mut self, other: &Self) {
        if other.tokens.is_empty() {
            return;
        }
        self.touch(other.tokens.len() - 1);
        for (slot, (weighted, tokens)) in other.weighted.iter().zip(&other.tokens).enumerate() {
            self.weighted[slot] += weighted;
            self.tokens[slot] += tokens;
        }
    }

    pub fn slots(&self) -> usize {
        self.tokens.len()
    }

    /// Weighted accuracy of `slot` (0 if it holds no tokens).
    pub fn accuracy(&self, slot: usize) -> f64 {
        match self.tokens.get(slot) {
            Some(&tokens) if tokens > 0 => self.weighted[slot] / tokens as f64,
            _ => 0.0,
        }
    }

    /// Report keyed `answer_0`, `answer_1`, ...
    pub fn to_json(&self) -> Value {
        let mut report = Map::new();
        for slot in 0..self.slots() {
            report.insert(format!("answer_{slot}"), Value::from(self.accuracy(slot)));
        }
        Value::Object(report)
    }
}
