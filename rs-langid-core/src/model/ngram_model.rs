use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{LangIdError, Result};
use crate::text::encoding::EncodedCorpus;
use crate::text::letter_storage::LetterId;

/// A fixed-length window of letter ids taken from one encoded token.
pub type NGram = Vec<LetterId>;

/// N-grams of one sentence, one bag per token (not deduplicated).
pub type SentenceNGrams = Vec<Vec<NGram>>;

/// Extracts every n-gram of order `size` from an encoded corpus.
///
/// Each token of length `len` gives `len - size + 1` windows, or none when it
/// is shorter than `size`. The corpus/sentence/token shape is preserved.
pub fn extract_n_grams(size: usize, encoded_text: &EncodedCorpus) -> Vec<SentenceNGrams> {
	encoded_text
		.iter()
		.map(|sentence| {
			sentence
				.iter()
				.map(|token| {
					if size == 0 || token.len() < size {
						Vec::new()
					} else {
						token.windows(size).map(<[LetterId]>::to_vec).collect()
					}
				})
				.collect()
		})
		.collect()
}

/// Character n-gram model of a fixed order `n` over encoded letters.
///
/// # Responsibilities
/// - Extract the n-grams of an encoded corpus
/// - Count how often each distinct n-gram occurs
/// - Derive the log-probability of the last letter of each n-gram given its
///   first `n-1` letters
/// - Report the most frequent n-grams
///
/// Stages must run in that order; a stage called before its prerequisite
/// fails with `UninitializedState`.
///
/// # Invariants
/// - `n` is always >= 1
/// - Frequencies keep the order in which n-grams were first met
/// - For every prefix, the probabilities of the n-grams sharing it sum to 1
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NGramModel {
	/// Order of the model
	n: usize,

	/// Extracted n-grams, corpus-shaped. Not persisted: only the tables below
	/// are needed once the model is trained.
	#[serde(skip)]
	n_grams: Vec<SentenceNGrams>,

	/// Occurrences of each distinct n-gram, in first-seen order
	n_gram_frequencies: IndexMap<NGram, usize>,

	/// Natural-log conditional probability of each n-gram
	n_gram_log_probabilities: HashMap<NGram, f64>,
}

impl NGramModel {
	/// Creates an empty model of order `n`.
	///
	/// # Errors
	/// Returns `InvalidInput` if `n == 0`.
	pub fn new(n: usize) -> Result<Self> {
		if n == 0 {
			return Err(LangIdError::InvalidInput("n-gram order must be >= 1".to_owned()));
		}
		Ok(Self {
			n,
			n_grams: Vec::new(),
			n_gram_frequencies: IndexMap::new(),
			n_gram_log_probabilities: HashMap::new(),
		})
	}

	/// Builds a fully processed model: n-grams, frequencies then log-probabilities.
	pub fn build(n: usize, encoded_text: &EncodedCorpus) -> Result<Self> {
		let mut model = Self::new(n)?;
		model.fill_n_grams(encoded_text);
		model.calculate_n_grams_frequencies()?;
		model.calculate_log_probabilities()?;
		Ok(model)
	}

	pub fn size(&self) -> usize {
		self.n
	}

	/// Extracts the n-grams of `encoded_text`, replacing any previous content.
	///
	/// Frequencies and log-probabilities computed earlier are discarded since
	/// they no longer describe the stored n-grams. An empty corpus is accepted
	/// and leaves the model without n-grams.
	pub fn fill_n_grams(&mut self, encoded_text: &EncodedCorpus) {
		self.n_grams = extract_n_grams(self.n, encoded_text);
		self.n_gram_frequencies.clear();
		self.n_gram_log_probabilities.clear();
		log::debug!(
			"Extracted {} {}-grams from {} sentences",
			self.n_grams.iter().flatten().map(Vec::len).sum::<usize>(),
			self.n,
			self.n_grams.len()
		);
	}

	/// Counts the occurrences of every distinct n-gram over the whole corpus.
	///
	/// # Errors
	/// `UninitializedState` if no n-gram was extracted (never filled, or filled
	/// from a corpus too short for this order).
	pub fn calculate_n_grams_frequencies(&mut self) -> Result<()> {
		let mut frequencies = IndexMap::new();
		for n_gram in self.n_grams.iter().flatten().flatten() {
			*frequencies.entry(n_gram.clone()).or_insert(0) += 1;
		}

		if frequencies.is_empty() {
			return Err(LangIdError::UninitializedState(format!(
				"no {}-gram to count, fill the model first",
				self.n
			)));
		}

		self.n_gram_frequencies = frequencies;
		self.n_gram_log_probabilities.clear();
		Ok(())
	}

	/// Computes `ln(freq(g) / sum(freq(h) for h sharing g's first n-1 letters))`
	/// for every distinct n-gram `g`.
	///
	/// # Errors
	/// `UninitializedState` if frequencies were not computed.
	pub fn calculate_log_probabilities(&mut self) -> Result<()> {
		if self.n_gram_frequencies.is_empty() {
			return Err(LangIdError::UninitializedState(format!(
				"no {}-gram frequencies, calculate them first",
				self.n
			)));
		}

		// Total occurrences of every (n-1)-prefix
		let mut prefix_totals: HashMap<&[LetterId], usize> = HashMap::new();
		for (n_gram, frequency) in &self.n_gram_frequencies {
			*prefix_totals.entry(&n_gram[..self.n - 1]).or_insert(0) += frequency;
		}

		self.n_gram_log_probabilities = self
			.n_gram_frequencies
			.iter()
			.map(|(n_gram, frequency)| {
				let total = prefix_totals[&n_gram[..self.n - 1]];
				(n_gram.clone(), (*frequency as f64 / total as f64).ln())
			})
			.collect();
		Ok(())
	}

	/// Returns the `k` most frequent n-grams, most frequent first.
	///
	/// Ties keep the order in which the n-grams were first met. Returns an
	/// empty list if frequencies were not computed.
	pub fn top_n_grams(&self, k: usize) -> Vec<NGram> {
		let mut entries: Vec<(&NGram, &usize)> = self.n_gram_frequencies.iter().collect();
		// Stable sort, ties stay in insertion order
		entries.sort_by(|a, b| b.1.cmp(a.1));
		entries.into_iter().take(k).map(|(n_gram, _)| n_gram.clone()).collect()
	}

	/// Extracted n-grams, corpus-shaped.
	pub fn n_grams(&self) -> &[SentenceNGrams] {
		&self.n_grams
	}

	pub fn frequencies(&self) -> &IndexMap<NGram, usize> {
		&self.n_gram_frequencies
	}

	pub fn log_probabilities(&self) -> &HashMap<NGram, f64> {
		&self.n_gram_log_probabilities
	}

	/// Occurrences of `n_gram`, 0 if never seen.
	pub fn frequency(&self, n_gram: &[LetterId]) -> usize {
		self.n_gram_frequencies.get(n_gram).copied().unwrap_or(0)
	}

	/// Log-probability of `n_gram`, `None` if never seen.
	pub fn log_probability(&self, n_gram: &[LetterId]) -> Option<f64> {
		self.n_gram_log_probabilities.get(n_gram).copied()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::text::encoding::encode_corpus;
	use crate::text::letter_storage::LetterStorage;
	use crate::text::tokenizer::tokenize_by_sentence;

	/// _=0 s=1 h=2 e=3 i=4 a=5 p=6 y=7
	fn happy_corpus() -> EncodedCorpus {
		let mut storage = LetterStorage::new();
		encode_corpus(&mut storage, &tokenize_by_sentence("She is happy. He is happy.")).unwrap()
	}

	fn happy_bigrams() -> NGramModel {
		NGramModel::build(2, &happy_corpus()).unwrap()
	}

	#[test]
	fn test_zero_order_rejected() {
		assert!(matches!(NGramModel::new(0), Err(LangIdError::InvalidInput(_))));
	}

	#[test]
	fn test_fill_keeps_corpus_shape() {
		let mut model = NGramModel::new(3).unwrap();
		model.fill_n_grams(&happy_corpus());

		let n_grams = model.n_grams();
		assert_eq!(n_grams.len(), 2);
		assert_eq!(n_grams[0].len(), 3);
		// _she_ -> _sh she he_
		assert_eq!(n_grams[0][0], vec![vec![0, 1, 2], vec![1, 2, 3], vec![2, 3, 0]]);
		// _is_ -> _is is_
		assert_eq!(n_grams[0][1].len(), 2);
	}

	#[test]
	fn test_short_tokens_give_no_n_grams() {
		let mut model = NGramModel::new(5).unwrap();
		model.fill_n_grams(&vec![vec![vec![0, 4, 1, 0], vec![0, 1, 2, 3, 0]]]);
		assert!(model.n_grams()[0][0].is_empty());
		assert_eq!(model.n_grams()[0][1], vec![vec![0, 1, 2, 3, 0]]);
	}

	#[test]
	fn test_frequencies() {
		let model = happy_bigrams();
		assert_eq!(model.frequency(&[0, 2]), 3); // _h
		assert_eq!(model.frequency(&[2, 3]), 2); // he
		assert_eq!(model.frequency(&[0, 1]), 1); // _s
		assert_eq!(model.frequency(&[6, 6]), 2); // pp
		assert_eq!(model.frequency(&[7, 7]), 0);
		assert_eq!(model.frequencies().len(), 13);
	}

	#[test]
	fn test_log_probabilities() {
		let model = happy_bigrams();
		// prefix _ : _s 1, _i 2, _h 3
		let lp = model.log_probability(&[0, 2]).unwrap();
		assert!((lp - (3.0f64 / 6.0).ln()).abs() < 1e-12);
		// prefix s : sh 1, s_ 2
		let lp = model.log_probability(&[1, 2]).unwrap();
		assert!((lp - (1.0f64 / 3.0).ln()).abs() < 1e-12);
		// e is always followed by _
		assert_eq!(model.log_probability(&[3, 0]), Some(0.0));
		assert_eq!(model.log_probability(&[7, 7]), None);
	}

	#[test]
	fn test_probabilities_recover_frequencies() {
		let model = NGramModel::build(3, &happy_corpus()).unwrap();
		for (n_gram, frequency) in model.frequencies() {
			let denominator: usize = model
				.frequencies()
				.iter()
				.filter(|(other, _)| other[..2] == n_gram[..2])
				.map(|(_, f)| f)
				.sum();
			let recovered = model.log_probability(n_gram).unwrap().exp() * denominator as f64;
			assert!((recovered - *frequency as f64).abs() < 1e-9);
		}
	}

	#[test]
	fn test_unigram_model() {
		let model = NGramModel::build(1, &vec![vec![vec![0, 1, 1, 0]]]).unwrap();
		assert_eq!(model.log_probability(&[1]), Some(0.5f64.ln()));
	}

	#[test]
	fn test_top_n_grams() {
		let model = happy_bigrams();
		assert_eq!(model.top_n_grams(1), vec![vec![0, 2]]);
		// ties at 2 keep first-seen order: he then e_
		assert_eq!(model.top_n_grams(3), vec![vec![0, 2], vec![2, 3], vec![3, 0]]);
		assert!(model.top_n_grams(0).is_empty());
		assert_eq!(model.top_n_grams(100).len(), 13);
	}

	#[test]
	fn test_top_n_grams_sorted_and_known() {
		let model = happy_bigrams();
		let top = model.top_n_grams(6);
		assert_eq!(top.len(), 6);
		for pair in top.windows(2) {
			assert!(model.frequency(&pair[0]) >= model.frequency(&pair[1]));
		}
		assert!(top.iter().all(|n_gram| model.frequencies().contains_key(n_gram)));
	}

	#[test]
	fn test_empty_corpus() {
		let mut model = NGramModel::new(2).unwrap();
		model.fill_n_grams(&Vec::new());
		assert!(model.n_grams().is_empty());
		assert!(matches!(model.calculate_n_grams_frequencies(), Err(LangIdError::UninitializedState(_))));
		assert!(model.top_n_grams(3).is_empty());
	}

	#[test]
	fn test_stage_order() {
		let mut model = NGramModel::new(2).unwrap();
		assert!(matches!(model.calculate_log_probabilities(), Err(LangIdError::UninitializedState(_))));
		model.fill_n_grams(&happy_corpus());
		assert!(matches!(model.calculate_log_probabilities(), Err(LangIdError::UninitializedState(_))));
		model.calculate_n_grams_frequencies().unwrap();
		model.calculate_log_probabilities().unwrap();
		assert_eq!(model.log_probabilities().len(), 13);
	}

	#[test]
	fn test_refill_discards_previous_tables() {
		let mut model = happy_bigrams();
		model.fill_n_grams(&vec![vec![vec![0, 1, 0]]]);
		assert!(model.frequencies().is_empty());
		model.calculate_n_grams_frequencies().unwrap();
		assert_eq!(model.frequencies().len(), 2);
	}
}
