use std::collections::HashMap;

use super::{DetectionResult, Detector, ScoreOrder, check_detection_input};
use crate::error::{LangIdError, Result};
use crate::model::config::DetectorConfig;
use crate::model::ngram_model::{NGram, NGramModel};
use crate::model::profiles::LanguageProfiles;
use crate::text::encoding::EncodedCorpus;
use crate::text::letter_storage::LetterId;

/// Frequency-overlap detector.
///
/// Compares the `top_k` most frequent n-grams of the unknown text with those
/// of every learnt language, for every configured order, and sums the rank
/// distances. The lowest distance is the closest language.
#[derive(Clone, Debug)]
pub struct LanguageDetector {
	profiles: LanguageProfiles,
}

impl LanguageDetector {
	pub fn new(config: DetectorConfig) -> Result<Self> {
		Ok(Self { profiles: LanguageProfiles::new(config)? })
	}

	/// Wraps already trained profiles (e.g. loaded from a cache).
	pub fn with_profiles(profiles: LanguageProfiles) -> Self {
		Self { profiles }
	}

	/// Rank distance between two top-k n-gram lists.
	///
	/// For every n-gram of the union of both lists:
	/// - present in both: absolute difference of its two positions
	/// - missing from one list: the length of the list it is missing from
	///
	/// The measure is symmetric and `distance(a, a) == 0`.
	pub fn calculate_distance(first_n_grams: &[NGram], second_n_grams: &[NGram]) -> usize {
		let first_ranks = ranks(first_n_grams);
		let second_ranks = ranks(second_n_grams);

		let from_first: usize = first_ranks
			.iter()
			.map(|(n_gram, rank)| match second_ranks.get(n_gram) {
				Some(other) => rank.abs_diff(*other),
				None => second_n_grams.len(),
			})
			.sum();

		let only_in_second = second_ranks.keys().filter(|n_gram| !first_ranks.contains_key(*n_gram)).count();

		from_first + only_in_second * first_n_grams.len()
	}
}

/// Position of each n-gram in a ranked list; a repeated n-gram keeps its best rank.
fn ranks(n_grams: &[NGram]) -> HashMap<&[LetterId], usize> {
	let mut ranks = HashMap::with_capacity(n_grams.len());
	for (rank, n_gram) in n_grams.iter().enumerate() {
		ranks.entry(n_gram.as_slice()).or_insert(rank);
	}
	ranks
}

impl Detector for LanguageDetector {
	fn profiles(&self) -> &LanguageProfiles {
		&self.profiles
	}

	fn profiles_mut(&mut self) -> &mut LanguageProfiles {
		&mut self.profiles
	}

	fn score_order(&self) -> ScoreOrder {
		ScoreOrder::LowerIsBetter
	}

	/// Returns one summed distance per learnt language.
	///
	/// An order the text is too short for contributes nothing, the other
	/// orders still rank the languages. A profile lacking one of the orders
	/// pays the full penalty for every n-gram of the text at that order.
	///
	/// # Errors
	/// - `InvalidInput` for an empty text, or a text without any n-gram
	/// - `UninitializedState` if no language was learnt
	fn detect_language(&self, encoded_text: &EncodedCorpus) -> Result<DetectionResult> {
		check_detection_input(&self.profiles, encoded_text)?;
		let config = self.profiles.config();

		let mut unknown_tops = Vec::with_capacity(config.trie_levels.len());
		for &n in &config.trie_levels {
			match NGramModel::build(n, encoded_text) {
				Ok(model) => unknown_tops.push((n, model.top_n_grams(config.top_k))),
				Err(LangIdError::UninitializedState(_)) => log::debug!("No {n}-gram in the text, order skipped"),
				Err(e) => return Err(e),
			}
		}
		if unknown_tops.is_empty() {
			return Err(LangIdError::InvalidInput("text is too short for the configured n-gram orders".to_owned()));
		}

		let mut result = DetectionResult::new(self.score_order());
		for profile in self.profiles.profiles() {
			let distance: usize = unknown_tops
				.iter()
				.map(|(n, unknown_top)| match profile.model(*n) {
					Some(model) => Self::calculate_distance(unknown_top, &model.top_n_grams(config.top_k)),
					None => unknown_top.len() * config.top_k,
				})
				.sum();
			log::debug!("Distance to {}: {distance}", profile.name());
			result.insert(profile.name(), distance as f64);
		}
		Ok(result)
	}
}
