//! Language detection strategies.
//!
//! Both detectors share the same training capability ([`LanguageProfiles`])
//! and the same [`Detector`] interface; they only differ in how an unknown
//! text is scored against the learnt profiles:
//! - [`LanguageDetector`]: distance between top-k n-gram rankings (lower is better)
//! - [`ProbabilityLanguageDetector`]: log-probability of the text (higher is better)

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{LangIdError, Result};
use crate::model::profiles::LanguageProfiles;
use crate::text::encoding::EncodedCorpus;

mod overlap;
mod probability;

pub use overlap::LanguageDetector;
pub use probability::ProbabilityLanguageDetector;

/// Whether a detector's best score is its lowest or its highest one.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreOrder {
	LowerIsBetter,
	HigherIsBetter,
}

/// Score of every known language for one query.
///
/// Scores are kept in the order languages were learnt. The result carries
/// no ranking by itself; [`DetectionResult::best`] and
/// [`DetectionResult::ranking`] apply the detector's [`ScoreOrder`].
#[derive(Serialize, Clone, Debug)]
pub struct DetectionResult {
	order: ScoreOrder,
	scores: IndexMap<String, f64>,
}

impl DetectionResult {
	pub fn new(order: ScoreOrder) -> Self {
		Self { order, scores: IndexMap::new() }
	}

	pub fn insert(&mut self, language: &str, score: f64) {
		self.scores.insert(language.to_owned(), score);
	}

	pub fn get(&self, language: &str) -> Option<f64> {
		self.scores.get(language).copied()
	}

	pub fn order(&self) -> ScoreOrder {
		self.order
	}

	pub fn scores(&self) -> &IndexMap<String, f64> {
		&self.scores
	}

	pub fn len(&self) -> usize {
		self.scores.len()
	}

	pub fn is_empty(&self) -> bool {
		self.scores.is_empty()
	}

	/// Languages sorted best first. Equal scores keep the learning order.
	pub fn ranking(&self) -> Vec<(&str, f64)> {
		let mut ranking: Vec<(&str, f64)> = self.scores.iter().map(|(name, score)| (name.as_str(), *score)).collect();
		ranking.sort_by(|a, b| self.compare(a.1, b.1));
		ranking
	}

	/// Best scoring language, `None` if no language is known.
	pub fn best(&self) -> Option<(&str, f64)> {
		self.ranking().into_iter().next()
	}

	/// `Less` when `a` is a better score than `b`.
	fn compare(&self, a: f64, b: f64) -> Ordering {
		match self.order {
			ScoreOrder::LowerIsBetter => a.total_cmp(&b),
			ScoreOrder::HigherIsBetter => b.total_cmp(&a),
		}
	}
}

/// Common interface of the detection strategies.
///
/// Implementors own their [`LanguageProfiles`]; training is shared, only
/// [`Detector::detect_language`] differs.
pub trait Detector {
	fn profiles(&self) -> &LanguageProfiles;

	fn profiles_mut(&mut self) -> &mut LanguageProfiles;

	fn score_order(&self) -> ScoreOrder;

	/// Scores an encoded unknown text against every learnt language.
	fn detect_language(&self, encoded_text: &EncodedCorpus) -> Result<DetectionResult>;

	/// Builds the profile of `language_name` from an encoded text.
	///
	/// The text must be encoded with this detector's storage.
	fn learn_language(&mut self, encoded_text: &EncodedCorpus, language_name: &str) -> Result<()> {
		self.profiles_mut().learn_language(encoded_text, language_name)
	}

	/// Tokenizes, encodes and learns a raw text.
	fn learn_text(&mut self, text: &str, language_name: &str) -> Result<()> {
		self.profiles_mut().learn_text(text, language_name)
	}

	/// Tokenizes, encodes and scores a raw text.
	fn detect_text(&self, text: &str) -> Result<DetectionResult> {
		let encoded = self.profiles().encode_query(text)?;
		self.detect_language(&encoded)
	}

	/// Name of the best matching language for a raw text.
	fn best_language(&self, text: &str) -> Result<Option<String>> {
		Ok(self.detect_text(text)?.best().map(|(name, _)| name.to_owned()))
	}
}

/// Checks the preconditions shared by both strategies.
fn check_detection_input(profiles: &LanguageProfiles, encoded_text: &EncodedCorpus) -> Result<()> {
	if encoded_text.is_empty() {
		return Err(LangIdError::InvalidInput("cannot detect the language of an empty text".to_owned()));
	}
	if profiles.is_empty() {
		return Err(LangIdError::UninitializedState("no language learnt yet".to_owned()));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ranking_lower_is_better() {
		let mut result = DetectionResult::new(ScoreOrder::LowerIsBetter);
		result.insert("english", 12.0);
		result.insert("german", 4.0);
		result.insert("french", 4.0);
		assert_eq!(result.ranking(), vec![("german", 4.0), ("french", 4.0), ("english", 12.0)]);
		assert_eq!(result.best(), Some(("german", 4.0)));
	}

	#[test]
	fn test_ranking_higher_is_better() {
		let mut result = DetectionResult::new(ScoreOrder::HigherIsBetter);
		result.insert("english", -12.0);
		result.insert("german", -40.5);
		assert_eq!(result.best(), Some(("english", -12.0)));
		assert_eq!(result.get("german"), Some(-40.5));
		assert_eq!(result.get("french"), None);
	}

	#[test]
	fn test_empty_result() {
		let result = DetectionResult::new(ScoreOrder::HigherIsBetter);
		assert!(result.is_empty());
		assert_eq!(result.best(), None);
	}
}
