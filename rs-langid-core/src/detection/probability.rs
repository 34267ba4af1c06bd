use super::{DetectionResult, Detector, ScoreOrder, check_detection_input};
use crate::error::{LangIdError, Result};
use crate::model::config::DetectorConfig;
use crate::model::ngram_model::{NGramModel, SentenceNGrams, extract_n_grams};
use crate::model::profiles::LanguageProfiles;
use crate::text::encoding::EncodedCorpus;

/// Sentence-probability detector.
///
/// Scores the unknown text, for every learnt language, by the sum of the
/// log-probabilities of all its n-grams over every configured order. Scores
/// stay in log-space: they are comparable between languages of one result,
/// and the highest is the most likely language.
///
/// An n-gram a language never produced counts as
/// [`DetectorConfig::unseen_log_probability`] instead of failing.
#[derive(Clone, Debug)]
pub struct ProbabilityLanguageDetector {
	profiles: LanguageProfiles,
}

impl ProbabilityLanguageDetector {
	pub fn new(config: DetectorConfig) -> Result<Self> {
		Ok(Self { profiles: LanguageProfiles::new(config)? })
	}

	/// Wraps already trained profiles (e.g. loaded from a cache).
	pub fn with_profiles(profiles: LanguageProfiles) -> Self {
		Self { profiles }
	}

	/// Log-probability of one sentence under `model`: the sum of the stored
	/// log-probabilities of its n-grams.
	pub fn calculate_sentence_probability(&self, model: &NGramModel, sentence_n_grams: &SentenceNGrams) -> f64 {
		let unseen = self.profiles.config().unseen_log_probability;
		sentence_n_grams
			.iter()
			.flatten()
			.map(|n_gram| model.log_probability(n_gram).unwrap_or(unseen))
			.sum()
	}
}

impl Detector for ProbabilityLanguageDetector {
	fn profiles(&self) -> &LanguageProfiles {
		&self.profiles
	}

	fn profiles_mut(&mut self) -> &mut LanguageProfiles {
		&mut self.profiles
	}

	fn score_order(&self) -> ScoreOrder {
		ScoreOrder::HigherIsBetter
	}

	/// Returns one log-probability per learnt language.
	///
	/// A profile lacking one of the configured orders (trained elsewhere with
	/// another configuration) scores every n-gram of that order as unseen.
	///
	/// # Errors
	/// - `InvalidInput` for an empty text or a text without any n-gram
	/// - `UninitializedState` if no language was learnt
	fn detect_language(&self, encoded_text: &EncodedCorpus) -> Result<DetectionResult> {
		check_detection_input(&self.profiles, encoded_text)?;
		let config = self.profiles.config();

		let unknown_n_grams: Vec<(usize, Vec<SentenceNGrams>)> =
			config.trie_levels.iter().map(|&n| (n, extract_n_grams(n, encoded_text))).collect();

		let n_gram_count: usize = unknown_n_grams
			.iter()
			.flat_map(|(_, sentences)| sentences.iter().flatten())
			.map(Vec::len)
			.sum();
		if n_gram_count == 0 {
			return Err(LangIdError::InvalidInput("text is too short for the configured n-gram orders".to_owned()));
		}

		let mut result = DetectionResult::new(self.score_order());
		for profile in self.profiles.profiles() {
			let mut log_probability = 0.0;
			for (n, sentences) in &unknown_n_grams {
				log_probability += match profile.model(*n) {
					Some(model) => sentences
						.iter()
						.map(|sentence| self.calculate_sentence_probability(model, sentence))
						.sum::<f64>(),
					None => {
						let count: usize = sentences.iter().flatten().map(Vec::len).sum();
						count as f64 * config.unseen_log_probability
					}
				};
			}
			log::debug!("Log-probability of {}: {log_probability}", profile.name());
			result.insert(profile.name(), log_probability);
		}
		Ok(result)
	}
}
