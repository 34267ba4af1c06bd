use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LangIdError, Result};

/// Detector settings shared by both detection strategies.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DetectorConfig {
	/// N-gram orders built for every language
	#[serde(default = "default_trie_levels")]
	pub trie_levels: BTreeSet<usize>,

	/// Number of most frequent n-grams compared per order (overlap strategy)
	#[serde(default = "default_top_k")]
	pub top_k: usize,

	/// Log-probability given to an n-gram a language never produced
	/// (probability strategy). About `ln(2e-9)`.
	#[serde(default = "default_unseen_log_probability")]
	pub unseen_log_probability: f64,
}

fn default_trie_levels() -> BTreeSet<usize> {
	BTreeSet::from([2])
}

fn default_top_k() -> usize {
	10
}

fn default_unseen_log_probability() -> f64 {
	-20.0
}

impl Default for DetectorConfig {
	fn default() -> Self {
		Self {
			trie_levels: default_trie_levels(),
			top_k: default_top_k(),
			unseen_log_probability: default_unseen_log_probability(),
		}
	}
}

impl DetectorConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads a configuration from a JSON file. Missing fields take their default.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let content = fs::read_to_string(path)?;
		let config: Self = serde_json::from_str(&content)?;
		config.validate()?;
		Ok(config)
	}

	pub fn with_trie_levels<I: IntoIterator<Item = usize>>(mut self, levels: I) -> Self {
		self.trie_levels = levels.into_iter().collect();
		self
	}

	pub fn with_top_k(mut self, top_k: usize) -> Self {
		self.top_k = top_k;
		self
	}

	pub fn with_unseen_log_probability(mut self, log_probability: f64) -> Self {
		self.unseen_log_probability = log_probability;
		self
	}

	/// Checks that at least one order is configured and that every order is >= 1.
	pub fn validate(&self) -> Result<()> {
		if self.trie_levels.is_empty() {
			return Err(LangIdError::InvalidInput("at least one trie level is required".to_owned()));
		}
		if self.trie_levels.contains(&0) {
			return Err(LangIdError::InvalidInput("trie levels must be >= 1".to_owned()));
		}
		if !self.unseen_log_probability.is_finite() || self.unseen_log_probability > 0.0 {
			return Err(LangIdError::InvalidInput(format!(
				"unseen log-probability must be finite and <= 0, got {}",
				self.unseen_log_probability
			)));
		}
		Ok(())
	}
}
