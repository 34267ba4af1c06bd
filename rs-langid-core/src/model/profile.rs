use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ngram_model::NGramModel;
use crate::error::Result;
use crate::text::encoding::EncodedCorpus;

/// Statistical fingerprint of one language: one trained model per n-gram order.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LanguageProfile {
	name: String,
	models: BTreeMap<usize, NGramModel>,
}

impl LanguageProfile {
	/// Trains one model per order of `trie_levels` over `encoded_text`.
	///
	/// # Errors
	/// Fails as soon as one model cannot be built (zero order, text without
	/// any n-gram of that order).
	pub fn build<'a, I>(name: &str, trie_levels: I, encoded_text: &EncodedCorpus) -> Result<Self>
	where
		I: IntoIterator<Item = &'a usize>,
	{
		let mut models = BTreeMap::new();
		for &n in trie_levels {
			models.insert(n, NGramModel::build(n, encoded_text)?);
		}
		Ok(Self { name: name.to_owned(), models })
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Model of order `n`, if this profile has one.
	pub fn model(&self, n: usize) -> Option<&NGramModel> {
		self.models.get(&n)
	}

	/// Models by increasing order.
	pub fn models(&self) -> impl Iterator<Item = &NGramModel> {
		self.models.values()
	}
}
