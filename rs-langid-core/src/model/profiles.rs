use std::path::Path;
use std::sync::mpsc;
use std::thread;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::config::DetectorConfig;
use super::profile::LanguageProfile;
use crate::error::{LangIdError, Result};
use crate::io;
use crate::text::encoding::{EncodedCorpus, encode_corpus, encode_query};
use crate::text::letter_storage::LetterStorage;
use crate::text::tokenizer::{BOUNDARY, tokenize_by_sentence};

/// Extension of the training corpora read by [`LanguageProfiles::from_corpus_dir`].
pub const CORPUS_EXTENSION: &str = "txt";

/// Name of the binary cache written next to the corpora.
pub const CACHE_FILE: &str = "profiles.bin";

/// Everything a detector learnt: its configuration, the letter vocabulary
/// and one profile per language.
///
/// The letter storage is shared by every language so that a given letter has
/// the same id in every profile; n-grams of different languages are thus
/// directly comparable.
///
/// # Invariants
/// - Every profile holds exactly one model per configured trie level
/// - Language names are unique; learning a name again replaces its profile
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LanguageProfiles {
	config: DetectorConfig,
	storage: LetterStorage,
	profiles: IndexMap<String, LanguageProfile>,
}

impl LanguageProfiles {
	/// Creates an empty set of profiles.
	///
	/// # Errors
	/// Returns `InvalidInput` if the configuration is invalid.
	pub fn new(config: DetectorConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self { config, storage: LetterStorage::new(), profiles: IndexMap::new() })
	}

	/// Loads every `*.txt` corpus of a directory, the file stem being the language name.
	///
	/// If a `profiles.bin` cache built with the same configuration and the
	/// same languages exists in the directory, it is loaded instead of
	/// training. Otherwise profiles are trained and the cache is (re)written.
	///
	/// # Notes
	/// - `"."` and `"./"` resolve to the current directory.
	/// - Corpora are learnt in file name order, which fixes the letter ids.
	pub fn from_corpus_dir<P: AsRef<Path>>(dir: P, config: DetectorConfig) -> Result<Self> {
		config.validate()?;

		let folder = io::resolve_folder(dir.as_ref());
		if !folder.is_dir() {
			return Err(LangIdError::InvalidInput(format!("Expected a directory, got: {}", folder.display())));
		}

		let files = io::list_files(&folder, CORPUS_EXTENSION)?;
		let names = files.iter().map(io::language_name).collect::<std::io::Result<Vec<_>>>()?;

		let cache_path = folder.join(CACHE_FILE);
		if cache_path.exists() {
			match Self::load(&cache_path) {
				Ok(cached) if cached.config == config && cached.language_names() == names => {
					log::info!("Loaded {} language profiles from {}", cached.len(), cache_path.display());
					return Ok(cached);
				}
				Ok(_) => log::warn!("Cache {} is stale, rebuilding", cache_path.display()),
				Err(e) => log::warn!("Cache {} is unreadable ({e}), rebuilding", cache_path.display()),
			}
		}

		let mut corpora = Vec::with_capacity(files.len());
		for (file, name) in files.iter().zip(names) {
			corpora.push((name, io::read_file(folder.join(file))?));
		}
		if corpora.is_empty() {
			log::warn!("No .{CORPUS_EXTENSION} corpus found in {}", folder.display());
		}

		let mut profiles = Self::new(config)?;
		profiles.learn_languages(corpora)?;
		profiles.save(&cache_path)?;
		Ok(profiles)
	}

	/// Loads profiles serialized with [`LanguageProfiles::save`].
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		let profiles: Self = postcard::from_bytes(&bytes)?;
		profiles.config.validate()?;
		Ok(profiles)
	}

	/// Serializes the profiles (postcard) and writes them atomically to `path`.
	///
	/// Extracted n-grams are not written, only the trained tables.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		io::write_atomic(&path, &bytes)?;
		log::debug!("Saved {} language profiles ({} bytes)", self.len(), bytes.len());
		Ok(())
	}

	pub fn config(&self) -> &DetectorConfig {
		&self.config
	}

	pub fn storage(&self) -> &LetterStorage {
		&self.storage
	}

	/// Mutable access to the vocabulary, to encode training corpora with it.
	pub fn storage_mut(&mut self) -> &mut LetterStorage {
		&mut self.storage
	}

	/// Trains one model per configured level over an encoded text and stores
	/// them under `language_name`, replacing any previous profile of that name.
	///
	/// # Errors
	/// `InvalidInput` for an empty name or an empty text; the error of the
	/// first model that cannot be built otherwise. Nothing is stored on error.
	pub fn learn_language(&mut self, encoded_text: &EncodedCorpus, language_name: &str) -> Result<()> {
		check_training_input(encoded_text, language_name)?;
		let profile = LanguageProfile::build(language_name, &self.config.trie_levels, encoded_text)?;
		self.insert(profile);
		Ok(())
	}

	/// Tokenizes and encodes a raw text with the shared storage, then learns it.
	pub fn learn_text(&mut self, text: &str, language_name: &str) -> Result<()> {
		let encoded = encode_corpus(&mut self.storage, &tokenize_by_sentence(text))?;
		self.learn_language(&encoded, language_name)
	}

	/// Learns several raw corpora at once.
	///
	/// Encoding goes through the shared storage one corpus after the other,
	/// in input order, since id assignment order matters. Models are then
	/// built in parallel worker threads and stored in input order.
	///
	/// # Errors
	/// If one language fails, none of them is stored. Letters already added
	/// to the storage stay there.
	pub fn learn_languages(&mut self, corpora: Vec<(String, String)>) -> Result<()> {
		let mut encoded = Vec::with_capacity(corpora.len());
		for (name, text) in corpora {
			let text = encode_corpus(&mut self.storage, &tokenize_by_sentence(&text))?;
			check_training_input(&text, &name)?;
			encoded.push((name, text));
		}
		if encoded.is_empty() {
			return Ok(());
		}

		let total = encoded.len();
		let chunk_size = total.div_ceil(num_cpus::get().max(1));
		log::info!("Training {total} languages by chunks of {chunk_size}");

		let (tx, rx) = mpsc::channel();
		let mut remaining = encoded.into_iter().enumerate();
		loop {
			let chunk: Vec<(usize, (String, EncodedCorpus))> = remaining.by_ref().take(chunk_size).collect();
			if chunk.is_empty() {
				break;
			}
			let tx = tx.clone();
			let trie_levels = self.config.trie_levels.clone();

			thread::spawn(move || {
				for (index, (name, text)) in chunk {
					let profile = LanguageProfile::build(&name, &trie_levels, &text);
					if tx.send((index, profile)).is_err() {
						log::warn!("Training of {name} finished after the receiver gave up");
						return;
					}
				}
			});
		}
		drop(tx);

		let mut built: Vec<Option<LanguageProfile>> = vec![None; total];
		for (index, profile) in rx.iter() {
			built[index] = Some(profile?);
		}

		for profile in built.into_iter().flatten() {
			self.insert(profile);
		}
		Ok(())
	}

	/// Encodes a query text without growing the vocabulary.
	///
	/// # Errors
	/// `InvalidInput` if the text contains no word at all.
	pub fn encode_query(&self, text: &str) -> Result<EncodedCorpus> {
		let corpus = tokenize_by_sentence(text);
		if corpus.is_empty() {
			return Err(LangIdError::InvalidInput("text has no word to detect".to_owned()));
		}
		let encoded = encode_query(&self.storage, &corpus);
		if encoded.iter().flatten().flatten().all(|id| self.storage.get_letter(*id).is_none_or(|c| c == BOUNDARY)) {
			log::warn!("Query shares no letter with the trained languages");
		}
		Ok(encoded)
	}

	pub fn profile(&self, language_name: &str) -> Option<&LanguageProfile> {
		self.profiles.get(language_name)
	}

	/// Profiles in the order languages were first learnt.
	pub fn profiles(&self) -> impl Iterator<Item = &LanguageProfile> {
		self.profiles.values()
	}

	pub fn language_names(&self) -> Vec<&str> {
		self.profiles.keys().map(String::as_str).collect()
	}

	pub fn len(&self) -> usize {
		self.profiles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.profiles.is_empty()
	}

	fn insert(&mut self, profile: LanguageProfile) {
		let name = profile.name().to_owned();
		if self.profiles.insert(name.clone(), profile).is_some() {
			log::info!("Replaced profile of {name}");
		} else {
			log::info!("Learnt profile of {name}");
		}
	}
}

fn check_training_input(encoded_text: &EncodedCorpus, language_name: &str) -> Result<()> {
	if language_name.trim().is_empty() {
		return Err(LangIdError::InvalidInput("language name cannot be empty".to_owned()));
	}
	if encoded_text.is_empty() {
		return Err(LangIdError::InvalidInput(format!("training text of {language_name} is empty")));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	const ENGLISH: &str = "The cat sat on the mat. The dog ate the bone.";
	const GERMAN: &str = "Der Hund ist nicht hier. Wir sprechen Deutsch.";

	fn config() -> DetectorConfig {
		DetectorConfig::new().with_trie_levels([2, 3]).with_top_k(5)
	}

	#[test]
	fn test_learn_text() {
		let mut profiles = LanguageProfiles::new(config()).unwrap();
		profiles.learn_text(ENGLISH, "english").unwrap();
		profiles.learn_text(GERMAN, "german").unwrap();

		assert_eq!(profiles.language_names(), vec!["english", "german"]);
		let english = profiles.profile("english").unwrap();
		assert!(english.model(2).is_some());
		assert!(english.model(3).is_some());
		assert_eq!(profiles.storage().get_id('_'), Some(0));
	}

	#[test]
	fn test_relearning_replaces() {
		let mut profiles = LanguageProfiles::new(config()).unwrap();
		profiles.learn_text(ENGLISH, "english").unwrap();
		profiles.learn_text(GERMAN, "english").unwrap();
		assert_eq!(profiles.len(), 1);

		let h = profiles.storage().get_id('h').unwrap();
		let u = profiles.storage().get_id('u').unwrap();
		let model = profiles.profile("english").unwrap().model(2).unwrap();
		assert_eq!(model.frequency(&[h, u]), 1);
	}

	#[test]
	fn test_invalid_training_input() {
		let mut profiles = LanguageProfiles::new(config()).unwrap();
		assert!(matches!(profiles.learn_text("", "english"), Err(LangIdError::InvalidInput(_))));
		assert!(matches!(profiles.learn_text(ENGLISH, " "), Err(LangIdError::InvalidInput(_))));
		assert!(profiles.is_empty());
	}

	#[test]
	fn test_invalid_config() {
		let result = LanguageProfiles::new(DetectorConfig::new().with_trie_levels([]));
		assert!(matches!(result, Err(LangIdError::InvalidInput(_))));
	}

	#[test]
	fn test_learn_languages_matches_serial_training() {
		let mut serial = LanguageProfiles::new(config()).unwrap();
		serial.learn_text(ENGLISH, "english").unwrap();
		serial.learn_text(GERMAN, "german").unwrap();

		let mut parallel = LanguageProfiles::new(config()).unwrap();
		parallel
			.learn_languages(vec![
				("english".to_owned(), ENGLISH.to_owned()),
				("german".to_owned(), GERMAN.to_owned()),
			])
			.unwrap();

		assert_eq!(parallel.language_names(), serial.language_names());
		for name in ["english", "german"] {
			let a = serial.profile(name).unwrap().model(3).unwrap();
			let b = parallel.profile(name).unwrap().model(3).unwrap();
			assert_eq!(a.frequencies(), b.frequencies());
		}
	}

	#[test]
	fn test_learn_languages_is_all_or_nothing() {
		let mut profiles = LanguageProfiles::new(DetectorConfig::new().with_trie_levels([6])).unwrap();
		let result = profiles.learn_languages(vec![
			("english".to_owned(), "Extraordinary things happen.".to_owned()),
			("short".to_owned(), "a b c".to_owned()),
		]);
		assert!(result.is_err());
		assert!(profiles.is_empty());
	}

	#[test]
	fn test_encode_query() {
		let mut profiles = LanguageProfiles::new(config()).unwrap();
		profiles.learn_text(ENGLISH, "english").unwrap();
		let size = profiles.storage().len();

		let encoded = profiles.encode_query("The zebra.").unwrap();
		assert_eq!(encoded.len(), 1);
		assert_eq!(profiles.storage().len(), size);
		assert!(matches!(profiles.encode_query("42!"), Err(LangIdError::InvalidInput(_))));
	}

	#[test]
	fn test_save_and_load() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("profiles.bin");

		let mut profiles = LanguageProfiles::new(config()).unwrap();
		profiles.learn_text(ENGLISH, "english").unwrap();
		profiles.save(&path).unwrap();

		let loaded = LanguageProfiles::load(&path).unwrap();
		assert_eq!(loaded.config(), profiles.config());
		assert_eq!(loaded.storage().len(), profiles.storage().len());
		let before = profiles.profile("english").unwrap().model(2).unwrap();
		let after = loaded.profile("english").unwrap().model(2).unwrap();
		assert_eq!(before.frequencies(), after.frequencies());
		assert_eq!(before.top_n_grams(5), after.top_n_grams(5));
	}

	#[test]
	fn test_from_corpus_dir_and_cache() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("german.txt"), GERMAN).unwrap();
		fs::write(dir.path().join("english.txt"), ENGLISH).unwrap();
		fs::write(dir.path().join("notes.md"), "ignored").unwrap();

		let profiles = LanguageProfiles::from_corpus_dir(dir.path(), config()).unwrap();
		assert_eq!(profiles.language_names(), vec!["english", "german"]);
		assert!(dir.path().join(CACHE_FILE).exists());

		// Cached copy is reused as long as languages and config match
		let cached = LanguageProfiles::from_corpus_dir(dir.path(), config()).unwrap();
		assert_eq!(cached.language_names(), profiles.language_names());

		// A new corpus invalidates the cache
		fs::write(dir.path().join("french.txt"), "Le chat est sur la table.").unwrap();
		let rebuilt = LanguageProfiles::from_corpus_dir(dir.path(), config()).unwrap();
		assert_eq!(rebuilt.language_names(), vec!["english", "french", "german"]);
	}

	#[test]
	fn test_from_missing_dir() {
		let result = LanguageProfiles::from_corpus_dir("/definitely/not/here", config());
		assert!(matches!(result, Err(LangIdError::InvalidInput(_))));
	}
}
