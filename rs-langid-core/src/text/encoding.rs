use super::letter_storage::{LetterId, LetterStorage};
use super::tokenizer::{Corpus, Sentence, Token};
use crate::error::{LangIdError, Result};

/// A token whose letters were replaced by their ids.
pub type EncodedToken = Vec<LetterId>;

pub type EncodedSentence = Vec<EncodedToken>;

/// Same shape as a [`Corpus`], letters replaced by ids.
pub type EncodedCorpus = Vec<EncodedSentence>;

/// Encodes a corpus by replacing every letter with its id.
///
/// The storage is updated with the corpus first, so letters never seen
/// before get new ids: encoding a new corpus extends the shared vocabulary.
///
/// # Errors
/// Propagates the failure of [`LetterStorage::update`]; nothing is encoded then.
pub fn encode_corpus(storage: &mut LetterStorage, corpus: &Corpus) -> Result<EncodedCorpus> {
	storage.update(corpus)?;

	corpus
		.iter()
		.map(|sentence| {
			sentence
				.iter()
				.map(|token| {
					token
						.iter()
						.map(|letter| known_id(storage, *letter))
						.collect::<Result<EncodedToken>>()
				})
				.collect::<Result<EncodedSentence>>()
		})
		.collect()
}

/// Id standing for a letter the storage has never seen.
///
/// No storage ever assigns it, so every n-gram containing it is unknown to
/// every trained model.
pub const UNKNOWN_LETTER: LetterId = LetterId::MAX;

/// Encodes a corpus with the letters already known to the storage, without growing it.
///
/// Letters the storage has never seen become [`UNKNOWN_LETTER`]. Used on
/// query texts so that detection leaves the vocabulary untouched while
/// unseen letters still degrade the score.
pub fn encode_query(storage: &LetterStorage, corpus: &Corpus) -> EncodedCorpus {
	corpus
		.iter()
		.map(|sentence| {
			sentence
				.iter()
				.map(|token| {
					token
						.iter()
						.map(|letter| storage.get_id(*letter).unwrap_or(UNKNOWN_LETTER))
						.collect()
				})
				.collect()
		})
		.collect()
}

/// Inverse of [`encode_corpus`] for one storage.
///
/// # Errors
/// `UnknownIdentifier` if an id was never assigned by `storage`.
pub fn decode_corpus(storage: &LetterStorage, encoded: &EncodedCorpus) -> Result<Corpus> {
	encoded
		.iter()
		.map(|sentence| {
			sentence
				.iter()
				.map(|token| {
					token
						.iter()
						.map(|id| {
							storage
								.get_letter(*id)
								.ok_or_else(|| LangIdError::UnknownIdentifier(format!("letter id {id}")))
						})
						.collect::<Result<Token>>()
				})
				.collect::<Result<Sentence>>()
		})
		.collect()
}

fn known_id(storage: &LetterStorage, letter: char) -> Result<LetterId> {
	storage
		.get_id(letter)
		.ok_or_else(|| LangIdError::UnknownIdentifier(format!("letter {letter:?}")))
}
