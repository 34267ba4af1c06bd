use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::tokenizer::{BOUNDARY, Corpus};
use crate::error::{LangIdError, Result};

/// Integer identifier of a stored letter.
pub type LetterId = usize;

/// Assigns stable integer identifiers to letters.
///
/// The first letter ever stored gets `0`, the next unseen one `1`, and so on.
/// The storage only grows: an id is never reused nor reassigned for the
/// lifetime of the storage.
///
/// # Invariants
/// - The mapping letter -> id is injective
/// - `get_letter(get_id(c)) == Some(c)` for every stored letter
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct LetterStorage {
	/// Insertion-ordered set, the position of a letter is its id
	letters: IndexSet<char>,
}

impl LetterStorage {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores a letter given as a string and returns its id.
	///
	/// Storing an already known letter is a no-op that returns the same id.
	///
	/// # Errors
	/// `InvalidInput` if `letter` is not exactly one character, or is not a
	/// lower-case alphabetic character nor the boundary marker. The storage is
	/// left untouched in that case.
	pub fn put_letter(&mut self, letter: &str) -> Result<LetterId> {
		let mut chars = letter.chars();
		match (chars.next(), chars.next()) {
			(Some(c), None) => self.put_char(c),
			_ => Err(LangIdError::InvalidInput(format!(
				"a letter must be a single character, got {letter:?}"
			))),
		}
	}

	/// Stores a single character and returns its id.
	pub fn put_char(&mut self, letter: char) -> Result<LetterId> {
		if !is_letter(letter) {
			return Err(LangIdError::InvalidInput(format!("{letter:?} is not a normalized letter")));
		}
		Ok(self.letters.insert_full(letter).0)
	}

	/// Returns the id of a letter, `None` if it was never stored.
	pub fn get_id(&self, letter: char) -> Option<LetterId> {
		self.letters.get_index_of(&letter)
	}

	/// Returns the letter stored under `id`, `None` if no letter has it.
	pub fn get_letter(&self, id: LetterId) -> Option<char> {
		self.letters.get_index(id).copied()
	}

	/// Stores every letter of every token of the corpus.
	///
	/// Fails fast on the first rejected letter. Letters stored before the
	/// failure stay stored.
	pub fn update(&mut self, corpus: &Corpus) -> Result<()> {
		let before = self.letters.len();
		for letter in corpus.iter().flatten().flatten() {
			self.put_char(*letter)?;
		}
		if self.letters.len() > before {
			log::debug!("Letter storage grew from {} to {} letters", before, self.letters.len());
		}
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.letters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.letters.is_empty()
	}
}

/// A letter is either the boundary marker or an alphabetic non upper-case character.
fn is_letter(c: char) -> bool {
	c == BOUNDARY || (c.is_alphabetic() && !c.is_uppercase())
}
