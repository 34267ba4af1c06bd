use lazy_static::lazy_static;
use regex::Regex;

/// Marker framing every word on both sides.
pub const BOUNDARY: char = '_';

/// One word: its letters framed by a leading and a trailing [`BOUNDARY`].
pub type Token = Vec<char>;

/// A non-empty sequence of tokens.
pub type Sentence = Vec<Token>;

/// Top-level unit passed between pipeline stages.
pub type Corpus = Vec<Sentence>;

lazy_static! {
	/// One or more sentence terminators act as a single delimiter
	static ref SENTENCE_DELIMITER: Regex = Regex::new(r"[.!?]+").unwrap();
	/// Anything that is neither an ASCII letter nor whitespace (applied after lower-casing)
	static ref NON_LETTER: Regex = Regex::new(r"[^a-z\s\x1c-\x1f]").unwrap();
	/// Unicode whitespace plus the ASCII file, group, record and unit separators
	static ref WORD_SEPARATOR: Regex = Regex::new(r"[\s\x1c-\x1f]+").unwrap();
}

/// Splits a text into sentences, sentences into words, words into letters.
///
/// - The text is lower-cased first.
/// - Sentences end on any run of `.`, `!` or `?`.
/// - Everything that is not an ASCII letter or whitespace is stripped.
/// - Sentences left without any word are dropped, so the corpus never
///   contains an empty sentence or an empty token.
///
/// Example: `"She is happy. He is happy."` gives two sentences of three
/// tokens each, the first one being `['_', 's', 'h', 'e', '_']`.
///
/// An empty text gives an empty corpus.
pub fn tokenize_by_sentence(text: &str) -> Corpus {
	if text.is_empty() {
		return Corpus::new();
	}

	let lowered = text.to_lowercase();
	SENTENCE_DELIMITER
		.split(&lowered)
		.filter(|fragment| !fragment.is_empty())
		.map(tokenize_sentence)
		.filter(|sentence| !sentence.is_empty())
		.collect()
}

/// Turns one lower-cased sentence fragment into framed tokens.
fn tokenize_sentence(fragment: &str) -> Sentence {
	let letters = NON_LETTER.replace_all(fragment, "");
	WORD_SEPARATOR
		.split(&letters)
		.filter(|word| !word.is_empty())
		.map(|word| {
			let mut token = Token::with_capacity(word.len() + 2);
			token.push(BOUNDARY);
			token.extend(word.chars());
			token.push(BOUNDARY);
			token
		})
		.collect()
}
