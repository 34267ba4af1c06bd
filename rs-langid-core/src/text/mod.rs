//! Text preparation: tokenization and letter encoding.

/// Splits raw text into sentences, framed tokens and letters.
pub mod tokenizer;

/// Stable letter -> id assignment shared by everything a detector learns.
pub mod letter_storage;

/// Corpus <-> id sequences.
pub mod encoding;
