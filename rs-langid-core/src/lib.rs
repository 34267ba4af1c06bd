//! Language identification from character n-gram statistics.
//!
//! This crate provides:
//! - Tokenization of raw text into framed letter tokens
//! - Stable letter -> id encoding
//! - Character n-gram models with frequencies and log-probabilities
//! - Two detection strategies over per-language profiles:
//!   top-k rank distance and sentence log-probability
//!
//! ```
//! use rs_langid_core::{Detector, DetectorConfig, LanguageDetector};
//!
//! let mut detector = LanguageDetector::new(DetectorConfig::default()).unwrap();
//! detector.learn_text("The cat sat on the mat.", "english").unwrap();
//! detector.learn_text("Die Katze sitzt auf der Matte.", "german").unwrap();
//! assert_eq!(detector.best_language("The cat sat on the mat.").unwrap().as_deref(), Some("english"));
//! ```

/// Error type shared by every stage.
pub mod error;

/// Tokenizer, letter storage and corpus encoding.
pub mod text;

/// N-gram models, language profiles and configuration.
pub mod model;

/// Frequency-overlap and probability detectors.
pub mod detection;

/// File helpers (corpus listing, atomic writes).
pub mod io;

pub use detection::{DetectionResult, Detector, LanguageDetector, ProbabilityLanguageDetector, ScoreOrder};
pub use error::{LangIdError, Result};
pub use model::config::DetectorConfig;
pub use model::ngram_model::{NGram, NGramModel};
pub use model::profile::LanguageProfile;
pub use model::profiles::LanguageProfiles;
pub use text::encoding::{EncodedCorpus, decode_corpus, encode_corpus};
pub use text::letter_storage::{LetterId, LetterStorage};
pub use text::tokenizer::{Corpus, tokenize_by_sentence};
