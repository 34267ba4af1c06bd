//! Statistical models learnt from encoded corpora.
//!
//! - Fixed-order n-gram models (`NGramModel`)
//! - Per-language bundles of models (`LanguageProfile`)
//! - The trained state shared by the detectors (`LanguageProfiles`)
//! - Detector settings (`DetectorConfig`)

/// Detector settings, JSON loadable.
pub mod config;

/// Fixed-order n-gram model (`n >= 1`).
///
/// Handles n-gram extraction, frequency counting, conditional
/// log-probabilities and top-k reporting.
pub mod ngram_model;

/// One language: one `NGramModel` per configured order.
pub mod profile;

/// Letter vocabulary plus every learnt language.
///
/// Supports parallel training, directory loading and a postcard cache.
pub mod profiles;
