use thiserror::Error;

/// Errors reported by every stage of the detection pipeline.
///
/// Each stage validates its input and its prerequisite state before
/// computing anything, and reports a violation locally through this type.
/// Callers are expected to check each stage before moving to the next one.
#[derive(Error, Debug)]
pub enum LangIdError {
	/// Wrong shape or value (multi-character letter, zero n-gram order, empty level set...)
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	/// A stage was called before its prerequisite stage completed
	#[error("Uninitialized state: {0}")]
	UninitializedState(String),

	/// Lookup of a letter id or a language that was never stored
	#[error("Unknown identifier: {0}")]
	UnknownIdentifier(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] postcard::Error),

	#[error("Configuration error: {0}")]
	Config(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, LangIdError>;
