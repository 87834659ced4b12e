use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the vocabulary and weight artifacts.
///
/// Every variant is fatal: a generator is never built from partial or
/// mismatched artifacts.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("failed to decode {path}: {source}")]
	Decode {
		path: PathBuf,
		#[source]
		source: postcard::Error,
	},

	#[error("failed to encode {path}: {source}")]
	Encode {
		path: PathBuf,
		#[source]
		source: postcard::Error,
	},

	#[error("inconsistent vocabulary: {0}")]
	Inconsistent(String),

	#[error("shape mismatch for {tensor}: expected {expected:?}, found {found:?}")]
	ShapeMismatch {
		tensor: String,
		expected: Vec<usize>,
		found: Vec<usize>,
	},

	#[error("architecture mismatch: {0}")]
	ArchitectureMismatch(String),
}

/// Errors raised by a single generation call.
#[derive(Debug, Error, PartialEq)]
pub enum GenerateError {
	#[error("character {character:?} at position {position} is not in the vocabulary")]
	UnknownCharacter { character: char, position: usize },

	#[error("index {0} has no character mapping")]
	IndexOutOfVocabulary(usize),

	#[error("input has {found} features, the model expects {expected}")]
	InputShape { expected: usize, found: usize },

	#[error("recurrent state does not fit the model: {0}")]
	StateShape(String),

	#[error("invalid probability distribution: {0}")]
	InvalidDistribution(String),
}

impl GenerateError {
	/// `true` when the caller caused the failure (bad seed),
	/// `false` when the model or its artifacts did.
	pub fn is_input_error(&self) -> bool {
		matches!(self, GenerateError::UnknownCharacter { .. })
	}
}
