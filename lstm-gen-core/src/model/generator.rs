use std::path::Path;

use log::{debug, info};
use rand::Rng;

use crate::error::{GenerateError, LoadError};
use crate::io;
use super::char_lstm::{CharLstm, ModelConfig, WEIGHTS_FILE};
use super::sampling::{sample_index, softmax};
use super::vocabulary::Vocabulary;

/// Default seed used when a request does not provide one.
pub const DEFAULT_PROMPT: &str = "The";

/// Default number of characters to sample.
pub const DEFAULT_LENGTH: usize = 300;

/// Read-only generation context: a vocabulary and the model trained on it.
///
/// # Responsibilities
/// - Load and cross-check the vocabulary and weight artifacts once
/// - Sample text autoregressively from a seed
///
/// # Invariants
/// - `vocabulary.size() == config.input_size == config.num_classes`
#[derive(Debug, Clone)]
pub struct Generator {
	vocabulary: Vocabulary,
	model: CharLstm,
}

impl Generator {
	/// Loads a generator from a model directory with the default architecture.
	///
	/// # Parameters
	/// - `dir`: directory holding `vocab.bin`, `char_to_idx.bin`,
	///   `idx_to_char.bin` and `text_generator_model.bin`.
	///   Both `"folder"` and `"folder/"` are accepted.
	///
	/// # Errors
	/// - Returns an error if the path is not a directory.
	/// - Returns an error if any artifact is missing, corrupt, or inconsistent.
	pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, LoadError> {
		let dir = io::normalize_folder(dir);
		if !dir.is_dir() {
			return Err(LoadError::Io {
				path: dir.clone(),
				source: std::io::Error::new(std::io::ErrorKind::NotFound, "expected a model directory"),
			});
		}
		let vocabulary = Vocabulary::load(&dir)?;
		let config = ModelConfig::for_vocabulary(vocabulary.size());
		Self::load_with(vocabulary, &dir, config)
	}

	/// Loads a generator whose weights use a non-default architecture.
	pub fn with_config<P: AsRef<Path>>(dir: P, config: ModelConfig) -> Result<Self, LoadError> {
		let dir = io::normalize_folder(dir);
		let vocabulary = Vocabulary::load(&dir)?;
		Self::load_with(vocabulary, &dir, config)
	}

	fn load_with(vocabulary: Vocabulary, dir: &Path, config: ModelConfig) -> Result<Self, LoadError> {
		let model = CharLstm::load(dir.join(WEIGHTS_FILE), &config)?;
		let generator = Self::from_parts(vocabulary, model)?;
		info!(
			"Loaded model from {}: {} characters, {} layers of {} units",
			dir.display(),
			config.input_size,
			config.num_layers,
			config.hidden_size
		);
		Ok(generator)
	}

	/// Assembles a generator from an in-memory vocabulary and model.
	///
	/// # Errors
	/// `LoadError::ArchitectureMismatch` if the model's input or output width
	/// differs from the vocabulary size.
	pub fn from_parts(vocabulary: Vocabulary, model: CharLstm) -> Result<Self, LoadError> {
		let config = model.config();
		config.validate()?;
		if config.input_size != vocabulary.size() || config.num_classes != vocabulary.size() {
			return Err(LoadError::ArchitectureMismatch(format!(
				"vocabulary holds {} characters, model expects {} inputs and {} classes",
				vocabulary.size(),
				config.input_size,
				config.num_classes
			)));
		}
		Ok(Self { vocabulary, model })
	}

	/// Writes the vocabulary and weight artifacts into `dir`.
	pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<(), LoadError> {
		let dir = dir.as_ref();
		self.vocabulary.save(dir)?;
		self.model.save(dir.join(WEIGHTS_FILE))
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn config(&self) -> &ModelConfig {
		self.model.config()
	}

	/// Samples `length` characters after `seed` with the thread-local RNG.
	///
	/// Two calls with the same arguments are not expected to agree.
	pub fn generate(&self, seed: &str, length: usize) -> Result<String, GenerateError> {
		self.generate_with_rng(seed, length, &mut rand::rng())
	}

	/// Samples `length` characters after `seed`.
	///
	/// # Behavior
	/// - The seed is encoded up front; an unknown character fails before any
	///   model call.
	/// - The seed primes the recurrent state, then each step feeds only the
	///   character sampled at the previous step. The state is carried across
	///   steps, so context is not lost.
	/// - Always runs exactly `length` steps.
	///
	/// # Returns
	/// `seed` followed by the sampled characters.
	pub fn generate_with_rng<R: Rng>(&self, seed: &str, length: usize, rng: &mut R) -> Result<String, GenerateError> {
		let mut input = self.vocabulary.encode(seed)?;
		debug!("Generating {length} characters after a {}-character seed", input.len());

		let mut result = seed.to_owned();

		let mut state = self.model.zero_state();
		for _ in 0..length {
			let logits = self.model.forward_indices(&input, &mut state)?;
			let probs = softmax(&logits);
			let next_index = sample_index(&probs, rng)?;
			result.push(self.vocabulary.decode(next_index)?);

			input.clear();
			input.push(next_index);
		}

		Ok(result)
	}
}
