use std::path::Path;

use ndarray::{s, Array1, Array2, Array3, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, LoadError};
use crate::io::{read_artifact, write_artifact};
use super::layers::{Linear, LstmLayer};
use super::sampling::one_hot;
use super::weights::{ModelWeights, TensorRecord};

/// File holding the serialized `ModelWeights`.
pub const WEIGHTS_FILE: &str = "text_generator_model.bin";

/// Default width of every LSTM layer.
pub const DEFAULT_HIDDEN_SIZE: usize = 160;

/// Default number of stacked LSTM layers.
pub const DEFAULT_NUM_LAYERS: usize = 6;

/// Architecture hyperparameters. Weight shapes are derived from these and
/// must match them exactly.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelConfig {
	pub input_size: usize,
	pub hidden_size: usize,
	pub num_layers: usize,
	pub num_classes: usize,
}

impl ModelConfig {
	/// Default architecture for a vocabulary of `size` characters.
	pub fn for_vocabulary(size: usize) -> Self {
		Self {
			input_size: size,
			hidden_size: DEFAULT_HIDDEN_SIZE,
			num_layers: DEFAULT_NUM_LAYERS,
			num_classes: size,
		}
	}

	/// Every dimension must be non-zero.
	pub fn validate(&self) -> Result<(), LoadError> {
		if self.input_size == 0 || self.hidden_size == 0 || self.num_layers == 0 || self.num_classes == 0 {
			return Err(LoadError::ArchitectureMismatch(format!("degenerate architecture {self:?}")));
		}
		Ok(())
	}
}

/// Recurrent `(h, c)` state of every layer, owned by one generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct LstmState {
	h: Vec<Array1<f32>>,
	c: Vec<Array1<f32>>,
}

impl LstmState {
	pub(crate) fn zeros(config: &ModelConfig) -> Self {
		Self {
			h: vec![Array1::zeros(config.hidden_size); config.num_layers],
			c: vec![Array1::zeros(config.hidden_size); config.num_layers],
		}
	}
}

/// Character-level LSTM: stacked recurrent layers followed by a linear
/// projection to vocabulary-size logits.
///
/// The model holds no mutable state; every call takes the recurrent state
/// it advances, so one instance can be shared between threads.
#[derive(Clone, Debug)]
pub struct CharLstm {
	config: ModelConfig,
	layers: Vec<LstmLayer>,
	fc: Linear,
}

impl CharLstm {
	/// Randomly initialized model, uniform in `(-1/sqrt(H), 1/sqrt(H))`.
	///
	/// Produces noise, not text: meant for fixtures and bootstrapping artifacts.
	pub fn random<R: Rng>(config: ModelConfig, rng: &mut R) -> Self {
		let layers = (0..config.num_layers)
			.map(|i| {
				let input_size = if i == 0 { config.input_size } else { config.hidden_size };
				LstmLayer::random(rng, input_size, config.hidden_size)
			})
			.collect();
		let fc = Linear::random(rng, config.hidden_size, config.num_classes);
		Self { config, layers, fc }
	}

	/// Loads a weight file and checks it against the expected architecture.
	///
	/// # Errors
	/// - `LoadError::Io` / `LoadError::Decode` if the file is missing or corrupt
	/// - `LoadError::ArchitectureMismatch` if the stored hyperparameters differ
	/// - `LoadError::ShapeMismatch` if any tensor disagrees with the hyperparameters
	pub fn load<P: AsRef<Path>>(filepath: P, expected: &ModelConfig) -> Result<Self, LoadError> {
		let weights: ModelWeights = read_artifact(filepath)?;
		Self::from_weights(weights, expected)
	}

	/// Builds a model from decoded weights, checking them against `expected`.
	pub fn from_weights(weights: ModelWeights, expected: &ModelConfig) -> Result<Self, LoadError> {
		let config = weights.config;
		config.validate()?;
		if config != *expected {
			return Err(LoadError::ArchitectureMismatch(format!(
				"weights declare {config:?}, expected {expected:?}"
			)));
		}
		if weights.layers.len() != config.num_layers {
			return Err(LoadError::ArchitectureMismatch(format!(
				"weights hold {} layers, expected {}",
				weights.layers.len(),
				config.num_layers
			)));
		}

		let layers = weights
			.layers
			.into_iter()
			.enumerate()
			.map(|(i, record)| {
				let input_size = if i == 0 { config.input_size } else { config.hidden_size };
				LstmLayer::from_record(record, i, input_size, config.hidden_size)
			})
			.collect::<Result<Vec<_>, _>>()?;
		let fc = Linear::from_records(weights.fc_weight, weights.fc_bias, config.hidden_size, config.num_classes)?;

		Ok(Self { config, layers, fc })
	}

	/// Copies the parameters into their on-disk record.
	pub fn to_weights(&self) -> ModelWeights {
		ModelWeights {
			config: self.config,
			layers: self.layers.iter().map(LstmLayer::to_record).collect(),
			fc_weight: TensorRecord::from_array(self.fc.weight()),
			fc_bias: TensorRecord::from_array(self.fc.bias()),
		}
	}

	/// Writes the weight file to `filepath`, creating its directory if needed.
	pub fn save<P: AsRef<Path>>(&self, filepath: P) -> Result<(), LoadError> {
		write_artifact(filepath, &self.to_weights())
	}

	/// Architecture of this model.
	pub fn config(&self) -> &ModelConfig {
		&self.config
	}

	/// Fresh zero state for this model.
	pub fn zero_state(&self) -> LstmState {
		LstmState::zeros(&self.config)
	}

	/// A state must hold one `(h, c)` pair of width `hidden_size` per layer.
	fn check_state(&self, state: &LstmState) -> Result<(), GenerateError> {
		let layers = self.layers.len();
		if state.h.len() != layers || state.c.len() != layers {
			return Err(GenerateError::StateShape(format!(
				"{} hidden and {} cell vectors for {layers} layers",
				state.h.len(),
				state.c.len()
			)));
		}
		let hidden = self.config.hidden_size;
		if let Some(i) = (0..layers).find(|&i| state.h[i].len() != hidden || state.c[i].len() != hidden) {
			return Err(GenerateError::StateShape(format!(
				"layer {i} has width {}/{}, expected {hidden}",
				state.h[i].len(),
				state.c[i].len()
			)));
		}
		Ok(())
	}

	/// Logits for the top-layer hidden state of `state`, without advancing it.
	fn project(&self, state: &LstmState) -> Array1<f32> {
		match state.h.last() {
			Some(h) => self.fc.forward(h.view()),
			None => self.fc.bias().clone(),
		}
	}

	/// Advances `state` by one one-hot encoded character and returns the
	/// logits for the next character.
	pub fn forward_step(&self, x: ArrayView1<f32>, state: &mut LstmState) -> Result<Array1<f32>, GenerateError> {
		if x.len() != self.config.input_size {
			return Err(GenerateError::InputShape { expected: self.config.input_size, found: x.len() });
		}
		self.check_state(state)?;
		let mut input = x.to_owned();
		for (i, layer) in self.layers.iter().enumerate() {
			layer.step(input.view(), &mut state.h[i], &mut state.c[i]);
			input = state.h[i].clone();
		}
		Ok(self.fc.forward(input.view()))
	}

	/// Feeds a sequence of character indices through the model and returns
	/// the logits for the character after the last one.
	///
	/// With an empty sequence the logits are the projection of the current
	/// top-layer hidden state.
	pub fn forward_indices(&self, indices: &[usize], state: &mut LstmState) -> Result<Array1<f32>, GenerateError> {
		self.check_state(state)?;
		let mut logits = None;
		for &index in indices {
			if index >= self.config.input_size {
				return Err(GenerateError::IndexOutOfVocabulary(index));
			}
			let x = one_hot(index, self.config.input_size);
			logits = Some(self.forward_step(x.view(), state)?);
		}
		Ok(logits.unwrap_or_else(|| self.project(state)))
	}

	/// Runs a batch of one-hot sequences `[batch, seq_len, vocab]` from a
	/// zero state and returns the logits of the last timestep, `[batch, vocab]`.
	pub fn forward(&self, batch: &Array3<f32>) -> Result<Array2<f32>, GenerateError> {
		let (batch_size, seq_len, features) = batch.dim();
		if features != self.config.input_size {
			return Err(GenerateError::InputShape { expected: self.config.input_size, found: features });
		}

		let mut out = Array2::zeros((batch_size, self.config.num_classes));
		for b in 0..batch_size {
			let mut state = self.zero_state();
			let mut logits = self.project(&state);
			for t in 0..seq_len {
				logits = self.forward_step(batch.slice(s![b, t, ..]), &mut state)?;
			}
			out.row_mut(b).assign(&logits);
		}
		Ok(out)
	}
}
