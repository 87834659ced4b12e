use ndarray::{Array1, Array2, Dimension, Array};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use super::char_lstm::ModelConfig;

/// A tensor as stored on disk: its shape and its values in row-major order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TensorRecord {
	pub shape: Vec<usize>,
	pub data: Vec<f32>,
}

impl TensorRecord {
	/// Flattens `array` in row-major order.
	pub fn from_array<D: Dimension>(array: &Array<f32, D>) -> Self {
		Self {
			shape: array.shape().to_vec(),
			data: array.iter().copied().collect(),
		}
	}

	/// Checks the declared shape and the value count before building the array.
	fn check(&self, tensor: &str, expected: &[usize]) -> Result<(), LoadError> {
		let count: usize = expected.iter().product();
		if self.shape != expected || self.data.len() != count {
			return Err(LoadError::ShapeMismatch {
				tensor: tensor.to_owned(),
				expected: expected.to_vec(),
				found: if self.shape == expected { vec![self.data.len()] } else { self.shape.clone() },
			});
		}
		Ok(())
	}

	/// Rebuilds a `[rows, cols]` matrix; `tensor` names it in the error.
	pub fn into_array2(self, tensor: &str, rows: usize, cols: usize) -> Result<Array2<f32>, LoadError> {
		self.check(tensor, &[rows, cols])?;
		Array2::from_shape_vec((rows, cols), self.data).map_err(|_| LoadError::ShapeMismatch {
			tensor: tensor.to_owned(),
			expected: vec![rows, cols],
			found: self.shape,
		})
	}

	/// Rebuilds a vector of `len` values; `tensor` names it in the error.
	pub fn into_array1(self, tensor: &str, len: usize) -> Result<Array1<f32>, LoadError> {
		self.check(tensor, &[len])?;
		Ok(Array1::from_vec(self.data))
	}
}

/// Parameters of one LSTM layer.
///
/// Gate rows are stacked in the order input, forget, cell, output.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LstmLayerRecord {
	pub weight_ih: TensorRecord,
	pub weight_hh: TensorRecord,
	pub bias_ih: TensorRecord,
	pub bias_hh: TensorRecord,
}

/// Full content of the weight file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelWeights {
	pub config: ModelConfig,
	pub layers: Vec<LstmLayerRecord>,
	pub fc_weight: TensorRecord,
	pub fc_bias: TensorRecord,
}
