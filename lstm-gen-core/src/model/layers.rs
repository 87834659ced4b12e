use ndarray::{s, Array1, Array2, ArrayView1};
use rand::Rng;

use crate::error::LoadError;
use super::weights::{LstmLayerRecord, TensorRecord};

fn sigmoid(x: f32) -> f32 {
	1.0 / (1.0 + (-x).exp())
}

fn uniform<R: Rng>(rng: &mut R, rows: usize, cols: usize, bound: f32) -> Array2<f32> {
	Array2::from_shape_fn((rows, cols), |_| rng.random_range(-bound..bound))
}

/// Fully connected layer: `y = W x + b`.
#[derive(Clone, Debug)]
pub struct Linear {
	weight: Array2<f32>, // out x in
	bias: Array1<f32>,
}

impl Linear {
	/// Wraps a `[out, in]` weight matrix and an `[out]` bias.
	pub fn new(weight: Array2<f32>, bias: Array1<f32>) -> Self {
		Self { weight, bias }
	}

	pub fn random<R: Rng>(rng: &mut R, in_features: usize, out_features: usize) -> Self {
		let bound = 1.0 / (in_features as f32).sqrt();
		let weight = uniform(rng, out_features, in_features, bound);
		let bias = Array1::from_shape_fn(out_features, |_| rng.random_range(-bound..bound));
		Self { weight, bias }
	}

	pub fn from_records(weight: TensorRecord, bias: TensorRecord, in_features: usize, out_features: usize) -> Result<Self, LoadError> {
		Ok(Self::new(
			weight.into_array2("fc.weight", out_features, in_features)?,
			bias.into_array1("fc.bias", out_features)?,
		))
	}

	/// Projects `x` (length `in`) to `out` values.
	pub fn forward(&self, x: ArrayView1<f32>) -> Array1<f32> {
		self.weight.dot(&x) + &self.bias
	}

	/// Weight matrix, `[out, in]`.
	pub fn weight(&self) -> &Array2<f32> {
		&self.weight
	}

	/// Bias vector, `[out]`.
	pub fn bias(&self) -> &Array1<f32> {
		&self.bias
	}
}

/// One recurrent layer of a stacked LSTM.
#[derive(Clone, Debug)]
pub struct LstmLayer {
	hidden_size: usize,
	weight_ih: Array2<f32>, // 4H x in
	weight_hh: Array2<f32>, // 4H x H
	bias_ih: Array1<f32>,
	bias_hh: Array1<f32>,
}

impl LstmLayer {
	pub fn random<R: Rng>(rng: &mut R, input_size: usize, hidden_size: usize) -> Self {
		let bound = 1.0 / (hidden_size as f32).sqrt();
		let gates = 4 * hidden_size;
		Self {
			hidden_size,
			weight_ih: uniform(rng, gates, input_size, bound),
			weight_hh: uniform(rng, gates, hidden_size, bound),
			bias_ih: Array1::from_shape_fn(gates, |_| rng.random_range(-bound..bound)),
			bias_hh: Array1::from_shape_fn(gates, |_| rng.random_range(-bound..bound)),
		}
	}

	/// Rebuilds layer `index` from its record, checking every shape.
	pub fn from_record(record: LstmLayerRecord, index: usize, input_size: usize, hidden_size: usize) -> Result<Self, LoadError> {
		let gates = 4 * hidden_size;
		Ok(Self {
			hidden_size,
			weight_ih: record.weight_ih.into_array2(&format!("lstm.weight_ih_l{index}"), gates, input_size)?,
			weight_hh: record.weight_hh.into_array2(&format!("lstm.weight_hh_l{index}"), gates, hidden_size)?,
			bias_ih: record.bias_ih.into_array1(&format!("lstm.bias_ih_l{index}"), gates)?,
			bias_hh: record.bias_hh.into_array1(&format!("lstm.bias_hh_l{index}"), gates)?,
		})
	}

	pub fn to_record(&self) -> LstmLayerRecord {
		LstmLayerRecord {
			weight_ih: TensorRecord::from_array(&self.weight_ih),
			weight_hh: TensorRecord::from_array(&self.weight_hh),
			bias_ih: TensorRecord::from_array(&self.bias_ih),
			bias_hh: TensorRecord::from_array(&self.bias_hh),
		}
	}

	/// Advances `(h, c)` in place by one timestep with input `x`.
	///
	/// `i, f, o = σ(...)`, `g = tanh(...)`, `c' = f*c + i*g`, `h' = o*tanh(c')`.
	pub fn step(&self, x: ArrayView1<f32>, h: &mut Array1<f32>, c: &mut Array1<f32>) {
		let n = self.hidden_size;
		let gates = self.weight_ih.dot(&x) + &self.bias_ih + self.weight_hh.dot(&*h) + &self.bias_hh;

		let input = gates.slice(s![0..n]).mapv(sigmoid);
		let forget = gates.slice(s![n..2 * n]).mapv(sigmoid);
		let cell = gates.slice(s![2 * n..3 * n]).mapv(f32::tanh);
		let output = gates.slice(s![3 * n..4 * n]).mapv(sigmoid);

		let next_c = &forget * &*c + &input * &cell;
		let next_h = &output * &next_c.mapv(f32::tanh);
		*c = next_c;
		*h = next_h;
	}
}
