use ndarray::Array1;
use rand::Rng;

use crate::error::GenerateError;

/// Vector of `size` zeros with a single `1.0` at `index`.
///
/// # Panics
/// If `index >= size`.
pub fn one_hot(index: usize, size: usize) -> Array1<f32> {
	assert!(index < size, "one-hot index {index} out of range for size {size}");
	let mut v = Array1::zeros(size);
	v[index] = 1.0;
	v
}

/// Converts logits into a probability distribution summing to 1.
///
/// Subtracts the maximum first so large logits do not overflow `exp`.
pub fn softmax(logits: &Array1<f32>) -> Array1<f32> {
	let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
	let exp = logits.mapv(|x| (x - max).exp());
	let sum = exp.sum();
	exp / sum
}

/// Draws one index from `probs` using weighted random sampling.
///
/// The probability of selecting an index is proportional to its weight;
/// weights do not need to sum to exactly 1.
///
/// This method performs:
/// - an O(n) scan to validate and sum the weights
/// - a cumulative subtraction to select a bucket
///
/// # Errors
/// `GenerateError::InvalidDistribution` if the distribution is empty, holds a
/// negative or non-finite weight, or sums to zero.
pub fn sample_index<R: Rng>(probs: &Array1<f32>, rng: &mut R) -> Result<usize, GenerateError> {
	if probs.is_empty() {
		return Err(GenerateError::InvalidDistribution("empty distribution".to_owned()));
	}
	if let Some(p) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
		return Err(GenerateError::InvalidDistribution(format!("weight {p} is not a probability")));
	}
	let total: f32 = probs.sum();
	if total <= 0.0 || !total.is_finite() {
		return Err(GenerateError::InvalidDistribution(format!("weights sum to {total}")));
	}

	let mut r = rng.random::<f32>() * total;

	let mut fallback = None;
	for (index, &p) in probs.iter().enumerate() {
		if p <= 0.0 {
			continue;
		}
		if r < p {
			return Ok(index);
		}
		r -= p;
		fallback = Some(index);
	}

	// Rounding can leave `r` just above the last bucket.
	fallback.ok_or_else(|| GenerateError::InvalidDistribution("no positive weight".to_owned()))
}
