//! Top-level module for the character-level LSTM generator.
//!
//! This module provides:
//! - The vocabulary store (`Vocabulary`)
//! - The stacked LSTM sequence model (`CharLstm`) and its building blocks
//! - Softmax and weighted sampling helpers
//! - The read-only generation context (`Generator`)

/// Read-only generation context and the autoregressive sampling loop.
pub mod generator;

/// Stacked LSTM followed by a linear projection to vocabulary logits.
///
/// Handles weight loading with strict shape checks and stateful
/// single-step inference.
pub mod char_lstm;

/// Bidirectional character/index mapping persisted as three artifacts.
pub mod vocabulary;

/// One-hot encoding, softmax and weighted random sampling.
pub mod sampling;

/// On-disk representation of the model weights.
pub mod weights;

/// LSTM and linear layers.
///
/// Not exposed
mod layers;
