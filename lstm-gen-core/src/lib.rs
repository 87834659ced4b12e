//! Character-level LSTM text generation library.
//!
//! This crate provides:
//! - Loading of a pretrained character-level LSTM and its vocabulary
//! - Autoregressive sampling from a seed string
//! - Typed errors separating bad input from model failures
//!
//! The numeric core (LSTM cell, softmax, sampling) is implemented on top of
//! `ndarray`; artifacts are stored with `postcard`.

/// Sequence model, vocabulary and generation loop.
pub mod model;

/// Load and generation errors.
pub mod error;

/// I/O utilities (artifact encoding, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use error::{GenerateError, LoadError};
pub use model::char_lstm::{CharLstm, ModelConfig};
pub use model::generator::Generator;
pub use model::vocabulary::Vocabulary;
