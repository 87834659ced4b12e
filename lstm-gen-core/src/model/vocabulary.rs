use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::{GenerateError, LoadError};
use crate::io::{read_artifact, read_text, write_artifact};

/// File holding the ordered character list.
pub const VOCAB_FILE: &str = "vocab.bin";

/// File holding the `char -> index` mapping.
pub const CHAR_TO_IDX_FILE: &str = "char_to_idx.bin";

/// File holding the `index -> char` mapping.
pub const IDX_TO_CHAR_FILE: &str = "idx_to_char.bin";

/// Bidirectional mapping between the training characters and `[0, size)`.
///
/// # Invariants
/// - `chars` holds no duplicates
/// - `char_to_idx[chars[i]] == i` and `idx_to_char[i] == chars[i]` for every `i`
/// - both maps hold exactly `chars.len()` entries
///
/// The invariants are checked once, when the mapping is loaded or built.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
	chars: Vec<char>,
	char_to_idx: HashMap<char, usize>,
	idx_to_char: HashMap<usize, char>,
}

impl Vocabulary {
	/// Builds a vocabulary from the sorted set of distinct characters in `text`.
	pub fn from_text(text: &str) -> Self {
		let chars: Vec<char> = text.chars().collect::<BTreeSet<_>>().into_iter().collect();
		let char_to_idx = chars.iter().enumerate().map(|(i, &c)| (c, i)).collect();
		let idx_to_char = chars.iter().enumerate().map(|(i, &c)| (i, c)).collect();
		Self { chars, char_to_idx, idx_to_char }
	}

	/// Builds a vocabulary from the characters of a corpus file.
	pub fn from_file<P: AsRef<Path>>(filepath: P) -> Result<Self, LoadError> {
		let text = read_text(filepath)?;
		Ok(Self::from_text(&text))
	}

	/// Loads the three mapping artifacts from `dir`.
	///
	/// # Errors
	/// - `LoadError::Io` / `LoadError::Decode` if a file is missing or corrupt
	/// - `LoadError::Inconsistent` if the three mappings disagree
	pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, LoadError> {
		let dir = dir.as_ref();
		let chars: Vec<char> = read_artifact(dir.join(VOCAB_FILE))?;
		let char_to_idx: HashMap<char, usize> = read_artifact(dir.join(CHAR_TO_IDX_FILE))?;
		let idx_to_char: HashMap<usize, char> = read_artifact(dir.join(IDX_TO_CHAR_FILE))?;
		Self::from_parts(chars, char_to_idx, idx_to_char)
	}

	/// Assembles a vocabulary from its three mappings, checking that they agree.
	pub fn from_parts(
		chars: Vec<char>,
		char_to_idx: HashMap<char, usize>,
		idx_to_char: HashMap<usize, char>,
	) -> Result<Self, LoadError> {
		let size = chars.len();
		if size == 0 {
			return Err(LoadError::Inconsistent("vocabulary is empty".to_owned()));
		}
		if char_to_idx.len() != size || idx_to_char.len() != size {
			return Err(LoadError::Inconsistent(format!(
				"{} characters but {} char_to_idx and {} idx_to_char entries",
				size,
				char_to_idx.len(),
				idx_to_char.len()
			)));
		}
		for (i, c) in chars.iter().enumerate() {
			if char_to_idx.get(c) != Some(&i) {
				return Err(LoadError::Inconsistent(format!("char_to_idx[{c:?}] does not map to {i}")));
			}
			if idx_to_char.get(&i) != Some(c) {
				return Err(LoadError::Inconsistent(format!("idx_to_char[{i}] does not map to {c:?}")));
			}
		}
		// With the sizes equal, a duplicate in `chars` would have failed the lookups above.
		Ok(Self { chars, char_to_idx, idx_to_char })
	}

	/// Writes the three mapping artifacts into `dir`.
	pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<(), LoadError> {
		let dir = dir.as_ref();
		write_artifact(dir.join(VOCAB_FILE), &self.chars)?;
		write_artifact(dir.join(CHAR_TO_IDX_FILE), &self.char_to_idx)?;
		write_artifact(dir.join(IDX_TO_CHAR_FILE), &self.idx_to_char)
	}

	/// Number of distinct characters.
	pub fn size(&self) -> usize {
		self.chars.len()
	}

	/// `true` if `c` has an index.
	pub fn contains(&self, c: char) -> bool {
		self.char_to_idx.contains_key(&c)
	}

	/// Characters ordered by index.
	pub fn chars(&self) -> &[char] {
		&self.chars
	}

	/// Converts `seed` to indices.
	///
	/// # Errors
	/// `GenerateError::UnknownCharacter` for the first character outside the vocabulary.
	/// `position` counts characters, not bytes.
	pub fn encode(&self, seed: &str) -> Result<Vec<usize>, GenerateError> {
		seed.chars()
			.enumerate()
			.map(|(position, character)| {
				self.char_to_idx
					.get(&character)
					.copied()
					.ok_or(GenerateError::UnknownCharacter { character, position })
			})
			.collect()
	}

	/// Converts an index back to its character.
	pub fn decode(&self, index: usize) -> Result<char, GenerateError> {
		self.idx_to_char.get(&index).copied().ok_or(GenerateError::IndexOutOfVocabulary(index))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn from_text_sorts_and_deduplicates() {
		let vocab = Vocabulary::from_text("banana");
		assert_eq!(vocab.chars(), &['a', 'b', 'n']);
		assert_eq!(vocab.encode("nab").unwrap(), vec![2, 0, 1]);
		assert_eq!(vocab.decode(1).unwrap(), 'b');
	}

	#[test]
	fn encode_reports_character_position() {
		let vocab = Vocabulary::from_text("The cat");
		let err = vocab.encode("The 🐈").unwrap_err();
		assert_eq!(err, GenerateError::UnknownCharacter { character: '🐈', position: 4 });
		assert!(err.is_input_error());
	}

	#[test]
	fn decode_out_of_range() {
		let vocab = Vocabulary::from_text("ab");
		assert_eq!(vocab.decode(2), Err(GenerateError::IndexOutOfVocabulary(2)));
	}

	#[test]
	fn from_parts_rejects_disagreeing_maps() {
		let chars = vec!['a', 'b'];
		let char_to_idx = HashMap::from([('a', 0), ('b', 1)]);
		let idx_to_char = HashMap::from([(0, 'b'), (1, 'a')]);
		assert!(matches!(
			Vocabulary::from_parts(chars, char_to_idx, idx_to_char),
			Err(LoadError::Inconsistent(_))
		));
	}

	#[test]
	fn from_parts_rejects_size_mismatch() {
		let chars = vec!['a', 'b'];
		let char_to_idx = HashMap::from([('a', 0), ('b', 1), ('c', 2)]);
		let idx_to_char = HashMap::from([(0, 'a'), (1, 'b')]);
		assert!(Vocabulary::from_parts(chars, char_to_idx, idx_to_char).is_err());
	}

	#[test]
	fn from_parts_rejects_duplicates() {
		let chars = vec!['a', 'a'];
		let char_to_idx = HashMap::from([('a', 0), ('b', 1)]);
		let idx_to_char = HashMap::from([(0, 'a'), (1, 'a')]);
		assert!(Vocabulary::from_parts(chars, char_to_idx, idx_to_char).is_err());
	}
}
