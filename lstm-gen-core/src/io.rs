use std::fs;
use std::path::{Path, PathBuf};
use std::env;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::LoadError;

/// Reads a whole text file into memory.
pub(crate) fn read_text<P: AsRef<Path>>(filename: P) -> Result<String, LoadError> {
	let path = filename.as_ref();
	fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.to_owned(), source })
}

/// Reads and decodes a `postcard` artifact.
///
/// Missing files and undecodable bytes are both reported with the offending path.
pub(crate) fn read_artifact<T, P>(filename: P) -> Result<T, LoadError>
where
	T: DeserializeOwned,
	P: AsRef<Path>,
{
	let path = filename.as_ref();
	let bytes = fs::read(path).map_err(|source| LoadError::Io { path: path.to_owned(), source })?;
	postcard::from_bytes(&bytes).map_err(|source| LoadError::Decode { path: path.to_owned(), source })
}

/// Encodes a value with `postcard` and writes it to `filename`.
///
/// The parent directory is created if needed.
pub(crate) fn write_artifact<T, P>(filename: P, value: &T) -> Result<(), LoadError>
where
	T: Serialize,
	P: AsRef<Path>,
{
	let path = filename.as_ref();
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).map_err(|source| LoadError::Io { path: parent.to_owned(), source })?;
	}
	let bytes = postcard::to_stdvec(value).map_err(|source| LoadError::Encode { path: path.to_owned(), source })?;
	fs::write(path, bytes).map_err(|source| LoadError::Io { path: path.to_owned(), source })
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder<P: AsRef<Path>>(input: P) -> PathBuf {
	let input = input.as_ref();
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_owned()
	}
}
