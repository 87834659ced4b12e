use std::path::PathBuf;

/// Directory holding the vocabulary and weight artifacts.
pub const MODEL_DIR: &str = "model";
pub const HOST: &str = "127.0.0.1";
pub const PORT: u16 = 5000;

/// Process-level settings, fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
	pub model_dir: PathBuf,
	pub host: String,
	pub port: u16,
	pub workers: usize,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			model_dir: PathBuf::from(MODEL_DIR),
			host: HOST.to_owned(),
			port: PORT,
			workers: num_cpus::get(),
		}
	}
}
