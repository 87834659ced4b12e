use std::io;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use lstm_gen_core::Generator;

mod config;
mod error;
mod routes;

use config::ServerConfig;

/// Main entry point for the server.
///
/// Loads the vocabulary and the model once, shares them read-only between
/// workers, and starts an Actix-web HTTP server exposing `POST /api/generate`.
///
/// # Notes
/// - Binds to 127.0.0.1:5000 and reads `./model` (see `ServerConfig`).
/// - Any missing or mismatched artifact aborts startup before binding.
#[actix_web::main]
async fn main() -> io::Result<()> {
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

	let config = ServerConfig::default();

	let generator = match Generator::new(&config.model_dir) {
		Ok(generator) => generator,
		Err(e) => {
			error!("Failed to load model from {}: {e}", config.model_dir.display());
			return Err(io::Error::other(e));
		}
	};
	let shared_generator = web::Data::new(generator);

	info!("Listening on {}:{} with {} workers", config.host, config.port, config.workers);

	HttpServer::new(move || {
		App::new()
			.app_data(shared_generator.clone())
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.configure(routes::configure)
	})
		.workers(config.workers)
		.bind((config.host.as_str(), config.port))?
		.run()
		.await
}
