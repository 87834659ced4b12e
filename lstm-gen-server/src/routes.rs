use actix_web::{post, web, HttpMessage, HttpRequest, HttpResponse};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use lstm_gen_core::Generator;
use lstm_gen_core::model::generator::{DEFAULT_LENGTH, DEFAULT_PROMPT};

use crate::error::ApiError;

/// Raw `length` field: a JSON number or any string (form fields are always strings).
#[derive(Deserialize, Debug, PartialEq)]
#[serde(untagged)]
enum LengthField {
	Integer(i64),
	Float(f64),
	Text(String),
}

/// Body of a `/api/generate` request, JSON or form-encoded.
#[derive(Deserialize, Default, Debug)]
struct GenerateParams {
	prompt: Option<String>,
	length: Option<LengthField>,
}

#[derive(Serialize)]
struct GenerateResponse {
	text: String,
}

/// MIME types are case-insensitive: `Application/JSON` counts as JSON.
fn is_json(content_type: &str) -> bool {
	let content_type = content_type.trim().to_ascii_lowercase();
	content_type == "application/json"
		|| (content_type.starts_with("application/") && content_type.ends_with("+json"))
}

impl GenerateParams {
	/// Decodes the body as JSON when the request says so, as a form otherwise.
	///
	/// An empty body yields the defaults whatever the content type.
	fn parse(req: &HttpRequest, body: &[u8]) -> Result<Self, ApiError> {
		if body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Self::default());
		}
		if is_json(req.content_type()) {
			serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))
		} else {
			serde_urlencoded::from_bytes(body).map_err(|e| ApiError::BadRequest(format!("Invalid form body: {e}")))
		}
	}

	fn prompt(&self) -> &str {
		self.prompt.as_deref().unwrap_or(DEFAULT_PROMPT)
	}

	/// Coerces `length` to a character count.
	///
	/// Floats are truncated toward zero, strings are trimmed and parsed as integers.
	fn length(&self) -> Result<usize, ApiError> {
		let invalid = |shown: String| ApiError::BadRequest(format!("Length must be a non-negative integer, got {shown}"));
		match &self.length {
			None => Ok(DEFAULT_LENGTH),
			Some(LengthField::Integer(n)) => usize::try_from(*n).map_err(|_| invalid(n.to_string())),
			Some(LengthField::Float(f)) => {
				let truncated = f.trunc();
				if truncated.is_finite() && truncated >= 0.0 && truncated <= usize::MAX as f64 {
					Ok(truncated as usize)
				} else {
					Err(invalid(f.to_string()))
				}
			}
			Some(LengthField::Text(s)) => s.trim().parse::<usize>().map_err(|_| invalid(format!("{s:?}"))),
		}
	}
}

/// HTTP POST endpoint `/api/generate`
///
/// Samples `length` characters after `prompt` and returns `{"text": ...}`.
/// Generation runs to completion inside the handler.
#[post("/api/generate")]
async fn generate(generator: web::Data<Generator>, req: HttpRequest, body: web::Bytes) -> Result<HttpResponse, ApiError> {
	let result = GenerateParams::parse(&req, &body).and_then(|params| {
		let prompt = params.prompt();
		let length = params.length()?;
		debug!("Processing: prompt of {} characters, length={length}", prompt.chars().count());
		Ok(generator.generate(prompt, length)?)
	});

	match result {
		Ok(text) => Ok(HttpResponse::Ok().json(GenerateResponse { text })),
		Err(e) => {
			if e.is_client_error() {
				warn!("Rejected request: {e}");
			} else {
				error!("Generation failed: {e}");
			}
			Err(e)
		}
	}
}

pub fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(generate);
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::http::header::ContentType;
	use actix_web::{test, App};
	use lstm_gen_core::model::weights::ModelWeights;
	use lstm_gen_core::{CharLstm, ModelConfig, Vocabulary};
	use rand::SeedableRng;
	use rand::rngs::StdRng;
	use serde_json::{json, Value};

	const CORPUS: &str = "Once upon a time, The quick brown fox jumps over the lazy dog.";

	fn fixture_parts() -> (Vocabulary, ModelConfig) {
		let vocabulary = Vocabulary::from_text(CORPUS);
		let config = ModelConfig {
			input_size: vocabulary.size(),
			hidden_size: 10,
			num_layers: 2,
			num_classes: vocabulary.size(),
		};
		(vocabulary, config)
	}

	fn fixture() -> Generator {
		let (vocabulary, config) = fixture_parts();
		let model = CharLstm::random(config, &mut StdRng::seed_from_u64(17));
		Generator::from_parts(vocabulary, model).unwrap()
	}

	/// A generator whose logits are NaN, so every sampling step fails.
	fn broken_fixture() -> Generator {
		let (vocabulary, config) = fixture_parts();
		let mut weights: ModelWeights = CharLstm::random(config, &mut StdRng::seed_from_u64(17)).to_weights();
		weights.fc_bias.data.iter_mut().for_each(|b| *b = f32::NAN);
		let model = CharLstm::from_weights(weights, &config).unwrap();
		Generator::from_parts(vocabulary, model).unwrap()
	}

	macro_rules! app {
		($generator:expr) => {
			test::init_service(App::new().app_data(web::Data::new($generator)).configure(configure)).await
		};
	}

	fn text_len(body: &Value) -> usize {
		body["text"].as_str().map(|s| s.chars().count()).unwrap_or(0)
	}

	#[actix_web::test]
	async fn json_request_generates_text() {
		let app = app!(fixture());
		let req = test::TestRequest::post()
			.uri("/api/generate")
			.set_json(&json!({"prompt": "Once upon a time", "length": 50}))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);

		let body: Value = test::read_body_json(resp).await;
		let text = body["text"].as_str().unwrap();
		assert!(text.starts_with("Once upon a time"));
		assert_eq!(text.chars().count(), "Once upon a time".len() + 50);
	}

	#[actix_web::test]
	async fn empty_body_uses_defaults() {
		let app = app!(fixture());
		let req = test::TestRequest::post().uri("/api/generate").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);

		let body: Value = test::read_body_json(resp).await;
		assert!(body["text"].as_str().unwrap().starts_with("The"));
		assert_eq!(text_len(&body), 303);
	}

	#[actix_web::test]
	async fn form_request_generates_text() {
		let app = app!(fixture());
		let req = test::TestRequest::post()
			.uri("/api/generate")
			.set_form(&[("prompt", "lazy dog"), ("length", " 12 ")])
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);

		let body: Value = test::read_body_json(resp).await;
		assert_eq!(text_len(&body), 20);
	}

	#[actix_web::test]
	async fn json_length_may_be_string_or_float() {
		let app = app!(fixture());
		for (length, expected) in [(json!("7"), 10), (json!(4.9), 7), (json!(null), 303)] {
			let req = test::TestRequest::post()
				.uri("/api/generate")
				.set_json(&json!({"prompt": "The", "length": length}))
				.to_request();
			let resp = test::call_service(&app, req).await;
			assert_eq!(resp.status(), StatusCode::OK);
			let body: Value = test::read_body_json(resp).await;
			assert_eq!(text_len(&body), expected);
		}
	}

	#[actix_web::test]
	async fn unknown_character_is_rejected_and_server_keeps_serving() {
		let app = app!(fixture());
		let req = test::TestRequest::post()
			.uri("/api/generate")
			.set_json(&json!({"prompt": "The 🦀", "length": 5}))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
		let body: Value = test::read_body_json(resp).await;
		assert!(body["error"].as_str().unwrap().contains("not in the vocabulary"));

		let req = test::TestRequest::post()
			.uri("/api/generate")
			.set_json(&json!({"prompt": "The", "length": 5}))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
	}

	#[actix_web::test]
	async fn invalid_length_is_rejected() {
		let app = app!(fixture());
		for length in [json!(-3), json!("many"), json!(-0.5e3), json!([1])] {
			let req = test::TestRequest::post()
				.uri("/api/generate")
				.set_json(&json!({"length": length}))
				.to_request();
			let resp = test::call_service(&app, req).await;
			assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
			let body: Value = test::read_body_json(resp).await;
			assert!(body["error"].is_string());
		}
	}

	#[actix_web::test]
	async fn malformed_json_is_rejected() {
		let app = app!(fixture());
		let req = test::TestRequest::post()
			.uri("/api/generate")
			.insert_header(ContentType::json())
			.set_payload("{\"prompt\": ")
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
		let body: Value = test::read_body_json(resp).await;
		assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
	}

	#[actix_web::test]
	async fn model_failure_is_internal_error() {
		let app = app!(broken_fixture());
		let req = test::TestRequest::post()
			.uri("/api/generate")
			.set_json(&json!({"prompt": "The", "length": 3}))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
		let body: Value = test::read_body_json(resp).await;
		assert!(body["error"].as_str().unwrap().contains("invalid probability distribution"));
	}

	#[actix_web::test]
	async fn zero_length_echoes_prompt() {
		let app = app!(fixture());
		let req = test::TestRequest::post()
			.uri("/api/generate")
			.set_json(&json!({"prompt": "quick", "length": 0}))
			.to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body, json!({"text": "quick"}));
	}

	#[actix_web::test]
	async fn json_content_type_ignores_case() {
		let app = app!(fixture());
		let req = test::TestRequest::post()
			.uri("/api/generate")
			.insert_header(("content-type", "Application/JSON; charset=utf-8"))
			.set_payload("{\"prompt\":\"quick\",\"length\":0}")
			.to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body, json!({"text": "quick"}));
	}

	#[actix_web::test]
	async fn json_suffix_types_are_json() {
		let app = app!(fixture());
		let req = test::TestRequest::post()
			.uri("/api/generate")
			.insert_header(("content-type", "application/merge-patch+JSON"))
			.set_payload("{\"prompt\":\"lazy\",\"length\":0}")
			.to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body, json!({"text": "lazy"}));
	}

	#[actix_web::test]
	async fn form_length_parses_as_text() {
		let params: GenerateParams = serde_urlencoded::from_str("prompt=The&length=42").unwrap();
		assert_eq!(params.length, Some(LengthField::Text("42".to_owned())));
		assert_eq!(params.length().unwrap(), 42);
	}
}
