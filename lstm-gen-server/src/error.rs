use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use lstm_gen_core::GenerateError;
use serde::Serialize;
use thiserror::Error;

/// JSON body of every failed request: `{"error": "..."}`.
#[derive(Serialize)]
struct ErrorBody {
	error: String,
}

/// Failure of a `/api/generate` request.
///
/// Client-caused failures map to 400, model failures to 500. Both render a
/// JSON body, and neither affects the shared generator.
#[derive(Debug, Error)]
pub enum ApiError {
	#[error("{0}")]
	BadRequest(String),

	#[error(transparent)]
	Generate(#[from] GenerateError),
}

impl ApiError {
	pub fn is_client_error(&self) -> bool {
		match self {
			ApiError::BadRequest(_) => true,
			ApiError::Generate(e) => e.is_input_error(),
		}
	}
}

impl ResponseError for ApiError {
	fn status_code(&self) -> StatusCode {
		if self.is_client_error() {
			StatusCode::BAD_REQUEST
		} else {
			StatusCode::INTERNAL_SERVER_ERROR
		}
	}

	fn error_response(&self) -> HttpResponse {
		HttpResponse::build(self.status_code()).json(ErrorBody { error: self.to_string() })
	}
}
