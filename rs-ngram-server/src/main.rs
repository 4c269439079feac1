use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use rs_ngram_core::model::{score, ModelConfig, NGramModel, Prediction, PredictionInput};
use rs_ngram_core::text::tokenize;
use rs_ngram_core::NGramError;

/// Longest continuation decoded at once (`num_tokens` or `lookahead`).
const MAX_NUM_TOKENS: usize = 256;

/// Body of the `/v1/evaluate` endpoint: one evaluation unit.
#[derive(Deserialize)]
struct EvaluateRequest {
	model: ModelConfig,
	#[serde(default)]
	train_texts: Vec<String>,
	text: String,
	/// `lookahead`, `beam_width` and `train`, defaulting to 1, 3 and false.
	#[serde(flatten)]
	input: PredictionInput,
}

#[derive(Serialize)]
struct EvaluateResponse {
	predictions: Vec<Prediction>,
	accuracy: f64,
}

/// Body of the `/v1/predict` endpoint.
#[derive(Deserialize)]
struct PredictRequest {
	model: ModelConfig,
	#[serde(default)]
	train_texts: Vec<String>,
	context: String,
	num_tokens: Option<usize>,
	beam_width: Option<usize>,
}

#[derive(Serialize)]
struct PredictResponse {
	tokens: Vec<String>,
}

/// Builds a model and trains it on every text, in order.
fn trained_model(config: &ModelConfig, texts: &[String]) -> Result<NGramModel, NGramError> {
	let mut model = config.build()?;
	for text in texts {
		model.train(text);
	}
	Ok(model)
}

/// HTTP POST endpoint `/v1/evaluate`
///
/// Trains a fresh model on `train_texts`, predicts every position of `text`
/// and scores the predictions against `text` itself.
/// Returns the predictions and the accuracy as JSON.
#[post("/v1/evaluate")]
async fn post_evaluate(request: web::Json<EvaluateRequest>) -> impl Responder {
	let request = request.into_inner();
	if let Err(e) = request.input.validate() {
		return HttpResponse::BadRequest().body(e.to_string());
	}
	if request.input.lookahead() > MAX_NUM_TOKENS {
		return HttpResponse::BadRequest().body(format!("lookahead must be at most {MAX_NUM_TOKENS}"));
	}
	let mut model = match trained_model(&request.model, &request.train_texts) {
		Ok(model) => model,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	// Decoding is CPU bound, keep it off the async workers
	let result = web::block(move || {
		let input = &request.input;
		let predictions = model.predict_sequence(&request.text, input.train_on_pred, input.lookahead(), input.beam_width());
		let accuracy = score(&predictions, &request.text, input.lookahead());
		EvaluateResponse { predictions, accuracy }
	})
	.await;

	match result {
		Ok(response) => HttpResponse::Ok().json(response),
		Err(e) => {
			warn!("evaluation worker failed: {e}");
			HttpResponse::InternalServerError().body("Evaluation failed")
		}
	}
}

/// HTTP POST endpoint `/v1/predict`
///
/// Trains a fresh model on `train_texts` and decodes `num_tokens` tokens
/// (default 1, at most `MAX_NUM_TOKENS`) after `context` with beam search.
#[post("/v1/predict")]
async fn post_predict(request: web::Json<PredictRequest>) -> impl Responder {
	let request = request.into_inner();
	let defaults = PredictionInput::default();
	let num_tokens = request.num_tokens.unwrap_or(1);
	if num_tokens > MAX_NUM_TOKENS {
		return HttpResponse::BadRequest().body(format!("num_tokens must be at most {MAX_NUM_TOKENS}, got {num_tokens}"));
	}
	let beam_width = match request.beam_width {
		Some(0) => return HttpResponse::BadRequest().body(NGramError::InvalidBeamWidth(0).to_string()),
		Some(width) => width,
		None => defaults.beam_width(),
	};
	let model = match trained_model(&request.model, &request.train_texts) {
		Ok(model) => model,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	let result = web::block(move || {
		let context = tokenize(&request.context);
		model.decode(&context, num_tokens, beam_width)
	})
	.await;

	match result {
		Ok(tokens) => HttpResponse::Ok().json(PredictResponse { tokens }),
		Err(e) => {
			warn!("prediction worker failed: {e}");
			HttpResponse::InternalServerError().body("Prediction failed")
		}
	}
}

#[get("/v1/health")]
async fn get_health() -> impl Responder {
	HttpResponse::Ok().body("OK")
}

/// Main entry point for the server.
///
/// Every request builds, trains and drops its own model, so the server
/// keeps no shared state between requests.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Log level is read from `RUST_LOG` (default `info`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	info!("listening on 127.0.0.1:5000");

	HttpServer::new(|| {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.service(post_evaluate)
			.service(post_predict)
			.service(get_health)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
