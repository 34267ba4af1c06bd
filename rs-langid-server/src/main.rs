use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use rs_langid_core::io::list_files;
use rs_langid_core::model::profiles::CORPUS_EXTENSION;
use rs_langid_core::{
	Detector, DetectorConfig, LangIdError, LanguageDetector, LanguageProfiles,
	ProbabilityLanguageDetector,
};

/// Query parameters for the `/v1/detect` endpoint
#[derive(Deserialize)]
struct DetectParams {
	text: Option<String>,
	strategy: Option<String>, // overlap (default) or probability
}

/// Body of a `/v1/detect` response: the best language (null when none is
/// known) and the score of every learnt language.
#[derive(Serialize)]
struct DetectResponse<'a> {
	language: Option<&'a str>,
	scores: &'a IndexMap<String, f64>,
}

struct SharedData {
	overlap: LanguageDetector,
	probability: ProbabilityLanguageDetector,
}

/// Server settings, read from the command line and the environment.
///
/// - 1st argument or `LANGID_DATA`: corpus directory (default `./data`)
/// - `LANGID_CONFIG`: JSON detector configuration (default settings otherwise)
/// - `LANGID_BIND`: listen address (default `127.0.0.1:5000`)
struct Settings {
	data_dir: PathBuf,
	config: DetectorConfig,
	bind: String,
}

impl Settings {
	fn from_env() -> Result<Self, LangIdError> {
		let data_dir = std::env::args()
			.nth(1)
			.or_else(|| std::env::var("LANGID_DATA").ok())
			.unwrap_or_else(|| "./data".to_owned());
		let config = match std::env::var("LANGID_CONFIG") {
			Ok(path) => DetectorConfig::load(path)?,
			Err(_) => DetectorConfig::default(),
		};
		let bind = std::env::var("LANGID_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_owned());
		Ok(Self { data_dir: PathBuf::from(data_dir), config, bind })
	}
}

/// Maps a detection error onto an HTTP status.
fn error_response(error: LangIdError) -> HttpResponse {
	match error {
		LangIdError::InvalidInput(_) => HttpResponse::BadRequest().body(error.to_string()),
		LangIdError::UninitializedState(_) => HttpResponse::Conflict().body(error.to_string()),
		LangIdError::UnknownIdentifier(_) => HttpResponse::NotFound().body(error.to_string()),
		_ => HttpResponse::InternalServerError().body(error.to_string()),
	}
}

/// GET endpoint `/v1/detect`
///
/// Scores `text` against every learnt language with the requested strategy
/// and returns the best language with all the scores as JSON.
#[get("/v1/detect")]
async fn get_detect(data: web::Data<Mutex<SharedData>>, query: web::Query<DetectParams>) -> impl Responder {
	let text = match &query.text {
		Some(t) if !t.trim().is_empty() => t,
		_ => return HttpResponse::BadRequest().body("Missing or empty text"),
	};

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let detected = match query.strategy.as_deref().map(str::to_lowercase).as_deref() {
		None | Some("overlap") => shared_data.overlap.detect_text(text),
		Some("probability") => shared_data.probability.detect_text(text),
		Some(_) => return HttpResponse::BadRequest().body("Strategy must be 'overlap' or 'probability'"),
	};

	match detected {
		Ok(result) => HttpResponse::Ok().json(DetectResponse {
			language: result.best().map(|(name, _)| name),
			scores: result.scores(),
		}),
		Err(e) => error_response(e),
	}
}

/// Lists the corpus files available in the data directory.
#[get("/v1/corpora")]
async fn get_corpora(data_dir: web::Data<PathBuf>) -> impl Responder {
	match list_files(data_dir.as_path(), CORPUS_EXTENSION) {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(&format!(".{CORPUS_EXTENSION}"), "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

#[get("/v1/languages")]
async fn get_languages(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(shared_data.overlap.profiles().language_names().join("\n"))
}

/// Learns (or replaces) one language from the corpus sent as request body.
#[put("/v1/languages/{name}")]
async fn put_language(data: web::Data<Mutex<SharedData>>, name: web::Path<String>, body: String) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	// Both detectors learn the same texts in the same order, their letter ids stay aligned
	if let Err(e) = shared_data.overlap.learn_text(&body, &name) {
		return error_response(e);
	}
	if let Err(e) = shared_data.probability.learn_text(&body, &name) {
		return error_response(e);
	}

	log::info!("Language {} learnt through the API", name.as_str());
	HttpResponse::Ok().body(format!("Language {} learnt", name.as_str()))
}

/// Main entry point for the server.
///
/// Trains (or loads from cache) the profiles of every corpus in the data
/// directory, shares both detectors behind a `Mutex` and starts an Actix-web
/// HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let settings = Settings::from_env().map_err(std::io::Error::other)?;

	let profiles = if settings.data_dir.is_dir() {
		LanguageProfiles::from_corpus_dir(&settings.data_dir, settings.config.clone())
	} else {
		log::warn!("{} is not a directory, starting without languages", settings.data_dir.display());
		LanguageProfiles::new(settings.config.clone())
	}
	.map_err(std::io::Error::other)?;
	log::info!("Serving {} languages on {}", profiles.len(), settings.bind);

	let shared_data = SharedData {
		overlap: LanguageDetector::with_profiles(profiles.clone()),
		probability: ProbabilityLanguageDetector::with_profiles(profiles),
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));
	let data_dir = web::Data::new(settings.data_dir);

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.app_data(data_dir.clone())
			.service(get_detect)
			.service(get_corpora)
			.service(get_languages)
			.service(put_language)
	})
		.bind(settings.bind.as_str())?
		.run()
		.await
}
