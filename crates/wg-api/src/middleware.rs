//! webgallery/crates/wg-api/src/middleware.rs Middleware
//!
//! Custom middleware for logging, path handling, and request bodies.

use crate::error::ApiError;
use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath, TrailingSlash};
use actix_web::web;
use wg_core::AppError;

// Returns a standard set of middleware for the WebGallery API.
pub fn standard_middleware() -> Logger {
    // We use the 'default' logger which outputs:
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

// Every route is declared without a trailing slash; clients may send either form.
pub fn normalize_path() -> NormalizePath {
    NormalizePath::new(TrailingSlash::Trim)
}

// Configures CORS (Cross-Origin Resource Sharing)
// Important if the client is served from a different origin than the API.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "DELETE"])
        .allow_any_header()
        .max_age(3600)
}

// Malformed JSON bodies become plain-text 400s like every other validation failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| ApiError(AppError::Validation(err.to_string())).into())
}
