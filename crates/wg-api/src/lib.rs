//! # wg-api
//!
//! The web routing and orchestration layer for WebGallery.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod upload;

pub use error::{ApiError, ApiResult};
pub use handlers::AppState;

use actix_web::web;

/// Configures the routes for the gallery.
///
/// # Developer Note
/// Routes are declared without trailing slashes. Wrap the App in
/// [`middleware::normalize_path`] so `/api/images/` and `/api/images` both match.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(middleware::json_config())
        .route("/health", web::get().to(handlers::health_check))
        .service(
            web::scope("/api")
                // Images
                .service(
                    web::resource("/images")
                        .route(web::get().to(handlers::list_images))
                        .route(web::post().to(handlers::create_image)),
                )
                .service(
                    web::resource("/images/{id}")
                        .route(web::get().to(handlers::get_image))
                        .route(web::delete().to(handlers::delete_image)),
                )
                .route("/images/{id}/picture", web::get().to(handlers::get_picture))
                // Navigation
                .route("/images/{id}/status/isOldest", web::get().to(handlers::is_oldest))
                .route("/images/{id}/status/isLatest", web::get().to(handlers::is_latest))
                .route("/images/{id}/previous", web::get().to(handlers::previous_image))
                .route("/images/{id}/next", web::get().to(handlers::next_image))
                // Comments
                .route("/comments", web::post().to(handlers::create_comment))
                .route("/comments/{id}", web::delete().to(handlers::delete_comment))
                .route("/comments/{image_id}/{page}", web::get().to(handlers::comments_page))
                .route(
                    "/comments/{image_id}/{page}/isLastPage",
                    web::get().to(handlers::is_last_page),
                ),
        );
}
