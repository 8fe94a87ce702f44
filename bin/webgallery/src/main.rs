//! # WebGallery Binary
//!
//! Assembles the server from the plugins selected by compile-time features.

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::path::Path;
use wg_api::middleware;
use wg_api::AppState;
use wg_config::Settings;

#[cfg(feature = "db-sqlite")]
use wg_db_sqlite::SqliteGalleryRepo;

#[cfg(feature = "storage-local")]
use wg_storage_local::LocalMediaStore;

#[cfg(not(all(feature = "db-sqlite", feature = "storage-local")))]
compile_error!("webgallery needs a record store and a media store: enable `db-sqlite` and `storage-local`");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load().context("Failed to load configuration")?;

    // 1. Record store
    #[cfg(feature = "db-sqlite")]
    let repo = SqliteGalleryRepo::connect(&settings.database.url, settings.database.max_connections)
        .await
        .context("Failed to init SQLite")?;

    // 2. Picture storage
    #[cfg(feature = "storage-local")]
    let store = LocalMediaStore::new(settings.storage.upload_dir.clone().into());

    // 3. Shared state, built the same way the tests build it
    let state = web::Data::new(AppState {
        repo: Box::new(repo),
        store: Box::new(store),
        max_upload_bytes: settings.storage.max_upload_bytes,
    });

    let static_dir = settings.server.static_dir.clone();
    let serve_static = Path::new(&static_dir).is_dir();
    if !serve_static {
        log::warn!("static directory {:?} not found, serving the API only", static_dir);
    }

    let address = settings.server_address();
    log::info!("WebGallery starting on http://{}", address);

    HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .wrap(middleware::cors_policy())
            .wrap(middleware::normalize_path())
            .wrap(middleware::standard_middleware())
            .configure(wg_api::configure_routes);

        if serve_static {
            app.service(actix_files::Files::new("/", &static_dir).index_file("index.html"))
        } else {
            app
        }
    })
    .bind(&address)
    .with_context(|| format!("Failed to bind {}", address))?
    .run()
    .await?;

    Ok(())
}
