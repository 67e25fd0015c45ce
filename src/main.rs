use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};

use slidegen::config::AppConfig;
use slidegen::db;
use slidegen::generation::Orchestrator;
use slidegen::handlers::{self, AppState};
use slidegen::providers::BucketSpec;
use slidegen::providers::assets::{AssetRelocator, HttpFetcher};
use slidegen::providers::openai::OpenAiClient;
use slidegen::providers::storage::StorageClient;
use slidegen::store::{PgSlideStore, SlideStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Missing credentials are fatal: refuse to start rather than fail per request
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .map_err(std::io::Error::other)?;
    db::run_migrations(&pool).await.map_err(std::io::Error::other)?;

    let http = reqwest::Client::new();
    let openai = Arc::new(OpenAiClient::new(http.clone(), config.openai.clone(), config.content_mode));
    let storage = Arc::new(StorageClient::new(http.clone(), &config.storage));
    let assets = AssetRelocator::new(
        Arc::new(HttpFetcher::new(http.clone())),
        storage,
        BucketSpec::images(&config.storage.bucket),
    );
    let store: Arc<dyn SlideStore> = Arc::new(PgSlideStore::new(pool.clone()));
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&store),
        openai.clone(),
        openai.clone(),
        assets,
        config.persist,
    ));

    let state = web::Data::new(AppState {
        orchestrator,
        store,
        outlines: openai,
    });

    log::info!(
        "Starting server at http://{} (content mode {:?}, persist {:?})",
        config.bind_addr,
        config.content_mode,
        config.persist
    );

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(handlers::cors_headers())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
