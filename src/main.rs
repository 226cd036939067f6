use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use evengo_match::config::{Settings, StoreBackend};
use evengo_match::core::{Pipeline, PipelineOptions};
use evengo_match::routes::{self, chat::AppState};
use evengo_match::services::{AppwriteClient, CompletionService, MemoryVenueStore, OpenAiClient, VenueStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(settings: &Settings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn build_completion(settings: &Settings) -> Option<Arc<dyn CompletionService>> {
    let Some(key) = settings.completion.key() else {
        warn!("No completion api key configured, semantic steps will use their fallbacks");
        return None;
    };

    match OpenAiClient::new(
        settings.completion.endpoint.clone(),
        key.to_string(),
        settings.completion.model.clone(),
        settings.completion.timeout(),
    ) {
        Ok(client) => {
            info!("Completion client initialized (model: {})", settings.completion.model);
            Some(Arc::new(client))
        }
        Err(e) => {
            error!("Failed to initialize completion client ({}), continuing without it", e);
            None
        }
    }
}

fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn VenueStore>> {
    let store = &settings.store;

    match store.backend {
        StoreBackend::Memory => {
            let memory = match &store.seed_path {
                Some(path) => MemoryVenueStore::from_json_file(path)?,
                None => MemoryVenueStore::default(),
            };
            info!("In-memory venue store initialized ({} venues)", memory.len());
            Ok(Arc::new(memory))
        }
        StoreBackend::Appwrite => {
            let client = AppwriteClient::new(
                store.endpoint.clone(),
                store.api_key.clone(),
                store.project_id.clone(),
                store.database_id.clone(),
                store.collection.clone(),
                store.timeout(),
            )
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            info!("Appwrite venue store initialized (collection: {})", store.collection);
            Ok(Arc::new(client))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings);

    info!("Starting Evengo venue matching service...");

    let completion = build_completion(&settings);
    let store = build_store(&settings)?;

    let options = PipelineOptions {
        link_base: settings.link.base_url.clone(),
        candidate_cap: settings.matching.candidate_cap,
        min_search_confidence: settings.matching.min_search_confidence,
        fast_path_confidence: settings.matching.fast_path_confidence,
        completion_timeout: settings.completion.timeout(),
        store_timeout: settings.store.timeout(),
    };

    info!("Pipeline initialized with options: {:?}", options);

    let app_state = AppState {
        pipeline: Arc::new(Pipeline::new(completion.clone(), store.clone(), options)),
        completion,
        store,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
