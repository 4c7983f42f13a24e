#![allow(dead_code)]

mod api;
mod llm;
mod models;
mod services;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::handlers::AppState;
use crate::llm::{ChatProvider, OpenAiChat};
use crate::services::{
    spawn_ingest_worker, AppConfig, ConceptMapService, ContentAnalyzer, ContentGenerator,
    DiskStorage, IngestionService, ObjectStorage,
};
use crate::store::{DocumentStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studybox=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting studybox backend...");

    let config = AppConfig::from_env();

    // AI credential is read once here; a missing key selects the
    // deterministic fallback mode everywhere.
    let chat: Option<Arc<dyn ChatProvider>> = match &config.openai_api_key {
        Some(api_key) => {
            info!("AI backend enabled (model: {})", config.openai_model);
            Some(Arc::new(OpenAiChat::new(
                api_key.clone(),
                config.openai_model.clone(),
                config.ai_timeout,
            )))
        }
        None => {
            info!("No AI credential configured, running in fallback mode");
            None
        }
    };

    let storage = DiskStorage::new(&config.storage_dir);
    storage.init().await?;
    let storage: Arc<dyn ObjectStorage> = Arc::new(storage);
    info!("Object storage ready at {}", config.storage_dir);

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());

    let analyzer = ContentAnalyzer::new(chat.clone());
    let generator = ContentGenerator::new(chat.clone());
    let concept_maps = ConceptMapService::new(store.clone(), ContentGenerator::new(chat.clone()));

    let ingestion = Arc::new(IngestionService::new(
        store.clone(),
        storage,
        analyzer,
        config.clone(),
    ));

    // Background worker: upload submission returns immediately, the
    // pipeline runs here.
    let worker = spawn_ingest_worker(ingestion.clone(), 64);
    info!("Ingestion worker started");

    let state = Arc::new(AppState {
        ingestion,
        generator,
        concept_maps,
        store,
        worker,
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let app = api::routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));

    info!("studybox API server starting on http://{}", addr);
    api::routes::print_routes();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("studybox shut down gracefully");

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received...");
}
