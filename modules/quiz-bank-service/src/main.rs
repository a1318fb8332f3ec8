//! Quiz Bank Service: standalone binary serving quiz questions by topic and month.
//!
//! Hosts both the JSON API and a dashboard UI on the same port.
//! Default: http://0.0.0.0:10000/

mod config;
mod dashboard;
mod routes;
mod store;

use routes::AppState;
use std::sync::Arc;
use std::time::Instant;
use store::QuestionStore;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Data directory: {} (mode: {})",
        config.data_dir.display(),
        config.mode
    );
    if let Some(topics) = &config.fixed_topics {
        log::info!("Serving a fixed list of {} topics", topics.len());
    }
    if !config.data_dir.is_dir() {
        log::warn!(
            "Data directory {} does not exist or is not a directory",
            config.data_dir.display()
        );
    }

    // Without its data the API is not functional, so a failed preload is fatal.
    let store = match QuestionStore::open(
        config.data_dir.clone(),
        config.mode,
        config.fixed_topics.clone(),
    )
    .await
    {
        Ok(store) => store,
        Err(e) => {
            log::error!("Fatal: failed to load and cache initial data: {}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState {
        store,
        start_time: Instant::now(),
    });

    let app = routes::router(state);

    let addr = config.bind_addr();
    log::info!("Quiz API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
