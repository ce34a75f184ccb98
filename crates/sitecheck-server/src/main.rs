//! sitecheck server: wires the controller to its collaborators and serves
//! the HTTP surface. All logic lives in sitecheck-core; this binary only
//! reads configuration, builds clients, and runs axum.

mod config;
mod error;
mod routes;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sitecheck_core::app::{LifecycleController, QualityAnalyzer};
use sitecheck_core::impls::{HttpAnalysisProvider, RestJobStore};
use sitecheck_core::ports::SystemClock;

use crate::config::Config;
use crate::routes::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "configuration is incomplete, refusing to start");
            std::process::exit(1);
        }
    };

    let store = match RestJobStore::new(config.datastore_url.clone(), &config.datastore_key) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            error!(error = %err, "could not build the datastore client");
            std::process::exit(1);
        }
    };

    let provider = Arc::new(HttpAnalysisProvider::new(
        config.analysis_url.clone(),
        config.analysis_key.clone(),
    ));

    let controller = Arc::new(LifecycleController::new(
        store,
        QualityAnalyzer::new(provider),
        Arc::new(SystemClock),
    ));

    let app = routes::router(AppState { controller });

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(addr = %config.bind_addr, error = %err, "could not bind listener");
            std::process::exit(1);
        }
    };

    info!(addr = %config.bind_addr, "sitecheck server listening");

    if let Err(err) = axum::serve(listener, app).await {
        error!(error = %err, "server terminated");
        std::process::exit(1);
    }
}
