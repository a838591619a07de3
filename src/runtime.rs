//! Runtime services and shared state for support-desk.

use axum::{
    Router,
    routing::{get, patch, post},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::{classify, stats, tickets},
    service::{classifier::Classifier, db::DbClient, llm::LlmClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the database client, the classifier, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The database client instance.
    pub db: DbClient,
    /// The ticket classifier instance.
    pub classifier: Classifier,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the database.
        let db = DbClient::surreal(&config).await?;

        // Initialize the LLM client and the classifier on top of it.
        let llm = LlmClient::openai(&config);
        let classifier = Classifier::new(&config, llm);

        Ok(Self { config, db, classifier })
    }

    /// Build the HTTP router over this runtime.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/tickets/", get(tickets::list_tickets).post(tickets::create_ticket))
            .route("/tickets/stats/", get(stats::get_ticket_stats))
            .route("/tickets/classify/", post(classify::classify_ticket))
            .route("/tickets/{id}/", patch(tickets::patch_ticket).put(tickets::put_ticket))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.clone())
    }

    /// Serve HTTP until Ctrl-C.
    pub async fn start(&self) -> Void {
        let listener = TcpListener::bind(&self.config.listen_address).await?;
        info!("Listening on {} ...", listener.local_addr()?);

        axum::serve(listener, self.router()).with_graceful_shutdown(shutdown_signal()).await?;

        info!("Server stopped.");

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }

    info!("Shutdown signal received.");
}
