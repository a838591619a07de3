//! Library root for `support-desk`.
//!
//! Support-desk is a small backend for support tickets designed to:
//! - Create, list, filter, and update tickets
//! - Report aggregate ticket statistics
//! - Suggest a ticket's category and priority using an LLM
//!
//! The service integrates with SurrealDB for storage and any OpenAI-compatible
//! chat-completion API for classification, and serves everything over HTTP with
//! axum. Each backing service sits behind a trait so it can be swapped out.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::{info, warn};

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the support-desk runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with database and LLM clients
/// - Serves the HTTP API until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting support-desk ...");

    // Start the crypto provider.
    if crypto::ring::default_provider().install_default().is_err() {
        warn!("A crypto provider was already installed.");
    }

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
