//! Booking Confirmation Server
//!
//! Serves the payment webhook and checkout-confirmation endpoints over an
//! in-memory document store.
//!
//! # Usage
//!
//! ```bash
//! RAZORPAY_WEBHOOK_SECRET=... RAZORPAY_KEY_SECRET=... cargo run --bin server
//! ```

use roomledger_core::PaymentVerifier;
use roomledger_testing::mocks::InMemoryDocumentStore;
use roomledger_web::notify::{ConsoleNotifier, SmtpNotifier};
use roomledger_web::{AppState, Config, build_router};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,roomledger_web=debug,roomledger_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting booking confirmation server...");

    // Secrets come from the environment only; a deployment without them
    // refuses to start.
    let config = Config::from_env()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        smtp = config.smtp.is_some(),
        "Configuration loaded"
    );

    let verifier = PaymentVerifier::new(
        config.razorpay.webhook_secret.clone(),
        config.razorpay.key_secret.clone(),
    )?;

    // In-memory store: contents vanish on restart. Production deployments
    // swap in a durable `DocumentStore` implementation here.
    let store = Arc::new(InMemoryDocumentStore::new());
    tracing::warn!("using in-memory document store; data is not persisted across restarts");

    let notifier: Arc<dyn roomledger_core::ConfirmationNotifier> = match &config.smtp {
        Some(smtp) => {
            tracing::info!(relay = %smtp.relay, "confirmation emails via SMTP");
            Arc::new(SmtpNotifier::new(smtp)?)
        }
        None => {
            tracing::info!("no SMTP relay configured; confirmation emails go to the log");
            Arc::new(ConsoleNotifier::new())
        }
    };

    let state = AppState::new(store, verifier, notifier);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Booking confirmation server is running");

    axum::serve(listener, app).await?;
    Ok(())
}
