//! Serve command - runs the Ecofusion backend.

use std::sync::Arc;

use ecofusion::{
    ServerConfig,
    config::RateLimit,
    mail::MailjetProvider,
    server::{self, AppState},
};
use tokio::signal::unix::{SignalKind, signal};

use crate::cli::ServeArgs;

/// Run the backend server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig {
        environment: args.environment.clone(),
        sender_email: args.sender.clone(),
        contact_to_email: args.contact_to.clone(),
        list_id: args.list_id,
        newsletter_limit: RateLimit::per_minute(args.newsletter_limit),
        contact_limit: RateLimit::per_minute(args.contact_limit),
    };
    if config.sender().is_none() {
        tracing::warn!("MJ_SENDER is not set; contact submissions will fail");
    }
    if config.list_id.is_none() {
        tracing::warn!("MJ_LIST_ID is not set; newsletter signups will fail");
    }

    let provider = Arc::new(MailjetProvider::new(&args.mj_api_key, &args.mj_api_secret));
    let state = AppState::new(config, provider);

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    // Set up signal handling
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tracing::info!(environment = %args.environment, "Server listening on http://{local_addr}");
    println!("Ecofusion server listening on http://localhost:{}", local_addr.port());
    println!();
    println!("Available endpoints:");
    println!("  POST /api/newsletter - Newsletter signup");
    println!("  POST /api/contact    - Contact form submission");
    println!("  GET  /api/health     - Configuration status");
    println!();
    println!("Press Ctrl+C to shutdown");

    server::serve(listener, state, async move {
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
            _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
        }
    })
    .await?;

    println!("Server shut down");
    Ok(())
}
