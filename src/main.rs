use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use infermate_backend::{
    config::Config,
    api::routes::create_router,
    startup_banner,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,infermate_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let server_addr = config.server_addr;
    // Printed directly so it shows regardless of RUST_LOG
    println!("{}", startup_banner(server_addr));
    if config.hf_api_key.is_none() {
        tracing::info!("HF_API_KEY not set, chat requests go upstream without authorization");
    }

    let app_state = AppState {
        config: Arc::new(config),
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!("Listening on {}", server_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("SIGINT signal received, exiting...");
}
