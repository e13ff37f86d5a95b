use fitness_tracker::auth::AuthClient;
use fitness_tracker::client::RestClient;
use fitness_tracker::session::SessionStore;
use fitness_tracker::{router, AppState, Config};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let rest = RestClient::new(&config)?;
    let auth = AuthClient::new(&config)?;
    let session = SessionStore::init(config.session_path.clone(), &auth).await;
    let _watcher = session.log_changes();

    let app = router(AppState::new(rest, auth, session));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(backend = %config.backend_url, "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");
}
