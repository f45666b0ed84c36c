use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use yatube::{auth, config::Config, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("yatube=info,tower_http=info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    let db_pool = db::connect(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;
    let clients = auth::Clients::load(&config.client_secret_path, &config.public_url)?;
    tokio::fs::create_dir_all(&config.media_root)
        .await
        .with_context(|| format!("creating {}", config.media_root.display()))?;

    let address = config.bind_address();
    let app_state = AppState::new(db_pool, clients, config);
    info!(ttl = ?app_state.feed_cache.ttl(), "front page cache ready");
    let app = yatube::app(app_state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!("listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                error!("could not listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                error!("could not listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
