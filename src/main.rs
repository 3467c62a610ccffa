use gym_admin::{load_data, persist_data, router, AppState, ServiceConfig};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = ServiceConfig::from_env()?;
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut data = load_data(&config.data_path).await;
    let seeded = data.seed_plans();
    if seeded > 0 {
        persist_data(&config.data_path, &data).await?;
        info!(seeded, "seeded default plans");
    }
    info!(path = %config.data_path.display(), "using data file");
    if let Some(today) = config.today {
        info!(%today, "calendar pinned");
    }

    let state = AppState::new(config.data_path.clone(), data, config.today);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
