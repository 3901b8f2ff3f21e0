use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use helpdesk::config::ServeArgs;
use helpdesk::db::Database;
use helpdesk::AppState;

pub async fn run(args: &ServeArgs) -> Result<()> {
    let db = Database::open(&args.db.database)
        .with_context(|| format!("Failed to open {}", args.db.database.display()))?;
    let paging = args.paging();
    let app = helpdesk::app(AppState::new(db, paging));

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!(
        addr = %listener.local_addr()?,
        database = %args.db.database.display(),
        page_size = paging.default_size,
        max_page_size = paging.max_size,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
