use std::net::SocketAddr;

use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

use learnsmart::learnsmart_config::ServerConfig;
use learnsmart::learnsmart_db::{init_db_pool, run_migrations};
use learnsmart::logging::{init_tracing, shutdown_tracer};
use learnsmart::metrics::{init_metrics, metrics_app};
use learnsmart::router::init_router;
use learnsmart::state::AppState;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let metrics_handle = init_metrics();
    let server_config = ServerConfig::from_env();

    let db = match init_db_pool(server_config.database_max_connections).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Failed to connect to the database");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&db).await {
        error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let state = AppState::from_env(db);
    let mut app = init_router(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(metrics_app(handle));
    }

    let address = server_config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, address = %address, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!("🚀 Server running on http://{}", address);
    info!("📚 Swagger UI available at http://{}/swagger-ui", address);
    info!("📖 Scalar UI available at http://{}/scalar", address);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    if let Err(e) = served {
        error!(error = %e, "Server error");
    }

    shutdown_tracer().await;
}
