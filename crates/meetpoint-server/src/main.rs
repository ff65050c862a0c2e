mod api;
mod middleware;

use std::sync::Arc;

use meetpoint_amap::AmapClient;
use meetpoint_db::PgLocationStore;
use meetpoint_planner::MeetingPlanner;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = meetpoint_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(?config, "starting meetpoint-server");

    let pool_config = meetpoint_db::PoolConfig::from_app_config(&config);
    let pool = meetpoint_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = meetpoint_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let amap = Arc::new(AmapClient::from_app_config(&config)?);
    let store = Arc::new(PgLocationStore::new(pool.clone()));
    let planner = MeetingPlanner::new(amap.clone(), amap.clone(), store.clone())
        .with_max_concurrency(config.provider_max_concurrency);

    let state = AppState {
        pool,
        store,
        geocoder: amap.clone(),
        places: amap.clone(),
        travel: amap,
        planner,
    };

    let auth = AuthState::from_env(&config.env)?;
    tracing::info!(enforced = auth.is_enforced(), "api key check configured");
    let app = build_app(state, auth);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
