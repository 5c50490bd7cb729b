//! numhub service binary
//!
//! Bootstrap order: configuration (fatal on missing vars), tracing,
//! database pool, settings seeding, service context, background sweepers,
//! broadcast resume. Then wait for ctrl-c and wind the tasks down.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::info;

use numhub_common::{
    config::AppConfig,
    telemetry::{init_tracing_with_config, TracingConfig},
};
use numhub_db::{
    create_pool, DatabaseConfig, PgAdvertisementRepository, PgBroadcastRepository,
    PgChannelRepository, PgCountryRepository, PgLedgerRepository, PgMaintenanceRepository,
    PgNumberRepository, PgProofRepository, PgSettingsRepository, PgUserRepository,
};
use numhub_service::{BroadcastService, ServiceContext, SettingsService, SweeperSet};
use numhub_telegram::TelegramGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing required configuration must stop the process here
    let config = AppConfig::from_env().context("configuration")?;

    if config.app.env.is_production() {
        init_tracing_with_config(TracingConfig::production());
    } else {
        init_tracing_with_config(TracingConfig::development());
    }

    info!(app = %config.app.name, env = ?config.app.env, "Starting");

    let pool = create_pool(&DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        acquire_timeout: config.database.acquire_timeout,
        ..DatabaseConfig::default()
    })
    .await
    .context("database pool")?;

    let gateway =
        TelegramGateway::new(&config.telegram).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let ctx = ServiceContext::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgLedgerRepository::new(pool.clone())),
        Arc::new(PgCountryRepository::new(pool.clone())),
        Arc::new(PgNumberRepository::new(pool.clone())),
        Arc::new(PgSettingsRepository::new(pool.clone())),
        Arc::new(PgAdvertisementRepository::new(pool.clone())),
        Arc::new(PgBroadcastRepository::new(pool.clone())),
        Arc::new(PgChannelRepository::new(pool.clone())),
        Arc::new(PgProofRepository::new(pool.clone())),
        Arc::new(PgMaintenanceRepository::new(pool)),
        Arc::new(gateway),
        config.app.admin_id,
        config.broadcast.send_delay,
    );

    SettingsService::new(&ctx)
        .seed_defaults()
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .context("settings seed")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweepers = SweeperSet::spawn(ctx.clone(), &config.sweeper, shutdown_rx);

    let resumed = BroadcastService::new(&ctx)
        .resume_interrupted()
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    if resumed > 0 {
        info!(resumed, "Resumed interrupted broadcasts");
    }

    info!("Ready");

    tokio::signal::ctrl_c().await.context("signal handler")?;
    info!("Shutting down");

    shutdown_tx.send(true).ok();
    sweepers.join().await;

    Ok(())
}
