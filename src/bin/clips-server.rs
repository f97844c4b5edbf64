// SPDX-License-Identifier: GPL-2.0-or-later
use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use clips_service::config::Config;
use clips_service::db::{ClipRepository, PgClipRepository};
use clips_service::web::{create_router, AppState};
use clips_service::{cli, seed, Error};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = cli::Clips::parse();
    if let Err(e) = opts.config.validate() {
        error!("{}", e);
        std::process::exit(2);
    }
    info!("Starting with {}", opts.config);

    // The pool connects lazily so the server can start while the database is still coming up.
    debug!("Creating the database connection pool");
    let db_pool = match PgPoolOptions::new()
        .max_connections(opts.config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy(&opts.config.database_url())
    {
        Ok(pool) => pool,
        Err(e) => {
            error!("Invalid database connection settings: {}", e);
            std::process::exit(2);
        }
    };
    let repository = Arc::new(PgClipRepository::new(db_pool));

    match process_command(opts, repository).await {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn process_command(opts: cli::Clips, repository: Arc<PgClipRepository>) -> Result<(), Error> {
    match opts.command {
        cli::Command::Run => {
            match seed::bootstrap(
                repository.as_ref(),
                opts.config.db_connect_retries,
                opts.config.db_connect_delay(),
            )
            .await
            {
                Ok(inserted) => info!(inserted, "Database bootstrap complete"),
                Err(e @ Error::DatabaseUnavailable { .. }) => {
                    error!("{}; skipping seeding and starting anyway", e)
                }
                Err(e) => error!("Database bootstrap failed: {}", e),
            }
            serve(&opts.config, repository).await
        }
        cli::Command::Seed { reset } => {
            seed::wait_for_store(
                repository.as_ref(),
                opts.config.db_connect_retries,
                opts.config.db_connect_delay(),
            )
            .await?;
            repository.ensure_schema().await?;
            if reset {
                let removed = repository.clear().await?;
                warn!(removed, "Removed existing clips");
            }
            let inserted = seed::seed_if_empty(repository.as_ref()).await?;
            println!("Inserted {inserted} clips");
            Ok(())
        }
    }
}

async fn serve(config: &Config, repository: Arc<PgClipRepository>) -> Result<(), Error> {
    let state = AppState::new(config, repository)?;
    let router = create_router(config, state);

    let http_handle = axum_server::Handle::new();
    let handle = http_handle.clone();
    tokio::spawn(async move {
        let _shutdown_signal = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received; beginning graceful shutdown.");
        handle.graceful_shutdown(Some(std::time::Duration::from_secs(15)));
    });

    let address = config.listen_address;
    match (&config.tls_certificate, &config.tls_key) {
        (None, None) => {
            info!("Starting HTTP server on {:?}", &address);
            axum_server::bind(address)
                .handle(http_handle)
                .serve(router.into_make_service())
                .await
                .map_err(Error::Server)
        }
        (Some(cert), Some(key)) => {
            info!("Starting HTTPS server on {:?}", &address);
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
                .await
                .map_err(Error::Server)?;
            axum_server::bind_rustls(address, tls_config)
                .handle(http_handle)
                .serve(router.into_make_service())
                .await
                .map_err(Error::Server)
        }
        _ => Err(Error::ConfigValueError(
            "'tls_certificate' and 'tls_key' must both be set or neither should be set.".into(),
        )),
    }
}
