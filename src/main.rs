// msgexport - Stored search export for Elasticsearch
// Copyright (c) 2025 msgexport Contributors
// Licensed under the MIT License

use clap::Parser;
use msgexport::cli::{Cli, Commands};
use msgexport::config::{load_config, LoggingConfig};
use msgexport::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging only when a readable config asks for it; commands report
    // config errors themselves.
    let file_config = load_config(&cli.config).ok();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = match &file_config {
        Some(config) => config.logging.clone(),
        None => LoggingConfig {
            local_enabled: false,
            ..LoggingConfig::default()
        },
    };

    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "msgexport starting");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        wait_for_shutdown().await;
        tracing::info!("Shutdown signal received, stopping after the current chunk");
        eprintln!("\n⚠️  Shutdown signal received, stopping after the current chunk...");
        let _ = shutdown_tx.send(true);
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    drop(logging_guard);
    process::exit(exit_code);
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT (Ctrl+C)"),
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
                }
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler, listening for Ctrl+C only");
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Export(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
