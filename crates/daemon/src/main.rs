// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wardd`: the host-resident firewall control-plane daemon binary.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use ward_daemon::listener::Listener;
use ward_daemon::{lifecycle, signals};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(ward_daemon::env::log_level()))
        .init();

    let config = match lifecycle::Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to resolve daemon configuration");
            return ExitCode::FAILURE;
        }
    };

    let started = match lifecycle::startup(&config).await {
        Ok(started) => started,
        Err(e) => {
            error!(error = %e, "wardd failed to start");
            return ExitCode::FAILURE;
        }
    };

    let daemon = Arc::new(started.daemon);
    let signal_task = tokio::spawn(signals::run(Arc::clone(&daemon)));

    Listener::new(started.listener, Arc::clone(&daemon)).run().await;

    signal_task.abort();
    daemon.teardown();
    info!("wardd exited");
    ExitCode::SUCCESS
}
