//! Kinboard API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod reminder_scheduler;
mod state;

use kinboard_core::AppError;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api_config::ApiConfig;
use crate::api_services::{Repositories, build_email_service, build_services, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let pool = connect_and_migrate(&config).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let email_service = build_email_service(&config.email_provider)?;
    let services = build_services(&config, Repositories::postgres(pool, email_service))?;
    let app = api_router::build_router(services.state, config.frontend_url.as_str())?;

    let shutdown = CancellationToken::new();
    let scheduler = match config.reminder_interval {
        Some(interval) => Some(reminder_scheduler::spawn_reminder_scheduler(
            services.reminder_service,
            interval,
            shutdown.clone(),
        )),
        None => {
            info!("invite reminder scheduler disabled");
            None
        }
    };

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "kinboard-api listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")));

    if let Some(scheduler) = scheduler {
        if let Err(error) = scheduler.await {
            warn!(error = %error, "reminder scheduler task ended abnormally");
        }
    }

    served
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(error = %error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(error = %error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let trigger = first_signal(ctrl_c, terminate).await;
    info!(signal = ?trigger, "shutting down");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownTrigger {
    Interrupt,
    Terminate,
}

async fn first_signal(
    interrupt: impl Future<Output = ()>,
    terminate: impl Future<Output = ()>,
) -> ShutdownTrigger {
    tokio::select! {
        () = interrupt => ShutdownTrigger::Interrupt,
        () = terminate => ShutdownTrigger::Terminate,
    }
}
