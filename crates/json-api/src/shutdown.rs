//! Graceful shutdown on Ctrl+C or SIGTERM.

use std::{io, time::Duration};

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tracing::info;

/// How long in-flight requests (checkouts, webhook deliveries) get to finish.
pub(crate) const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub(crate) enum ShutdownSignalError {
    #[error("failed to install {signal} handler: {source}")]
    Install {
        signal: &'static str,
        #[source]
        source: io::Error,
    },
}

fn install_error(signal: &'static str) -> impl FnOnce(io::Error) -> ShutdownSignalError {
    move |source| ShutdownSignalError::Install { signal, source }
}

#[cfg(unix)]
async fn terminate() -> Result<(), ShutdownSignalError> {
    signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(install_error("SIGTERM"))?
        .recv()
        .await;

    Ok(())
}

#[cfg(windows)]
async fn terminate() -> Result<(), ShutdownSignalError> {
    signal::windows::ctrl_close()
        .map_err(install_error("console close"))?
        .recv()
        .await;

    Ok(())
}

/// Wait for a stop signal, then let the server drain.
pub(crate) async fn listen(handle: ServerHandle) -> Result<(), ShutdownSignalError> {
    let received = tokio::select! {
        result = signal::ctrl_c() => {
            result.map_err(install_error("Ctrl+C"))?;
            "ctrl_c"
        }
        result = terminate() => {
            result?;
            "terminate"
        }
    };

    info!(
        signal = received,
        drain_seconds = DRAIN_TIMEOUT.as_secs(),
        "shutting down, draining in-flight requests"
    );

    handle.stop_graceful(Some(DRAIN_TIMEOUT));

    Ok(())
}
