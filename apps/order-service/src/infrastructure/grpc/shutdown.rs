//! Bounded graceful shutdown for the gRPC server.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// How the server future ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerExit {
    /// Completed on its own, either before or while draining.
    Completed,
    /// Still draining when the timeout elapsed; dropped.
    DrainTimedOut,
}

/// Drive `server` until it completes. Once `shutdown` fires, it gets at most
/// `drain_timeout` to finish before it is dropped.
///
/// # Errors
///
/// Returns the server's own error if it fails before the timeout.
pub async fn serve_until_drained<F, E>(
    server: F,
    shutdown: CancellationToken,
    drain_timeout: Duration,
) -> Result<ServerExit, E>
where
    F: Future<Output = Result<(), E>>,
{
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result.map(|()| ServerExit::Completed),
        () = shutdown.cancelled() => {
            match tokio::time::timeout(drain_timeout, &mut server).await {
                Ok(result) => result.map(|()| ServerExit::Completed),
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = drain_timeout.as_secs(),
                        "Graceful shutdown timed out, dropping open connections"
                    );
                    Ok(ServerExit::DrainTimedOut)
                }
            }
        }
    }
}
