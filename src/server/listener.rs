use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::api::handler::ApiHandler;
use crate::config::ServerConfig;
use crate::http::connection::Connection;
use crate::server::shutdown;

/// Pause after a failed accept (e.g. fd exhaustion) before retrying.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

pub struct Server {
    listener: TcpListener,
    handler: ApiHandler,
    settings: ServerConfig,
}

impl Server {
    pub async fn bind(settings: &ServerConfig, handler: ApiHandler) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&settings.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", settings.listen_addr))?;

        Ok(Self {
            listener,
            handler,
            settings: settings.clone(),
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves connections until `shutdown` resolves, then drains.
    ///
    /// Draining stops accepting, closes idle keep-alive connections and lets
    /// in-flight requests finish for up to the configured grace period.
    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        let Server {
            listener,
            handler,
            settings,
        } = self;

        let (trigger, signal) = shutdown::channel();
        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        info!("Listening on {}", listener.local_addr()?);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }

                accepted = listener.accept() => {
                    let (socket, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                            continue;
                        }
                    };
                    debug!("Accepted connection from {}", peer);

                    let mut conn = Connection::new(
                        socket,
                        handler.clone(),
                        settings.clone(),
                        signal.clone(),
                    );
                    tasks.spawn(async move {
                        if let Err(e) = conn.run().await {
                            warn!("Connection error from {}: {}", peer, e);
                        }
                    });
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "Connection task failed");
                    }
                }
            }
        }

        // New connections are refused from here on
        drop(listener);
        trigger.trigger();

        let in_flight = tasks.len();
        if in_flight > 0 {
            info!(connections = in_flight, "Draining connections");
        }

        let drained = tokio::time::timeout(settings.shutdown_grace(), async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(
                remaining = tasks.len(),
                "Grace period elapsed, aborting remaining connections"
            );
            tasks.shutdown().await;
        }

        info!("Server stopped");
        Ok(())
    }
}
