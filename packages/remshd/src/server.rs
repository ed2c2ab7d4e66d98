//! TCP accept loop and per-connection worker isolation.

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::connection::{self, ConnectionConfig};

/// Accept connections forever, handling each in its own task.
///
/// The task is the isolation unit: a failure or panic in one connection's
/// handler stays inside that task and is logged, never propagated to the
/// accept loop or to other connections. Finished tasks are detached; the
/// runtime reaps them.
pub async fn serve(listener: TcpListener, config: ConnectionConfig) -> Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Accept failed: {}", e);
                continue;
            }
        };

        info!("Connection from {}", peer);
        let config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = connection::handle_connection(stream, config).await {
                error!("Connection from {} failed: {:#}", peer, e);
            }
        });
    }
}
