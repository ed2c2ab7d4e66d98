//! Per-connection lifecycle: handshake, session start, relay, teardown.

use anyhow::{Context, Result};
use pty_session::{PtyConfig, PtySession};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use crate::handshake::{self, HandshakeOutcome};
use crate::relay::{self, RelayEnd};

/// Per-connection settings, cloned into each worker task.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Expected secret line, terminator included.
    pub secret: Vec<u8>,
    /// Shell to spawn for authenticated peers.
    pub pty: PtyConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            secret: handshake::DEFAULT_SECRET.as_bytes().to_vec(),
            pty: PtyConfig::default(),
        }
    }
}

/// Drive one connection from handshake to teardown.
///
/// A rejected handshake is not an error here: the offending input is
/// logged and the connection simply closes, with no shell and no PTY ever
/// created. Errors returned from this function are scoped to this
/// connection; the caller logs them and moves on.
pub async fn handle_connection<S>(mut stream: S, config: ConnectionConfig) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match handshake::authenticate(&mut stream, &config.secret)
        .await
        .context("Handshake failed")?
    {
        HandshakeOutcome::Rejected(input) => {
            warn!(
                "Invalid shared secret received from client: {:?}",
                String::from_utf8_lossy(&input)
            );
            return Ok(());
        }
        HandshakeOutcome::Authenticated => {}
    }

    let mut session =
        PtySession::spawn(config.pty).context("Failed to start shell session")?;
    info!("Session started, shell PID: {:?}", session.pid());

    let end = relay::relay(&mut stream, &mut session)
        .await
        .context("Relay failed")?;

    match end {
        RelayEnd::PeerClosed => {
            info!("Peer disconnected, hanging up shell");
            #[cfg(unix)]
            session.hangup();
        }
        RelayEnd::ShellExited => {
            info!("Shell exited, closing connection");
        }
    }

    Ok(())
}
