//! One-shot shared-secret handshake, run before any shell is spawned.
//!
//! Wire sequence: server sends the protocol banner, client answers with the
//! secret line, server sends the ok banner only on an exact match. After
//! that the connection carries raw terminal bytes with no further framing.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Identification banner sent as soon as a connection is accepted.
pub const PROTOCOL_BANNER: &[u8] = b"<rembash2>\n";

/// Acknowledgment banner, sent only after the secret matched.
pub const OK_BANNER: &[u8] = b"<ok>\n";

/// Secret used when none is configured. The trailing newline is part of
/// the comparison.
pub const DEFAULT_SECRET: &str = "cs591secret\n";

/// Upper bound on the single secret read.
pub const SECRET_READ_LIMIT: usize = 512;

/// Verdict of a completed handshake.
#[derive(Debug)]
pub enum HandshakeOutcome {
    /// Secret matched; the ok banner has already been written.
    Authenticated,
    /// Secret did not match; carries the received bytes so the caller can
    /// log them. Nothing further was written to the peer.
    Rejected(Vec<u8>),
}

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    /// Read or write on the connection failed mid-handshake. Fatal for the
    /// connection and indistinguishable from a deliberate close.
    #[error("handshake transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// Run the handshake on a fresh connection.
///
/// Performs exactly one read of up to [`SECRET_READ_LIMIT`] bytes and
/// compares it byte-for-byte, line terminator included, against `secret`.
/// There is no accumulation across reads and no retry: a secret split over
/// multiple reads is rejected. An immediate EOF compares as empty input
/// and is rejected the same way.
pub async fn authenticate<S>(
    stream: &mut S,
    secret: &[u8],
) -> Result<HandshakeOutcome, HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(PROTOCOL_BANNER).await?;

    let mut buf = [0u8; SECRET_READ_LIMIT];
    let n = stream.read(&mut buf).await?;

    if &buf[..n] == secret {
        stream.write_all(OK_BANNER).await?;
        Ok(HandshakeOutcome::Authenticated)
    } else {
        Ok(HandshakeOutcome::Rejected(buf[..n].to_vec()))
    }
}
