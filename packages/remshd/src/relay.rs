//! Transparent bidirectional byte relay between the network peer and the
//! shell's terminal.

use pty_session::{PtyError, PtySession};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Which side ended the session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelayEnd {
    /// The network peer closed (or errored) first.
    PeerClosed,
    /// The shell side reached end-of-file (process exited or the terminal
    /// was torn down).
    ShellExited,
}

/// Shell side of the relay: chunked output plus byte input.
///
/// [`PtySession`] is the real implementation; tests substitute in-memory
/// doubles so relay behavior can be checked without a terminal's echo and
/// newline cooking in the way.
#[allow(async_fn_in_trait)]
pub trait ShellStream {
    /// Next chunk of shell output; `None` ends the session. Must be
    /// cancel-safe, the relay polls it inside `select!`.
    async fn recv(&mut self) -> Option<Vec<u8>>;

    /// Write `data` to the shell's input, in full.
    fn send(&mut self, data: &[u8]) -> Result<(), PtyError>;
}

impl ShellStream for PtySession {
    async fn recv(&mut self) -> Option<Vec<u8>> {
        PtySession::recv(self).await
    }

    fn send(&mut self, data: &[u8]) -> Result<(), PtyError> {
        self.write(data)
    }
}

/// Copy bytes both ways until either side closes.
///
/// Blocks on readiness of the two sources, writes whatever one read
/// produced in full before waiting again, and interprets none of the
/// payload. The loop ends the instant either side reports end-of-stream;
/// the other side is not drained afterwards. Backpressure is implicit in
/// the blocking writes.
pub async fn relay<S, T>(stream: &mut S, shell: &mut T) -> std::io::Result<RelayEnd>
where
    S: AsyncRead + AsyncWrite + Unpin,
    T: ShellStream,
{
    let mut buf = [0u8; 4096];

    loop {
        tokio::select! {
            chunk = shell.recv() => match chunk {
                Some(data) => {
                    stream.write_all(&data).await?;
                }
                None => {
                    debug!("Shell output closed, ending relay");
                    return Ok(RelayEnd::ShellExited);
                }
            },
            read = stream.read(&mut buf) => match read? {
                0 => {
                    debug!("Peer closed connection, ending relay");
                    return Ok(RelayEnd::PeerClosed);
                }
                n => {
                    shell.send(&buf[..n]).map_err(std::io::Error::other)?;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
    use tokio::sync::mpsc;

    /// In-memory stand-in for the shell side of the relay.
    struct FakeShell {
        output_rx: mpsc::Receiver<Vec<u8>>,
        received: Vec<u8>,
    }

    impl FakeShell {
        fn new() -> (Self, mpsc::Sender<Vec<u8>>) {
            let (tx, rx) = mpsc::channel(16);
            (
                Self {
                    output_rx: rx,
                    received: Vec::new(),
                },
                tx,
            )
        }
    }

    impl ShellStream for FakeShell {
        async fn recv(&mut self) -> Option<Vec<u8>> {
            self.output_rx.recv().await
        }

        fn send(&mut self, data: &[u8]) -> Result<(), PtyError> {
            self.received.extend_from_slice(data);
            Ok(())
        }
    }

    #[tokio::test]
    async fn client_bytes_reach_the_shell_verbatim() {
        let (mut client, mut server) = duplex(1024);
        let (mut shell, _shell_tx) = FakeShell::new();

        // Arbitrary bytes including control characters, relayed untouched.
        let payload: &[u8] = b"ls -l\x03\x1b[A\x00\xff\n";
        client.write_all(payload).await.unwrap();
        drop(client);

        let end = relay(&mut server, &mut shell).await.unwrap();
        assert_eq!(end, RelayEnd::PeerClosed);
        assert_eq!(shell.received, payload);
    }

    #[tokio::test]
    async fn shell_bytes_reach_the_client_verbatim() {
        let (mut client, mut server) = duplex(1024);
        let (mut shell, shell_tx) = FakeShell::new();

        let relay_task = tokio::spawn(async move {
            let end = relay(&mut server, &mut shell).await.unwrap();
            assert_eq!(end, RelayEnd::ShellExited);
        });

        shell_tx.send(b"total 0\r\n".to_vec()).await.unwrap();
        shell_tx.send(b"\x1b[1mbold\x1b[0m".to_vec()).await.unwrap();
        drop(shell_tx);

        let mut output = Vec::new();
        client.read_to_end(&mut output).await.unwrap();
        assert_eq!(output, b"total 0\r\n\x1b[1mbold\x1b[0m");

        relay_task.await.unwrap();
    }

    #[tokio::test]
    async fn shell_exit_closes_the_client_stream() {
        let (mut client, mut server) = duplex(1024);
        let (mut shell, shell_tx) = FakeShell::new();

        let relay_task = tokio::spawn(async move {
            let end = relay(&mut server, &mut shell).await.unwrap();
            assert_eq!(end, RelayEnd::ShellExited);
            // Dropping `server` here closes the client-facing stream.
        });

        drop(shell_tx);
        relay_task.await.unwrap();

        let mut rest = Vec::new();
        client.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn ordering_is_preserved_per_direction() {
        let (mut client, mut server) = duplex(4096);
        let (mut shell, _shell_tx) = FakeShell::new();

        for i in 0..100u8 {
            client.write_all(&[i]).await.unwrap();
        }
        drop(client);

        relay(&mut server, &mut shell).await.unwrap();
        assert_eq!(shell.received, (0..100u8).collect::<Vec<_>>());
    }
}
