//! remshd - shared-secret remote shell daemon
//!
//! Accepts plain TCP connections and authenticates each one with a
//! one-line shared-secret handshake. On success the connection is bound to
//! a freshly spawned interactive shell inside a pseudo-terminal, with all
//! traffic relayed transparently between the peer and the shell's terminal
//! until either side closes.
//!
//! Per-connection pipeline: [`handshake`] (gate) -> PTY session start ->
//! [`relay`] -> teardown. Each connection runs in its own task; nothing a
//! single connection does can take down the accept loop or another
//! connection.

pub mod connection;
pub mod handshake;
pub mod relay;
pub mod server;

pub use connection::{ConnectionConfig, handle_connection};
pub use handshake::{HandshakeError, HandshakeOutcome, authenticate};
pub use relay::{RelayEnd, ShellStream, relay};
pub use server::serve;
