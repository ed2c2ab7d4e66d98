//! PTY Session - pure PTY shell lifecycle library
//!
//! This crate provides a minimal API for running one interactive program
//! inside a pseudo-terminal. It has no network knowledge: callers get back
//! a byte-level view of the terminal's master side and decide what to do
//! with it.
//!
//! # Example
//!
//! ```no_run
//! use pty_session::{PtyConfig, PtySession};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut session = PtySession::spawn(PtyConfig::default()).unwrap();
//!
//!     session.write(b"echo hello\n").unwrap();
//!
//!     while let Some(chunk) = session.recv().await {
//!         print!("{}", String::from_utf8_lossy(&chunk));
//!     }
//!     // recv() returning None means the shell exited.
//! }
//! ```

mod error;
pub mod pty;

pub use error::PtyError;
pub use pty::{PtyConfig, PtySession};
