use anyhow::Context;
use portable_pty::{Child, CommandBuilder, MasterPty, PtySize, native_pty_system};
use std::io::{Read, Write};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::PtyError;

/// Configuration for the program spawned inside the PTY
#[derive(Clone, Debug)]
pub struct PtyConfig {
    pub shell: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub rows: u16,
    pub cols: u16,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            shell: "/bin/bash".to_string(),
            // Interactive with readline disabled; the terminal transport is
            // already character-at-a-time, so bash's own line editing would
            // only fight the client's.
            args: vec!["--noediting".to_string(), "-i".to_string()],
            env: Vec::new(),
            rows: 24,
            cols: 80,
        }
    }
}

/// One interactive shell attached to the subordinate side of a PTY pair.
///
/// The master side lives here: a blocking reader thread pumps shell output
/// into a bounded channel, and input goes through the retained master
/// writer. The shell process is not reaped beyond liveness checks; its exit
/// is observed as end-of-file on the master, surfaced as the output channel
/// closing.
pub struct PtySession {
    // Held so the master side outlives the reader/writer handles.
    _master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: Box<dyn Child + Send + Sync>,
    output_rx: mpsc::Receiver<Vec<u8>>,
}

impl PtySession {
    /// Allocate a PTY pair and spawn the configured shell on its
    /// subordinate side.
    ///
    /// The spawned shell becomes the leader of a fresh session with the
    /// subordinate side as its controlling terminal, so job control and
    /// terminal signal delivery behave as on a real terminal.
    pub fn spawn(config: PtyConfig) -> Result<Self, PtyError> {
        let pty_system = native_pty_system();

        let pair = pty_system
            .openpty(PtySize {
                rows: config.rows,
                cols: config.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("Failed to open PTY")
            .map_err(PtyError::from)?;

        let mut cmd = CommandBuilder::new(&config.shell);
        for arg in &config.args {
            cmd.arg(arg);
        }

        // Environment for proper terminal behavior
        cmd.env("TERM", "xterm-256color");
        if let Ok(path) = std::env::var("PATH") {
            cmd.env("PATH", path);
        }
        if let Ok(home) = std::env::var("HOME") {
            cmd.env("HOME", home);
        }
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        debug!(
            "Spawning shell: {} with args: {:?}",
            config.shell, config.args
        );

        let child = pair.slave.spawn_command(cmd).map_err(|e| {
            error!("Failed to spawn shell '{}': {}", config.shell, e);
            PtyError::SpawnFailed(e.to_string())
        })?;

        // The shell owns the subordinate side now. Dropping our reference
        // makes master-side EOF track the shell's lifetime.
        drop(pair.slave);

        info!("Shell started with PID: {:?}", child.process_id());

        let mut reader = pair
            .master
            .try_clone_reader()
            .context("Failed to clone PTY reader")
            .map_err(PtyError::from)?;

        let writer = pair
            .master
            .take_writer()
            .context("Failed to take PTY writer")
            .map_err(PtyError::from)?;

        let (output_tx, output_rx) = mpsc::channel(64);

        // Blocking reader thread for shell output. The bounded channel gives
        // implicit backpressure: a stalled consumer stalls this read loop.
        std::thread::spawn(move || {
            let mut buffer = vec![0u8; 4096];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) => {
                        debug!("PTY EOF - shell has exited");
                        break;
                    }
                    Ok(n) => {
                        if output_tx.blocking_send(buffer[..n].to_vec()).is_err() {
                            // Session was dropped; nobody left to read.
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Error reading PTY output: {}", e);
                        break;
                    }
                }
            }
            debug!("PTY reader thread exiting");
        });

        Ok(Self {
            _master: pair.master,
            writer,
            child,
            output_rx,
        })
    }

    /// Await the next chunk of shell output.
    ///
    /// `None` means the shell side is finished (process exited or the
    /// master errored) and its output is fully drained. Cancel-safe.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.output_rx.recv().await
    }

    /// Write bytes to the shell's terminal input, in full.
    pub fn write(&mut self, data: &[u8]) -> Result<(), PtyError> {
        self.writer
            .write_all(data)
            .map_err(|e| PtyError::WriteFailed(e.to_string()))?;
        self.writer
            .flush()
            .map_err(|e| PtyError::WriteFailed(e.to_string()))
    }

    /// OS process id of the spawned shell, if still known.
    pub fn pid(&self) -> Option<u32> {
        self.child.process_id()
    }

    /// Whether the shell process is still running.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Hang up the shell's terminal.
    ///
    /// Used at teardown when the network side goes away first; the shell
    /// exits on SIGHUP like it would on any terminal close.
    #[cfg(unix)]
    pub fn hangup(&mut self) {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        if let Some(pid) = self.child.process_id() {
            debug!("Sending SIGHUP to shell {}", pid);
            if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGHUP) {
                debug!("Failed to signal shell {}: {}", pid, e);
            }
        }
    }
}
