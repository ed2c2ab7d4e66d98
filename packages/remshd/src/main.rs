use anyhow::{Context, Result};
use clap::Parser;
use pty_session::PtyConfig;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use remshd::connection::ConnectionConfig;
use remshd::server;

#[derive(Parser)]
#[command(name = "remshd")]
#[command(about = "Shared-secret remote shell daemon over plain TCP")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5910")]
    port: u16,

    /// Address to bind to
    #[arg(short = 'b', long, default_value = "0.0.0.0")]
    bind: String,

    /// Shared secret clients must present (the line terminator is implied)
    #[arg(short, long, env = "REMSHD_SECRET", default_value = "cs591secret")]
    secret: String,

    /// Shell to run for authenticated clients
    #[arg(long, default_value = "/bin/bash")]
    shell: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let filter = if args.debug {
        "remshd=debug,pty_session=debug"
    } else {
        "remshd=info,pty_session=info"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ConnectionConfig {
        // The wire protocol compares the whole line, newline included.
        secret: format!("{}\n", args.secret).into_bytes(),
        pty: PtyConfig {
            shell: args.shell,
            ..Default::default()
        },
    };

    let addr = format!("{}:{}", args.bind, args.port)
        .parse::<SocketAddr>()
        .context("Invalid bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("remshd listening on {}", listener.local_addr()?);
    info!("Serving shell: {}", config.pty.shell);

    server::serve(listener, config).await
}
