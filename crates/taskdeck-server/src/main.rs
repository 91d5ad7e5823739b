use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "taskdeck-server")]
struct Cli {
    /// Address to bind
    #[arg(long, env = "TASKDECK_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(long, env = "TASKDECK_PORT", default_value_t = 8000)]
    port: u16,

    /// SQLite database path (defaults to the user data dir)
    #[arg(long, env = "TASKDECK_DB")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("taskdeck-server starting");

    let db = match &cli.db {
        Some(path) => taskdeck_db::Db::open(path)?,
        None => taskdeck_db::Db::open_default()?,
    };

    let addr = SocketAddr::new(cli.bind.parse()?, cli.port);
    let listener = TcpListener::bind(addr).await?;
    eprintln!("taskdeck-server listening on http://{addr}");

    taskdeck_server::serve(listener, db).await
}
