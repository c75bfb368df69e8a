use clap::Parser;
use log::info;
use server::config::ServerConfig;
use server::network::{Server, ServerError, ServerMessage};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Tick rate (updates per second)
    #[arg(short, long, default_value = "30")]
    tick_rate: u32,

    /// Maximum number of connected viewers (capped at 64)
    #[arg(short, long, default_value = "16")]
    max_clients: usize,

    /// Seconds of silence before a viewer is dropped
    #[arg(long, default_value = "5")]
    client_timeout: u64,

    /// Ticks between full-snapshot broadcasts
    #[arg(short, long, default_value = "60")]
    sync_interval: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        ServerConfig {
            bind_addr: format!("{}:{}", args.host, args.port),
            tick_duration: Duration::from_secs_f32(1.0 / args.tick_rate.max(1) as f32),
            max_clients: args.max_clients,
            client_timeout: Duration::from_secs(args.client_timeout),
            sync_interval: args.sync_interval.max(1),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ServerConfig::from(Args::parse());
    info!("Starting server on {}", config.bind_addr);

    let mut server = Server::new(config).await?;
    let shutdown = server.shutdown_handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down gracefully...");
            let _ = shutdown.send(ServerMessage::Shutdown);
        }
    });

    server.run().await
}
