use clap::Parser;
use client::network::Client;
use client::toolbar::TOOLBAR_HEIGHT;
use log::{error, info};
use macroquad::prelude::*;
use shared::{GAME_HEIGHT, GAME_WIDTH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Name shown above your koala
    #[arg(short = 'n', long, default_value = "Koala")]
    name: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Koala Town".to_owned(),
        window_width: GAME_WIDTH as i32,
        window_height: (GAME_HEIGHT + TOOLBAR_HEIGHT) as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    info!("Controls: click to walk, toolbar to chat or dance, 1-5 for dances");

    let mut client = match Client::new(&args.server, &args.name).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to start client: {}", e);
            return;
        }
    };

    if let Err(e) = client.run().await {
        error!("Client stopped: {}", e);
    }
}
