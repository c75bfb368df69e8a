//! Headless participant that wanders around the town.
//!
//! Useful for trying the host without opening a window, and for keeping a
//! few avatars busy during manual testing.

use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shared::actions::CHAT_CATEGORIES;
use shared::{
    Gesture, Packet, CLIENT_VERSION, DSP_SPRITE_SIZE, GAME_HEIGHT, GAME_WIDTH, MAX_DATAGRAM_SIZE,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{interval, timeout, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Name to join as
    #[arg(short, long, default_value = "Bot")]
    name: String,

    /// Seconds to stay before leaving
    #[arg(short, long, default_value = "60")]
    duration: u64,

    /// Seconds between actions
    #[arg(short, long, default_value = "3")]
    pace: u64,

    /// Seed for reproducible wandering
    #[arg(long)]
    seed: Option<u64>,
}

/// Picks the bot's next move: mostly walking, sometimes chatting or dancing.
fn next_action(rng: &mut StdRng) -> Packet {
    let roll: f32 = rng.gen();

    if roll >= 0.85 {
        if let Some(gesture) = Gesture::SELECTABLE.choose(rng) {
            return Packet::SetGesture { gesture: *gesture };
        }
    } else if roll >= 0.6 {
        let phrase = CHAT_CATEGORIES
            .choose(rng)
            .and_then(|category| category.phrases.choose(rng));
        if let Some(message) = phrase {
            return Packet::SendChat {
                message: message.to_string(),
            };
        }
    }

    Packet::SetTarget {
        x: rng.gen_range(0.0..GAME_WIDTH - DSP_SPRITE_SIZE),
        y: rng.gen_range(0.0..GAME_HEIGHT - DSP_SPRITE_SIZE),
    }
}

async fn send(
    socket: &UdpSocket,
    packet: &Packet,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    socket.send_to(&packet.encode()?, addr).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    let server_addr: SocketAddr = args.server.parse()?;
    info!("Bot socket bound to {}", socket.local_addr()?);

    let join = Packet::Join {
        name: args.name.clone(),
        client_version: CLIENT_VERSION,
    };
    send(&socket, &join, server_addr).await?;

    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    let name = loop {
        let (len, _) = timeout(Duration::from_secs(5), socket.recv_from(&mut buf)).await??;
        match Packet::decode(&buf[..len]) {
            Ok(Packet::Joined { name }) => break name,
            Ok(Packet::Rejected { reason }) => {
                warn!("Join rejected: {}", reason);
                return Ok(());
            }
            Ok(_) => continue,
            Err(e) => warn!("Failed to deserialize response: {}", e),
        }
    };
    info!("Joined as {}", name);

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut heartbeat = interval(Duration::from_secs(1));
    let mut pace = interval(Duration::from_secs(args.pace.max(1)));
    let deadline = Instant::now() + Duration::from_secs(args.duration);
    let mut events_seen = 0u64;

    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,

            _ = heartbeat.tick() => {
                send(&socket, &Packet::Heartbeat, server_addr).await?;
            },

            _ = pace.tick() => {
                let action = next_action(&mut rng);
                info!("{}: {:?}", name, action);
                send(&socket, &action, server_addr).await?;
            },

            result = socket.recv_from(&mut buf) => {
                let (len, _) = result?;
                if let Ok(Packet::Event { .. }) = Packet::decode(&buf[..len]) {
                    events_seen += 1;
                }
            },
        }
    }

    send(&socket, &Packet::Leave, server_addr).await?;
    info!("{} leaving after {} events", name, events_seen);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_stay_in_scene() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            match next_action(&mut rng) {
                Packet::SetTarget { x, y } => {
                    assert!((0.0..GAME_WIDTH).contains(&x));
                    assert!((0.0..GAME_HEIGHT).contains(&y));
                }
                Packet::SendChat { message } => {
                    assert!(shared::actions::is_catalog_phrase(&message))
                }
                Packet::SetGesture { gesture } => assert!(gesture.is_selectable()),
                other => panic!("Unexpected action {:?}", other),
            }
        }
    }
}
