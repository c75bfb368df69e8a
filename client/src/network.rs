use crate::game::{Applied, ViewerState};
use crate::input::InputManager;
use crate::rendering::{RenderConfig, Renderer};
use crate::toolbar::Toolbar;
use log::{debug, error, info, warn};
use macroquad::prelude::{get_frame_time, is_quit_requested, next_frame, prevent_quit};
use shared::{Packet, CLIENT_VERSION, MAX_DATAGRAM_SIZE};
use std::error::Error;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);
const JOIN_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Non-blocking UDP link to the host, polled once per frame.
pub struct Connection {
    socket: UdpSocket,
    server_addr: SocketAddr,
    buffer: Vec<u8>,
}

impl Connection {
    pub fn new(server_addr: &str) -> Result<Self, Box<dyn Error>> {
        let server_addr: SocketAddr = server_addr.parse()?;
        let bind_addr = if server_addr.is_ipv6() {
            "[::]:0"
        } else {
            "0.0.0.0:0"
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.set_nonblocking(true)?;

        Ok(Connection {
            socket,
            server_addr,
            buffer: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn send(&self, packet: &Packet) -> Result<(), Box<dyn Error>> {
        let data = packet.encode()?;
        self.socket.send_to(&data, self.server_addr)?;
        Ok(())
    }

    /// Tells the host this viewer is gone. A failed send is logged and the
    /// host drops the viewer once its heartbeat times out.
    pub fn leave(&self) {
        match self.send(&Packet::Leave) {
            Ok(()) => info!("Left the town"),
            Err(e) => warn!("Failed to send leave: {}", e),
        }
    }

    /// Drains every datagram that is already waiting. Datagrams from other
    /// senders and undecodable ones are dropped.
    pub fn poll(&mut self) -> Vec<Packet> {
        let mut packets = Vec::new();

        loop {
            match self.socket.recv_from(&mut self.buffer) {
                Ok((len, addr)) => {
                    if addr != self.server_addr {
                        debug!("Ignoring datagram from {}", addr);
                        continue;
                    }
                    match Packet::decode(&self.buffer[..len]) {
                        Ok(packet) => packets.push(packet),
                        Err(e) => warn!("Failed to deserialize packet: {}", e),
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    error!("Error receiving packet: {}", e);
                    break;
                }
            }
        }

        packets
    }
}

/// Where the viewer is in its session with the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Joining,
    Joined,
    Rejected(String),
}

pub struct Client {
    connection: Connection,
    requested_name: String,
    session: Session,

    game_state: ViewerState,
    input_manager: InputManager,
    toolbar: Toolbar,
    renderer: Renderer,

    last_join_sent: Option<Instant>,
    last_heartbeat: Instant,
}

impl Client {
    pub async fn new(server_addr: &str, name: &str) -> Result<Self, Box<dyn Error>> {
        let connection = Connection::new(server_addr)?;
        info!("Client socket bound to {}", connection.local_addr()?);

        let renderer = Renderer::new().await;

        Ok(Client {
            connection,
            requested_name: name.to_string(),
            session: Session::Joining,
            game_state: ViewerState::new(),
            input_manager: InputManager::new(),
            toolbar: Toolbar::new(),
            renderer,
            last_join_sent: None,
            last_heartbeat: Instant::now(),
        })
    }

    /// Sends a join request, again every second until the host answers.
    fn connect(&mut self) -> Result<(), Box<dyn Error>> {
        let due = self
            .last_join_sent
            .map_or(true, |sent| sent.elapsed() >= JOIN_RETRY_INTERVAL);
        if !due {
            return Ok(());
        }

        info!("Joining as {}...", self.requested_name);
        self.connection.send(&Packet::Join {
            name: self.requested_name.clone(),
            client_version: CLIENT_VERSION,
        })?;
        self.last_join_sent = Some(Instant::now());
        Ok(())
    }

    fn handle_packet(&mut self, packet: Packet) {
        match packet {
            Packet::Joined { name } => {
                if self.session != Session::Joined {
                    self.session = Session::Joined;
                    self.game_state.set_local_name(name);
                }
            }

            Packet::Rejected { reason } => {
                warn!("Join rejected: {}", reason);
                self.session = Session::Rejected(reason);
            }

            Packet::Event { sequence, event } => {
                if self.game_state.apply_event(sequence, &event) == Applied::Rejected {
                    debug!("Waiting for the next snapshot to repair the local copy");
                }
            }

            _ => {
                warn!("Unexpected packet type");
            }
        }
    }

    fn send_action(&mut self, packet: Packet) {
        if self.session != Session::Joined {
            return;
        }
        if let Err(e) = self.connection.send(&packet) {
            error!("Error sending action: {}", e);
        }
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn Error>> {
        prevent_quit();

        loop {
            if is_quit_requested() {
                break;
            }

            for packet in self.connection.poll() {
                self.handle_packet(packet);
            }

            match self.session {
                Session::Joining => self.connect()?,
                Session::Joined => {
                    if self.last_heartbeat.elapsed() >= HEARTBEAT_INTERVAL {
                        self.connection.send(&Packet::Heartbeat)?;
                        self.last_heartbeat = Instant::now();
                    }
                }
                Session::Rejected(_) => {}
            }

            if let Some(action) = self.input_manager.update(&mut self.toolbar) {
                self.send_action(action);
            }

            self.game_state.update(get_frame_time());

            self.renderer.render(
                self.game_state.players(),
                &self.toolbar,
                RenderConfig {
                    local_name: self.game_state.local_name(),
                    session: &self.session,
                    synced: self.game_state.has_snapshot(),
                },
            );

            next_frame().await;
        }

        if self.session == Session::Joined {
            self.connection.leave();
        }

        Ok(())
    }
}
