//! Server network layer handling UDP communications and game loop coordination

use crate::client_manager::{disambiguate_name, sanitize_name, ClientManager};
use crate::config::ServerConfig;
use crate::game::GameState;
use log::{debug, error, info, warn};
use shared::{Event, Packet, CLIENT_VERSION, MAX_CHAT_LEN, MAX_DATAGRAM_SIZE};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, MissedTickBehavior};

pub type ServerError = Box<dyn std::error::Error + Send + Sync>;

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    ClientTimeout { client_id: u32, name: String },
    Shutdown,
}

/// Messages sent from game loop to network tasks
#[derive(Debug)]
pub enum GameMessage {
    SendPacket {
        packet: Packet,
        addr: SocketAddr,
    },
    BroadcastPacket {
        packet: Packet,
        exclude: Option<u32>,
    },
}

/// Authoritative host: owns the world and relays accepted events
///
/// The world state lives in this struct and is only touched from [`Server::run`],
/// so events and ticks are applied strictly one after another.
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: Arc<RwLock<ClientManager>>,
    game_state: GameState,
    config: ServerConfig,
    /// Number of events accepted so far
    sequence: u64,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
}

impl Server {
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let socket = Arc::new(UdpSocket::bind(&config.bind_addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            clients: Arc::new(RwLock::new(ClientManager::new(config.max_clients))),
            game_state: GameState::new(),
            config,
            sequence: 0,
            server_tx,
            server_rx,
            game_tx,
            game_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Handle that stops [`Server::run`] when sent [`ServerMessage::Shutdown`]
    pub fn shutdown_handle(&self) -> mpsc::UnboundedSender<ServerMessage> {
        self.server_tx.clone()
    }

    /// Spawns task that continuously listens for incoming packets
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => match Packet::decode(&buffer[0..len]) {
                        Ok(packet) => {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Failed to deserialize packet from {}: {}", addr, e),
                    },
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that processes outgoing packet queue
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let clients = Arc::clone(&self.clients);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => match packet.encode() {
                        Ok(data) => {
                            if let Err(e) = socket.send_to(&data, addr).await {
                                error!("Failed to send packet to {}: {}", addr, e);
                            }
                        }
                        Err(e) => error!("Failed to serialize packet: {}", e),
                    },
                    GameMessage::BroadcastPacket { packet, exclude } => {
                        let data = match packet.encode() {
                            Ok(data) => data,
                            Err(e) => {
                                error!("Failed to serialize broadcast: {}", e);
                                continue;
                            }
                        };

                        let client_addrs = {
                            let clients_guard = clients.read().await;
                            clients_guard.get_client_addrs()
                        };

                        for (client_id, addr) in client_addrs {
                            if Some(client_id) == exclude {
                                continue;
                            }

                            if let Err(e) = socket.send_to(&data, addr).await {
                                error!("Failed to send to client {}: {}", client_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns task that monitors client timeouts
    fn spawn_timeout_checker(&self) {
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();
        let timeout = self.config.client_timeout;

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut clients_guard = clients.write().await;
                    clients_guard.check_timeouts(timeout)
                };

                for client in timed_out {
                    let message = ServerMessage::ClientTimeout {
                        client_id: client.id,
                        name: client.name,
                    };
                    if let Err(e) = server_tx.send(message) {
                        error!("Failed to send timeout message: {}", e);
                        return;
                    }
                }
            }
        });
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    fn broadcast_packet(&self, packet: Packet, exclude: Option<u32>) {
        if let Err(e) = self
            .game_tx
            .send(GameMessage::BroadcastPacket { packet, exclude })
        {
            error!("Failed to queue broadcast packet: {}", e);
        }
    }

    fn reject(&self, reason: &str, addr: SocketAddr) {
        warn!("Rejecting join from {}: {}", addr, reason);
        self.send_packet(
            Packet::Rejected {
                reason: reason.to_string(),
            },
            addr,
        );
    }

    /// Reduces an event into the world and echoes it to every viewer
    ///
    /// Returns false, after logging, when the reducer refused the event.
    fn process_event(&mut self, event: Event, exclude: Option<u32>) -> bool {
        match self.game_state.apply(&event) {
            Ok(()) => {
                self.sequence += 1;
                let packet = Packet::Event {
                    sequence: self.sequence,
                    event,
                };
                self.broadcast_packet(packet, exclude);
                true
            }
            Err(e) => {
                warn!("Rejected {} event: {}", event.kind(), e);
                false
            }
        }
    }

    /// Processes incoming packets and updates game state
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        let known = {
            let mut clients = self.clients.write().await;
            clients.touch(addr)
        };

        match packet {
            Packet::Join {
                name,
                client_version,
            } => {
                if known {
                    debug!("Ignoring repeated join from {}", addr);
                    return;
                }
                self.handle_join(name, client_version, addr).await;
            }

            Packet::SetTarget { x, y } => {
                if !(x.is_finite() && y.is_finite()) {
                    warn!("Dropping non-finite target ({}, {}) from {}", x, y, addr);
                    return;
                }
                self.handle_action(addr, |name| Event::SetTarget { name, x, y })
                    .await;
            }

            Packet::SendChat { message } => {
                let message = message.trim().to_string();
                if message.is_empty() || message.chars().count() > MAX_CHAT_LEN {
                    warn!("Dropping chat of {} chars from {}", message.len(), addr);
                    return;
                }
                self.handle_action(addr, |name| Event::SendChat { name, message })
                    .await;
            }

            Packet::SetGesture { gesture } => {
                self.handle_action(addr, |name| Event::SetGesture { name, gesture })
                    .await;
            }

            Packet::Heartbeat => {
                if !known {
                    debug!("Heartbeat from unknown client at {}", addr);
                }
            }

            Packet::Leave => self.handle_leave(addr).await,

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    async fn handle_join(&mut self, requested: String, client_version: u32, addr: SocketAddr) {
        info!(
            "Client connecting from {} as {:?} (version: {})",
            addr, requested, client_version
        );

        if client_version != CLIENT_VERSION {
            self.reject("Protocol version mismatch", addr);
            return;
        }

        let name = match sanitize_name(&requested) {
            Some(name) => disambiguate_name(&name, self.game_state.world()),
            None => {
                self.reject("Invalid name", addr);
                return;
            }
        };

        let client_id = {
            let mut clients = self.clients.write().await;
            clients.add_client(addr, name.clone())
        };
        let client_id = match client_id {
            Some(id) => id,
            None => {
                self.reject("Server full", addr);
                return;
            }
        };

        let event = Event::Join { name: name.clone() };
        if !self.process_event(event, Some(client_id)) {
            let mut clients = self.clients.write().await;
            clients.remove_client(&client_id);
            self.send_packet(
                Packet::Rejected {
                    reason: "Name already taken".to_string(),
                },
                addr,
            );
            return;
        }

        self.send_packet(Packet::Joined { name }, addr);
        self.send_packet(
            Packet::Event {
                sequence: self.sequence,
                event: self.game_state.sync_event(),
            },
            addr,
        );
    }

    /// Turns a participant action into an event for the session at `addr`
    async fn handle_action<F>(&mut self, addr: SocketAddr, make_event: F)
    where
        F: FnOnce(String) -> Event,
    {
        let name = {
            let clients = self.clients.read().await;
            clients.name_of(addr).map(str::to_string)
        };

        match name {
            Some(name) => {
                self.process_event(make_event(name), None);
            }
            None => warn!("Dropping action from unknown client at {}", addr),
        }
    }

    async fn handle_leave(&mut self, addr: SocketAddr) {
        let client = {
            let mut clients = self.clients.write().await;
            clients
                .find_client_by_addr(addr)
                .and_then(|id| clients.remove_client(&id))
        };

        if let Some(client) = client {
            self.process_event(Event::Leave { name: client.name }, None);
        }
    }

    /// Sends the full snapshot to every viewer
    async fn broadcast_sync(&mut self) {
        let client_count = {
            let clients = self.clients.read().await;
            clients.len()
        };

        if client_count == 0 {
            return;
        }

        let packet = Packet::Event {
            sequence: self.sequence,
            event: self.game_state.sync_event(),
        };
        self.broadcast_packet(packet, None);
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), ServerError> {
        // Initialize concurrent tasks
        self.spawn_network_receiver();
        self.spawn_network_sender();
        self.spawn_timeout_checker();

        let mut tick_interval = interval(self.config.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_tick = Instant::now();
        let sync_interval = self.config.sync_interval.max(1);

        info!(
            "Server started successfully ({:.0}Hz, sync every {} ticks)",
            self.config.tick_rate(),
            sync_interval
        );

        loop {
            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::ClientTimeout { client_id, name }) => {
                            warn!("Client {} ({}) timed out", client_id, name);
                            self.process_event(Event::Leave { name }, None);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Handle server tick events
                _ = tick_interval.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick).as_secs_f32();
                    last_tick = now;

                    self.game_state.update(dt);

                    if self.game_state.tick % sync_interval == 0 {
                        self.broadcast_sync().await;
                    }

                    // Periodic performance monitoring
                    if self.game_state.tick % 300 == 0 {
                        let client_count = {
                            let clients = self.clients.read().await;
                            clients.len()
                        };

                        if client_count > 0 {
                            debug!("Tick {}: {} clients, {} players, {:.1}Hz, {} events",
                                   self.game_state.tick, client_count,
                                   self.game_state.world().len(), 1.0 / dt, self.sequence);
                        }
                    }
                },
            }
        }

        Ok(())
    }
}
