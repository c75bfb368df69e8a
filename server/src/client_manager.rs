//! Session management for connected viewers
//!
//! This module handles the host-side bookkeeping of who is connected:
//! - Session lifecycle (join, explicit leave, timeout)
//! - Mapping from socket address to the participant name a session plays as
//! - Capacity limits and liveness tracking
//! - The join-name policy (sanitising and de-duplicating requested names)
//!
//! Sessions never touch the world state directly; the network loop turns
//! session changes into Join and Leave events.

use log::info;
use shared::{WorldState, MAX_NAME_LEN, MAX_PLAYERS};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// A connected viewer and the participant it controls
#[derive(Debug)]
pub struct Client {
    /// Unique session identifier assigned by the server
    pub id: u32,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Participant name after suffix resolution
    pub name: String,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr, name: String) -> Self {
        Self {
            id,
            addr,
            name,
            last_seen: Instant::now(),
        }
    }

    /// Marks the session as alive
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Checks if the client has exceeded the connection timeout
    ///
    /// Returns true if no packets have been received from this client
    /// within the specified timeout duration, indicating a likely disconnect.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Manages all connected sessions
///
/// Enforces the server capacity and keeps one session per socket address.
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<u32, Client>,
    /// Next available client ID for new connections
    next_client_id: u32,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
}

impl ClientManager {
    /// Creates a new client manager with the specified capacity limit
    ///
    /// Client IDs start from 1 and increment for each new connection.
    /// Capacity never exceeds `MAX_PLAYERS`, so a full snapshot always fits
    /// in one datagram.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients: max_clients.min(MAX_PLAYERS),
        }
    }

    /// Registers a session playing as `name`
    ///
    /// Returns Some(client_id) if successful, None if server is at capacity.
    pub fn add_client(&mut self, addr: SocketAddr, name: String) -> Option<u32> {
        if self.is_full() {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {} as {}", client_id, addr, name);
        self.clients
            .insert(client_id, Client::new(client_id, addr, name));

        Some(client_id)
    }

    /// Removes a session and returns it, if it was still connected
    pub fn remove_client(&mut self, client_id: &u32) -> Option<Client> {
        let client = self.clients.remove(client_id)?;
        info!("Client {} ({}) disconnected", client.id, client.name);
        Some(client)
    }

    /// Finds a client ID by their network address
    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.clients
            .iter()
            .find(|(_, client)| client.addr == addr)
            .map(|(id, _)| *id)
    }

    /// Participant name of the session at `addr`
    pub fn name_of(&self, addr: SocketAddr) -> Option<&str> {
        self.clients
            .values()
            .find(|client| client.addr == addr)
            .map(|client| client.name.as_str())
    }

    /// Refreshes liveness for the session at `addr`
    ///
    /// Returns false if nobody is connected from that address.
    pub fn touch(&mut self, addr: SocketAddr) -> bool {
        match self.clients.values_mut().find(|client| client.addr == addr) {
            Some(client) => {
                client.touch();
                true
            }
            None => false,
        }
    }

    /// Checks for and removes timed-out clients
    ///
    /// Returns the removed sessions so the caller can synthesise a Leave
    /// event for each of them.
    pub fn check_timeouts(&mut self, timeout: Duration) -> Vec<Client> {
        let timed_out: Vec<u32> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        timed_out
            .iter()
            .filter_map(|client_id| self.remove_client(client_id))
            .collect()
    }

    /// Gets all client IDs and their network addresses
    pub fn get_client_addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.addr))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.clients.len() >= self.max_clients
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Cleans up a requested participant name
///
/// Trims surrounding whitespace and truncates to `MAX_NAME_LEN` characters.
/// Returns None when nothing usable is left, which rejects the join.
pub fn sanitize_name(requested: &str) -> Option<String> {
    let name: String = requested.trim().chars().take(MAX_NAME_LEN).collect();
    let name = name.trim_end().to_string();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Picks the name a new participant joins under
///
/// The bare name is used when free; otherwise " 2", " 3", ... is appended
/// until the result is not taken in `state`.
pub fn disambiguate_name(name: &str, state: &WorldState) -> String {
    if !state.contains(name) {
        return name.to_string();
    }

    (2u32..)
        .map(|suffix| format!("{} {}", name, suffix))
        .find(|candidate| !state.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{reduce, Event};
    use std::time::Duration;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn test_addr2() -> SocketAddr {
        "127.0.0.1:8081".parse().unwrap()
    }

    fn state_with(names: &[&str]) -> WorldState {
        names.iter().fold(WorldState::new(), |state, name| {
            reduce(
                &state,
                &Event::Join {
                    name: name.to_string(),
                },
            )
            .unwrap()
        })
    }

    #[test]
    fn test_client_creation() {
        let addr = test_addr();
        let client = Client::new(1, addr, "Kai".to_string());

        assert_eq!(client.id, 1);
        assert_eq!(client.addr, addr);
        assert_eq!(client.name, "Kai");
        assert!(!client.is_timed_out(Duration::from_secs(5)));
    }

    #[test]
    fn test_client_timeout() {
        let mut client = Client::new(1, test_addr(), "Kai".to_string());

        std::thread::sleep(Duration::from_millis(20));
        assert!(client.is_timed_out(Duration::from_millis(10)));

        client.touch();
        assert!(!client.is_timed_out(Duration::from_millis(10)));
    }

    #[test]
    fn test_add_client_until_full() {
        let mut manager = ClientManager::new(1);

        let first = manager.add_client(test_addr(), "Kai".to_string());
        assert_eq!(first, Some(1));
        assert!(manager.is_full());

        let second = manager.add_client(test_addr2(), "Amy".to_string());
        assert_eq!(second, None);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_capacity_capped_at_max_players() {
        let mut manager = ClientManager::new(MAX_PLAYERS * 4);
        for port in 0..MAX_PLAYERS as u16 {
            let addr = SocketAddr::from(([127, 0, 0, 1], 10_000 + port));
            assert!(manager.add_client(addr, format!("Koala {}", port)).is_some());
        }

        assert!(manager.is_full());
        assert_eq!(manager.add_client(test_addr(), "Late".to_string()), None);
    }

    #[test]
    fn test_remove_client_returns_session() {
        let mut manager = ClientManager::new(2);
        let client_id = manager
            .add_client(test_addr(), "Kai".to_string())
            .unwrap();

        let removed = manager.remove_client(&client_id).unwrap();
        assert_eq!(removed.name, "Kai");
        assert!(manager.is_empty());

        assert!(manager.remove_client(&client_id).is_none());
    }

    #[test]
    fn test_find_client_by_addr() {
        let mut manager = ClientManager::new(2);
        let client_id1 = manager
            .add_client(test_addr(), "Kai".to_string())
            .unwrap();
        manager.add_client(test_addr2(), "Amy".to_string()).unwrap();

        assert_eq!(manager.find_client_by_addr(test_addr()), Some(client_id1));
        assert_eq!(manager.name_of(test_addr2()), Some("Amy"));

        let unknown_addr: SocketAddr = "192.168.1.1:9999".parse().unwrap();
        assert_eq!(manager.find_client_by_addr(unknown_addr), None);
        assert_eq!(manager.name_of(unknown_addr), None);
        assert!(!manager.touch(unknown_addr));
        assert!(manager.touch(test_addr()));
    }

    #[test]
    fn test_check_timeouts_removes_idle_sessions() {
        let mut manager = ClientManager::new(2);
        manager.add_client(test_addr(), "Kai".to_string()).unwrap();

        assert!(manager.check_timeouts(Duration::from_secs(5)).is_empty());

        std::thread::sleep(Duration::from_millis(20));
        manager.add_client(test_addr2(), "Amy".to_string()).unwrap();

        let removed = manager.check_timeouts(Duration::from_millis(10));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name, "Kai");
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.name_of(test_addr2()), Some("Amy"));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("  Kai  "), Some("Kai".to_string()));
        assert_eq!(sanitize_name(""), None);
        assert_eq!(sanitize_name("   "), None);

        let long = "x".repeat(MAX_NAME_LEN + 10);
        assert_eq!(sanitize_name(&long).unwrap().chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_disambiguate_tries_bare_name_first() {
        let state = state_with(&["Amy"]);
        assert_eq!(disambiguate_name("Kai", &state), "Kai");
        assert_eq!(disambiguate_name("Amy", &state), "Amy 2");
    }

    #[test]
    fn test_disambiguate_skips_taken_suffixes() {
        let state = state_with(&["Amy", "Amy 2", "Amy 3"]);
        assert_eq!(disambiguate_name("Amy", &state), "Amy 4");

        let state = state_with(&["Amy", "Amy 3"]);
        assert_eq!(disambiguate_name("Amy", &state), "Amy 2");
    }
}
