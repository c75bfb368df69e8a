//! # Koala Town Host
//!
//! This library provides the authoritative host for the shared town. It keeps
//! the canonical [`shared::WorldState`], applies every participant action to
//! it through [`shared::reduce`], advances it with [`shared::advance`] on a
//! fixed tick, and relays the results to all connected viewers.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative State
//! The host holds the only world state that counts. Viewers keep a local
//! copy for smooth drawing, but whenever they disagree the host's snapshot
//! wins.
//!
//! ### Session Management
//! Handles the lifecycle of viewer sessions:
//! - Join requests, including name clean-up and duplicate-name suffixes
//! - Mapping each socket address to the participant it controls
//! - Explicit leaves and liveness timeouts, both of which become Leave events
//!
//! ### Event Relay
//! Every event the reducer accepts is echoed verbatim to all viewers with an
//! increasing sequence number. A full snapshot is also sent to each new
//! viewer and periodically to everyone, which repairs any datagram that went
//! missing.
//!
//! ## Architecture Design
//!
//! ### Single State Owner
//! The world state lives inside [`network::Server`] and is only touched from
//! its main loop. Network tasks talk to that loop through channels, so events
//! are reduced strictly one at a time, each against the previous result.
//!
//! ### UDP-Based Communication
//! Packets are bincode-encoded [`shared::Packet`] datagrams. Loss and
//! reordering are tolerated through sequence numbers and periodic
//! snapshots rather than retransmission.
//!
//! ## Module Organization
//!
//! - `client_manager`: sessions, capacity, timeouts and the join-name policy
//! - `config`: runtime settings
//! - `game`: the authoritative world and its tick counter
//! - `network`: sockets, background tasks and the main loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let mut server = Server::new(ServerConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod game;
pub mod network;
