use crate::event::Event;
use crate::player::Gesture;
use serde::{Deserialize, Serialize};

/// Datagram exchanged between the host and its viewers, bincode encoded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    // Client -> host
    Join {
        name: String,
        client_version: u32,
    },
    SetTarget {
        x: f32,
        y: f32,
    },
    SendChat {
        message: String,
    },
    SetGesture {
        gesture: Gesture,
    },
    Heartbeat,
    Leave,

    // Host -> client
    /// The join was accepted under `name`, which may carry a suffix.
    Joined {
        name: String,
    },
    Rejected {
        reason: String,
    },
    /// An accepted event, echoed to every viewer. `sequence` grows by one
    /// for each event the host accepts.
    Event {
        sequence: u64,
        event: Event,
    },
}

impl Packet {
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
