use std::time::Duration;

/// Runtime settings for the host.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the UDP socket binds to, e.g. `127.0.0.1:8080`.
    pub bind_addr: String,
    /// Time between simulation ticks.
    pub tick_duration: Duration,
    pub max_clients: usize,
    /// A session silent for longer than this is treated as a leave.
    pub client_timeout: Duration,
    /// Ticks between full-snapshot broadcasts.
    pub sync_interval: u64,
}

impl ServerConfig {
    pub fn tick_rate(&self) -> f32 {
        1.0 / self.tick_duration.as_secs_f32()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            tick_duration: Duration::from_millis(33),
            max_clients: 16,
            client_timeout: Duration::from_secs(5),
            sync_interval: 60,
        }
    }
}
