//! Configuration for the hub and the websocket server.

use std::net::{IpAddr, Ipv4Addr};

use crate::error::ConfigError;

/// Configuration for a [`BroadcastHub`](crate::BroadcastHub).
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Messages that may wait for a single subscriber before it is considered
    /// too slow and evicted. Zero is treated as 1.
    /// Default: 256
    pub outbox_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbox_capacity: 256,
        }
    }
}

impl HubConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outbox_capacity(mut self, capacity: usize) -> Self {
        self.outbox_capacity = capacity;
        self
    }
}

/// Configuration for a [`BroadcastServer`](crate::BroadcastServer).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    /// Default: 127.0.0.1
    pub bind_address: IpAddr,

    /// Inclusive range of ports to try, first free one wins
    /// Default: (16899, 16899)
    pub port_range: (u16, u16),

    /// Reject new connections with 503 once this many subscribers are connected
    /// Default: unlimited
    pub max_subscribers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port_range: (16899, 16899),
            max_subscribers: None,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen on all interfaces instead of loopback only
    pub fn public() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            ..Default::default()
        }
    }

    pub fn with_bind_address(mut self, address: IpAddr) -> Self {
        self.bind_address = address;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port_range = (port, port);
        self
    }

    pub fn with_port_range(mut self, start: u16, end: u16) -> Self {
        self.port_range = (start, end);
        self
    }

    pub fn with_max_subscribers(mut self, max: usize) -> Self {
        self.max_subscribers = Some(max);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (start, end) = self.port_range;
        if start > end {
            return Err(ConfigError::InvalidPortRange { start, end });
        }

        if self.max_subscribers == Some(0) {
            return Err(ConfigError::Zero("Max subscribers"));
        }

        Ok(())
    }
}
