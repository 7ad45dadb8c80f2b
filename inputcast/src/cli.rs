use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use broadcast_server::{HubConfig, ServerConfig};
use clap::Parser;
use input_stream::SessionConfig;

/// inputcast
///
/// Captures keyboard and mouse events from local input devices and
/// broadcasts them as JSON to every connected websocket client.
#[derive(Parser, Debug)]
#[command(name = "inputcast")]
#[command(about = "Broadcast keyboard and mouse input to websocket clients")]
#[command(version)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Websocket port
    #[arg(short, long, default_value = "16899")]
    pub port: u16,

    /// Try ports up to this one if --port is taken
    #[arg(long)]
    pub port_end: Option<u16>,

    /// Refuse connections beyond this many subscribers
    #[arg(long)]
    pub max_subscribers: Option<usize>,

    /// Messages queued per subscriber before it is dropped as too slow
    #[arg(long, default_value = "256")]
    pub outbox_capacity: usize,

    /// Forward key auto-repeat as key_typed events
    #[arg(long)]
    pub forward_repeat: bool,

    /// Capture this device instead of discovering devices (repeatable)
    #[arg(short, long = "device", value_name = "PATH")]
    pub devices: Vec<PathBuf>,

    /// List capturable devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Log level (error, warn, info, debug, trace). Overrides INPUTCAST_LOG_LEVEL
    /// and RUST_LOG; without it those apply, then info
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        if let Some(end) = self.port_end {
            if end < self.port {
                return Err(anyhow!(
                    "Invalid port range: start ({}) > end ({})",
                    self.port,
                    end
                ));
            }
        }

        if self.outbox_capacity == 0 {
            return Err(anyhow!("Outbox capacity must be at least 1"));
        }

        if self.max_subscribers == Some(0) {
            return Err(anyhow!("Max subscribers must be at least 1"));
        }

        if let Some(level) = &self.log_level {
            match level.to_lowercase().as_str() {
                "error" | "warn" | "info" | "debug" | "trace" => {}
                _ => {
                    return Err(anyhow!(
                        "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
                        level
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn server_config(&self) -> ServerConfig {
        let config = ServerConfig::new()
            .with_bind_address(self.host)
            .with_port_range(self.port, self.port_end.unwrap_or(self.port));

        match self.max_subscribers {
            Some(max) => config.with_max_subscribers(max),
            None => config,
        }
    }

    pub fn hub_config(&self) -> HubConfig {
        HubConfig::new().with_outbox_capacity(self.outbox_capacity)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new().with_forward_key_repeat(self.forward_repeat)
    }
}
