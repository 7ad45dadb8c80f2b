//! Websocket fan-out for inputcast event streams.
//!
//! This crate delivers serialized events to any number of connected clients
//! without letting a slow or dead client hold up the producer. It knows
//! nothing about input devices: anything that implements `serde::Serialize`
//! can be published.
//!
//! # Overview
//!
//! - [`BroadcastHub`]: the subscriber set. [`BroadcastHub::publish`] serializes
//!   an event once and queues it on every subscriber's bounded outbox without
//!   waiting. Subscribers that fall behind, disconnect, or fail a delivery are
//!   evicted.
//! - [`Subscriber`]: the delivery contract. [`WsSubscriber`] writes websocket
//!   text frames; [`ChannelSubscriber`] forwards into a tokio channel for
//!   in-process consumers.
//! - [`BroadcastServer`]: a warp server that upgrades incoming connections,
//!   joins them to the hub and removes them again on disconnect.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use broadcast_server::{BroadcastHub, ChannelSubscriber, HubConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let hub = BroadcastHub::new(HubConfig::default());
//!
//!     let (subscriber, mut rx) = ChannelSubscriber::new(16);
//!     hub.join(Arc::new(subscriber)).unwrap();
//!
//!     hub.publish(&serde_json::json!({"event_type": "key_pressed", "keycode": 30}))
//!         .unwrap();
//!
//!     if let Some(message) = rx.recv().await {
//!         println!("{message}");
//!     }
//! }
//! ```

mod config;
mod error;
mod hub;
mod server;
mod subscriber;
mod ws;

pub use config::{HubConfig, ServerConfig};
pub use error::{ConfigError, DeliveryError, HubError, Result, ServerError};
pub use hub::{BroadcastHub, EvictionReason, HubStats};
pub use server::{routes, BroadcastServer};
pub use subscriber::{ChannelSubscriber, Subscriber, SubscriberId};
pub use ws::WsSubscriber;
