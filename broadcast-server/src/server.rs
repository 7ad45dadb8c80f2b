//! Websocket server that attaches connections to a broadcast hub.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr, TcpListener};
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use warp::ws::{Ws, WebSocket};
use warp::Filter;

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::hub::BroadcastHub;
use crate::subscriber::Subscriber;
use crate::ws::WsSubscriber;

/// Websocket server publishing a hub's events to every connected client.
///
/// Each accepted connection joins the hub as a [`WsSubscriber`] and leaves it
/// when the client disconnects. Messages sent by clients are ignored.
///
/// # Example
///
/// ```no_run
/// use broadcast_server::{BroadcastHub, BroadcastServer, HubConfig, ServerConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let hub = BroadcastHub::new(HubConfig::default());
///     let server = BroadcastServer::start(ServerConfig::default(), hub.clone())
///         .await
///         .expect("Failed to start broadcast server");
///
///     println!("Listening at {}", server.url());
///     hub.publish(&serde_json::json!({"event_type": "mouse_moved", "x": 1, "y": 2}))
///         .unwrap();
///
///     server.shutdown().await;
/// }
/// ```
pub struct BroadcastServer {
    local_addr: SocketAddr,
    hub: BroadcastHub,
    shutdown_tx: Option<mpsc::Sender<()>>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl BroadcastServer {
    /// Bind the first free port in the configured range and start serving.
    pub async fn start(config: ServerConfig, hub: BroadcastHub) -> Result<Self> {
        config.validate()?;

        let (start, end) = config.port_range;
        let port = Self::find_available_port(config.bind_address, start, end)
            .ok_or(ServerError::NoAvailablePort { start, end })?;
        let addr = SocketAddr::new(config.bind_address, port);

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let (local_addr, server) = warp::serve(routes(hub.clone(), config.max_subscribers))
            .try_bind_with_graceful_shutdown(addr, async move {
                shutdown_rx.recv().await;
            })
            .map_err(|e| ServerError::Bind {
                addr,
                reason: e.to_string(),
            })?;

        let server_handle = tokio::spawn(server);
        info!("Broadcast server listening on ws://{}", local_addr);

        Ok(Self {
            local_addr,
            hub,
            shutdown_tx: Some(shutdown_tx),
            server_handle: Some(server_handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// The websocket URL clients connect to.
    pub fn url(&self) -> String {
        format!("ws://{}", self.local_addr)
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Stop accepting connections and disconnect every subscriber.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }

        self.hub.close_all();

        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }

        info!("Broadcast server on {} stopped", self.local_addr);
    }

    fn find_available_port(address: IpAddr, start: u16, end: u16) -> Option<u16> {
        (start..=end).find(|&port| Self::is_port_available(address, port))
    }

    fn is_port_available(address: IpAddr, port: u16) -> bool {
        TcpListener::bind(SocketAddr::new(address, port)).is_ok()
    }
}

/// The websocket route: upgrade, join the hub, stream until disconnect.
///
/// When `max_subscribers` is set the limit is checked at upgrade time and
/// excess connections are refused with 503.
pub fn routes(
    hub: BroadcastHub,
    max_subscribers: Option<usize>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    let with_hub = warp::any().map(move || hub.clone());

    warp::ws()
        .and(with_hub)
        .and(warp::addr::remote())
        .and_then(
            move |ws: Ws, hub: BroadcastHub, remote: Option<SocketAddr>| async move {
                if let Some(max) = max_subscribers {
                    if hub.len() >= max {
                        warn!(
                            "Refusing connection from {}: {} subscribers connected",
                            display_remote(remote),
                            max
                        );
                        return Err(warp::reject::custom(SubscriberLimitReached));
                    }
                }
                if hub.is_closed() {
                    return Err(warp::reject::custom(HubShutDown));
                }

                Ok(ws.on_upgrade(move |socket| serve_connection(socket, hub, remote)))
            },
        )
        .recover(handle_rejection)
}

async fn serve_connection(socket: WebSocket, hub: BroadcastHub, remote: Option<SocketAddr>) {
    let peer = display_remote(remote);
    let (sink, mut incoming) = socket.split();
    let subscriber = Arc::new(WsSubscriber::new(sink));

    let id = match hub.join(subscriber.clone()) {
        Ok(id) => id,
        Err(e) => {
            debug!("Dropping connection from {}: {}", peer, e);
            subscriber.finish().await;
            return;
        }
    };
    info!(subscriber = %id, "Client {} connected ({} total)", peer, hub.len());

    loop {
        tokio::select! {
            _ = subscriber.closed() => break,
            frame = incoming.next() => match frame {
                Some(Ok(message)) if message.is_close() => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(subscriber = %id, "Websocket error: {}", e);
                    break;
                }
                None => break,
            },
        }
    }

    hub.leave(id);
    subscriber.finish().await;
    info!(subscriber = %id, "Client {} disconnected ({} total)", peer, hub.len());
}

fn display_remote(remote: Option<SocketAddr>) -> String {
    remote
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown peer".to_string())
}

#[derive(Debug)]
struct SubscriberLimitReached;

impl warp::reject::Reject for SubscriberLimitReached {}

#[derive(Debug)]
struct HubShutDown;

impl warp::reject::Reject for HubShutDown {}

/// Handle rejections and convert them to HTTP responses.
async fn handle_rejection(err: warp::Rejection) -> std::result::Result<impl warp::Reply, Infallible> {
    let code;
    let message;

    if err.find::<SubscriberLimitReached>().is_some() {
        code = warp::http::StatusCode::SERVICE_UNAVAILABLE;
        message = "Subscriber limit reached";
    } else if err.find::<HubShutDown>().is_some() {
        code = warp::http::StatusCode::SERVICE_UNAVAILABLE;
        message = "Shutting down";
    } else if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not found";
    } else {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = "Expected a websocket upgrade";
    }

    Ok(warp::reply::with_status(message, code))
}
