//! Websocket transport for subscribers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::SinkExt;
use tokio::sync::{watch, Mutex};
use warp::ws::{Message, WebSocket};

use crate::error::DeliveryError;
use crate::subscriber::Subscriber;

const CLOSE_TIMEOUT: Duration = Duration::from_millis(500);

/// A subscriber backed by the outgoing half of a websocket connection.
///
/// Each event is sent as one text frame. The connection task watches the
/// incoming half and marks the subscriber closed when the peer goes away.
pub struct WsSubscriber {
    sink: Mutex<SplitSink<WebSocket, Message>>,
    closed: watch::Sender<bool>,
}

impl WsSubscriber {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            sink: Mutex::new(sink),
            closed,
        }
    }

    /// Mark the peer as gone. Pending and future sends fail.
    pub fn mark_closed(&self) {
        self.closed.send_replace(true);
    }

    /// Send a close frame and flush, giving up after a short timeout.
    pub async fn finish(&self) {
        self.mark_closed();
        let mut sink = self.sink.lock().await;
        let _ = tokio::time::timeout(CLOSE_TIMEOUT, async {
            let _ = sink.send(Message::close()).await;
            let _ = sink.close().await;
        })
        .await;
    }
}

#[async_trait]
impl Subscriber for WsSubscriber {
    async fn send(&self, message: Arc<str>) -> Result<(), DeliveryError> {
        if self.is_closed() {
            return Err(DeliveryError::Disconnected);
        }

        let mut sink = self.sink.lock().await;
        sink.send(Message::text(message.to_string()))
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    async fn closed(&self) {
        let mut flag = self.closed.subscribe();
        let _ = flag.wait_for(|closed| *closed).await;
    }

    fn close(&self) {
        self.mark_closed();
    }
}
