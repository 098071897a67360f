use crate::state::{SubscriberId, WorldEngine};
use crate::subscription::protocol::decode_world;
use anyhow::Context;
use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use std::sync::Arc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

/// Manages a single WebSocket connection.
///
/// Ingress (read frame → apply to world) runs in its own task; egress
/// (wait on own queue → write frame) runs in the calling task. Whichever
/// side ends first tears the connection down, and the subscriber is
/// unregistered exactly once on every exit path.
pub struct ConnectionManager {
    engine: Arc<WorldEngine>,
}

/// Tears a connection down when the session ends or is cancelled:
/// stops the ingress task and unregisters the subscriber.
struct ConnectionGuard {
    engine: Arc<WorldEngine>,
    id: SubscriberId,
    ingress: AbortHandle,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.ingress.abort();
        self.engine.unregister(&self.id);
        info!(subscriber_id = %self.id, "WebSocket connection closed");
    }
}

impl ConnectionManager {
    pub fn new(engine: Arc<WorldEngine>) -> Self {
        Self { engine }
    }

    /// Handle WebSocket connection lifecycle
    pub async fn handle(self, socket: WebSocket) {
        let (sender, receiver) = socket.split();
        self.run(sender, receiver).await;
    }

    /// Drive a connection given its outbound sink and inbound stream
    pub async fn run<Tx, Rx, E>(self, mut sender: Tx, receiver: Rx)
    where
        Tx: Sink<Message> + Unpin,
        Tx::Error: Display,
        Rx: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        // Registers and replays the current world before any frame is read
        let mut subscription = self.engine.subscribe();
        let id = subscription.id();
        info!(subscriber_id = %id, "WebSocket connection established");

        let mut ingress = tokio::spawn(read_loop(receiver, Arc::clone(&self.engine), id));
        let _guard = ConnectionGuard {
            engine: Arc::clone(&self.engine),
            id,
            ingress: ingress.abort_handle(),
        };

        loop {
            tokio::select! {
                payload = self.engine.dequeue_blocking(&mut subscription) => {
                    match payload {
                        Some(payload) => {
                            if let Err(e) = sender.send(Message::Text(payload)).await {
                                error!(subscriber_id = %id, error = %e, "Failed to send notification");
                                break;
                            }
                        }
                        None => {
                            warn!(subscriber_id = %id, "Subscriber queue closed");
                            break;
                        }
                    }
                }

                _ = &mut ingress => {
                    break;
                }
            }
        }
    }
}

/// Read inbound frames and apply them to the world until the peer goes away
async fn read_loop<Rx, E>(mut receiver: Rx, engine: Arc<WorldEngine>, id: SubscriberId)
where
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match handle_client_message(&engine, &text) {
                Ok(applied) => {
                    debug!(subscriber_id = %id, notifications = applied, "Applied world update");
                }
                Err(e) => {
                    // A bad message never terminates the connection
                    warn!(subscriber_id = %id, error = %e, "Dropping malformed message");
                }
            },
            Ok(Message::Close(_)) => {
                info!(subscriber_id = %id, "WebSocket client disconnected");
                break;
            }
            Ok(_) => {
                // Ignore binary, ping, pong messages
            }
            Err(e) => {
                warn!(subscriber_id = %id, error = %e, "WebSocket error");
                break;
            }
        }
    }
}

/// Decode a world update and apply it; returns the number of notifications produced
fn handle_client_message(engine: &WorldEngine, text: &str) -> anyhow::Result<usize> {
    let update = decode_world(text.as_bytes()).context("malformed world update")?;
    let notifications = engine.apply_world_update(update);
    Ok(notifications.len())
}
