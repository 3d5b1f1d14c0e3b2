//! Realtime event client.
//!
//! One long-lived websocket connection per authenticated restaurant,
//! established after login once both user and restaurant identity are known
//! and torn down on logout. On connect the portal registers itself with
//! `register_admin`; incoming order-lifecycle events become notifications
//! on the order board, which re-fetches authoritative state rather than
//! patching anything locally.

mod events;

pub use events::{AdminEvent, EmitEvent};

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;

use pappi_core::RestaurantId;

/// Delay before reconnecting after a dropped connection.
const RECONNECT_DELAY_SECS: u64 = 5;

/// Cap on queued notifications per restaurant.
const MAX_NOTIFICATIONS: usize = 50;

/// Errors from the realtime channel.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// No live connection for this restaurant.
    #[error("no realtime connection for restaurant {0}")]
    NotConnected(RestaurantId),

    /// The connection task is gone and the frame could not be queued.
    #[error("realtime send failed: {0}")]
    Send(String),
}

/// A queued notification for the order board.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Handle to one restaurant's connection.
struct Connection {
    outgoing: UnboundedSender<String>,
    notifications: Arc<Mutex<VecDeque<Notification>>>,
    task: JoinHandle<()>,
}

/// Manages realtime connections for all logged-in restaurants.
///
/// Cheaply cloneable; the connection registry is shared.
#[derive(Clone)]
pub struct RealtimeManager {
    socket_url: String,
    connections: Arc<Mutex<HashMap<RestaurantId, Connection>>>,
}

impl RealtimeManager {
    /// Create a manager pointing at the realtime server.
    #[must_use]
    pub fn new(socket_url: String) -> Self {
        Self {
            socket_url,
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Ensure a connection exists for a restaurant.
    ///
    /// Idempotent: a second login for the same restaurant reuses the live
    /// connection.
    pub fn connect(&self, restaurant_id: RestaurantId) {
        let mut connections = match self.connections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(existing) = connections.get(&restaurant_id) {
            if !existing.task.is_finished() {
                return;
            }
        }

        let (outgoing_tx, outgoing_rx) = unbounded_channel();
        let notifications = Arc::new(Mutex::new(VecDeque::new()));

        let task = tokio::spawn(run_connection(
            self.socket_url.clone(),
            restaurant_id,
            outgoing_rx,
            Arc::clone(&notifications),
        ));

        connections.insert(
            restaurant_id,
            Connection {
                outgoing: outgoing_tx,
                notifications,
                task,
            },
        );

        tracing::info!(%restaurant_id, "realtime connection spawned");
    }

    /// Tear down the connection for a restaurant (logout).
    pub fn disconnect(&self, restaurant_id: RestaurantId) {
        let mut connections = match self.connections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(connection) = connections.remove(&restaurant_id) {
            connection.task.abort();
            tracing::info!(%restaurant_id, "realtime connection closed");
        }
    }

    /// Emit an event on a restaurant's connection.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection exists or the frame cannot be
    /// queued. Callers treat this as non-fatal: the REST mutation already
    /// happened and the board re-fetches regardless.
    pub fn emit(&self, restaurant_id: RestaurantId, event: &EmitEvent) -> Result<(), RealtimeError> {
        let connections = match self.connections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let connection = connections
            .get(&restaurant_id)
            .ok_or(RealtimeError::NotConnected(restaurant_id))?;

        connection
            .outgoing
            .send(event.to_frame())
            .map_err(|e| RealtimeError::Send(e.to_string()))
    }

    /// Drain the queued notifications for a restaurant (oldest first).
    #[must_use]
    pub fn drain_notifications(&self, restaurant_id: RestaurantId) -> Vec<Notification> {
        let connections = match self.connections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        connections.get(&restaurant_id).map_or_else(Vec::new, |c| {
            let mut queue = match c.notifications.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            queue.drain(..).collect()
        })
    }
}

/// Connection loop for one restaurant.
///
/// Connects, registers, then pumps frames both ways until the socket drops;
/// reconnects after a fixed delay. Aborted by `disconnect`.
async fn run_connection(
    socket_url: String,
    restaurant_id: RestaurantId,
    mut outgoing: UnboundedReceiver<String>,
    notifications: Arc<Mutex<VecDeque<Notification>>>,
) {
    loop {
        match connect_async(&socket_url).await {
            Ok((ws, _)) => {
                tracing::info!(%restaurant_id, "realtime connected");
                let (mut write, mut read) = ws.split();

                // Identify this connection as the restaurant's admin
                let register = EmitEvent::RegisterAdmin { restaurant_id }.to_frame();
                if let Err(e) = write.send(Message::Text(register.into())).await {
                    tracing::warn!(%restaurant_id, error = %e, "realtime register failed");
                }

                loop {
                    tokio::select! {
                        frame = outgoing.recv() => {
                            let Some(frame) = frame else {
                                // Manager dropped the sender: shut down.
                                return;
                            };
                            if let Err(e) = write.send(Message::Text(frame.into())).await {
                                tracing::warn!(%restaurant_id, error = %e, "realtime emit failed");
                                break;
                            }
                        }
                        msg = read.next() => {
                            let Some(Ok(msg)) = msg else {
                                break;
                            };
                            if !msg.is_text() {
                                continue;
                            }
                            let text = msg.into_text().unwrap_or_default();
                            if let Some(event) = AdminEvent::parse(&text) {
                                tracing::debug!(%restaurant_id, ?event, "realtime event");
                                push_notification(&notifications, &event);
                            }
                        }
                    }
                }

                tracing::warn!(%restaurant_id, "realtime connection lost, reconnecting");
            }
            Err(e) => {
                tracing::warn!(%restaurant_id, error = %e, "realtime connect failed");
            }
        }

        tokio::time::sleep(std::time::Duration::from_secs(RECONNECT_DELAY_SECS)).await;
    }
}

/// Queue a notification, dropping the oldest past the cap.
fn push_notification(queue: &Arc<Mutex<VecDeque<Notification>>>, event: &AdminEvent) {
    let mut queue = match queue.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    if queue.len() >= MAX_NOTIFICATIONS {
        queue.pop_front();
    }
    queue.push_back(Notification {
        message: event.notification_text(),
        at: Utc::now(),
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_push_notification_caps_queue() {
        let queue = Arc::new(Mutex::new(VecDeque::new()));
        for _ in 0..(MAX_NOTIFICATIONS + 10) {
            push_notification(&queue, &AdminEvent::NewOrder { total_price: None });
        }
        assert_eq!(queue.lock().unwrap().len(), MAX_NOTIFICATIONS);
    }

    #[tokio::test]
    async fn test_emit_without_connection_errors() {
        let manager = RealtimeManager::new("ws://127.0.0.1:1/ws".to_string());
        let result = manager.emit(
            RestaurantId::new(1),
            &EmitEvent::MarkReady {
                order_id: pappi_core::OrderId::new(1),
            },
        );
        assert!(matches!(result, Err(RealtimeError::NotConnected(_))));
    }

    #[tokio::test]
    async fn test_drain_notifications_empty_without_connection() {
        let manager = RealtimeManager::new("ws://127.0.0.1:1/ws".to_string());
        assert!(manager.drain_notifications(RestaurantId::new(1)).is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let manager = RealtimeManager::new("ws://127.0.0.1:1/ws".to_string());
        manager.connect(RestaurantId::new(2));
        manager.disconnect(RestaurantId::new(2));
        manager.disconnect(RestaurantId::new(2));
    }
}
