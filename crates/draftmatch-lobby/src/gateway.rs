//! Delivery of lobby output to connected viewers.
//!
//! A [`Gateway`] is fire-and-forget: a viewer that is gone or lagging never
//! feeds back into lobby state. The coordinator calls it while still holding
//! the lobby lock, so broadcasts leave in acceptance order.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use draftmatch_types::{Broadcast, ConnectionId, LobbyId, Rejection, constants};
use tokio::sync::{broadcast, mpsc};

/// Outbound delivery used by the coordinator.
pub trait Gateway: Send + Sync {
    /// Deliver to every current viewer of `message.lobby_id`.
    fn broadcast(&self, message: &Broadcast);

    /// Deliver to one connection only.
    fn reply(&self, connection: ConnectionId, rejection: &Rejection);
}

// ---------------------------------------------------------------------------
// ChannelGateway
// ---------------------------------------------------------------------------

/// Gateway backed by tokio channels: one broadcast channel per lobby, one
/// unbounded queue per connection for rejections.
pub struct ChannelGateway {
    lobbies: Mutex<HashMap<LobbyId, broadcast::Sender<Broadcast>>>,
    connections: Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<Rejection>>>,
    capacity: usize,
}

impl ChannelGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(constants::BROADCAST_CHANNEL_CAPACITY)
    }

    /// Per-lobby channels buffer at most `capacity` messages for slow viewers.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lobbies: Mutex::new(HashMap::new()),
            connections: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Start watching a lobby. Only broadcasts sent after this call arrive.
    pub fn subscribe(&self, lobby: &LobbyId) -> broadcast::Receiver<Broadcast> {
        let mut lobbies = self.lobbies.lock().unwrap_or_else(PoisonError::into_inner);
        lobbies
            .entry(lobby.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Register a connection to receive its own rejections.
    pub fn connect(&self, connection: ConnectionId) -> mpsc::UnboundedReceiver<Rejection> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(connection, tx);
        rx
    }

    pub fn disconnect(&self, connection: ConnectionId) {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&connection);
    }

    /// Number of live viewers of a lobby.
    #[must_use]
    pub fn viewer_count(&self, lobby: &LobbyId) -> usize {
        self.lobbies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(lobby)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Default for ChannelGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Gateway for ChannelGateway {
    fn broadcast(&self, message: &Broadcast) {
        let mut lobbies = self.lobbies.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = lobbies.get(&message.lobby_id) else {
            tracing::trace!(lobby = %message.lobby_id, "No viewers; broadcast dropped");
            return;
        };
        // Every receiver is gone. A later subscribe opens a fresh channel.
        if tx.send(message.clone()).is_err() {
            lobbies.remove(&message.lobby_id);
            tracing::trace!(lobby = %message.lobby_id, "Last viewer left; channel closed");
        }
    }

    fn reply(&self, connection: ConnectionId, rejection: &Rejection) {
        let mut connections = self
            .connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let delivered = connections
            .get(&connection)
            .is_some_and(|tx| tx.send(rejection.clone()).is_ok());
        if !delivered {
            connections.remove(&connection);
            tracing::debug!(connection = %connection, kind = %rejection.kind, "Rejection undeliverable");
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingGateway
// ---------------------------------------------------------------------------

/// Gateway that keeps everything it is given, in order. Handy for embedding
/// the coordinator in tests and tools.
#[derive(Default)]
pub struct RecordingGateway {
    broadcasts: Mutex<Vec<Broadcast>>,
    replies: Mutex<Vec<(ConnectionId, Rejection)>>,
}

impl RecordingGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every broadcast so far, oldest first.
    #[must_use]
    pub fn broadcasts(&self) -> Vec<Broadcast> {
        self.broadcasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every rejection so far, with its recipient.
    #[must_use]
    pub fn replies(&self) -> Vec<(ConnectionId, Rejection)> {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget everything recorded.
    pub fn clear(&self) {
        self.broadcasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Gateway for RecordingGateway {
    fn broadcast(&self, message: &Broadcast) {
        self.broadcasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
    }

    fn reply(&self, connection: ConnectionId, rejection: &Rejection) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((connection, rejection.clone()));
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use draftmatch_types::{Action, DraftmatchError, Identity, LobbyEvent};

    use super::*;

    fn message(lobby: &str, sequence: u64) -> Broadcast {
        Broadcast {
            lobby_id: LobbyId::from(lobby),
            sequence,
            emitted_at: Utc::now(),
            event: LobbyEvent::QueueSizeUpdate {
                size: usize::try_from(sequence).unwrap(),
                threshold: 10,
            },
        }
    }

    fn rejection() -> Rejection {
        Rejection::new(
            LobbyId::from("eu"),
            &Action::JoinQueue {
                identity: Identity::from("a"),
            },
            &DraftmatchError::QueueFull { capacity: 1 },
        )
    }

    #[tokio::test]
    async fn subscribers_receive_in_order() {
        let gateway = ChannelGateway::new();
        let lobby = LobbyId::from("eu");
        let mut a = gateway.subscribe(&lobby);
        let mut b = gateway.subscribe(&lobby);
        assert_eq!(gateway.viewer_count(&lobby), 2);

        for seq in 1..=3 {
            gateway.broadcast(&message("eu", seq));
        }

        for rx in [&mut a, &mut b] {
            for seq in 1..=3 {
                assert_eq!(rx.recv().await.unwrap().sequence, seq);
            }
        }
    }

    #[tokio::test]
    async fn lobbies_are_isolated() {
        let gateway = ChannelGateway::new();
        let mut eu = gateway.subscribe(&LobbyId::from("eu"));
        gateway.broadcast(&message("na", 1));
        gateway.broadcast(&message("eu", 1));
        assert_eq!(eu.recv().await.unwrap().lobby_id, LobbyId::from("eu"));
        assert!(eu.try_recv().is_err());
    }

    #[test]
    fn broadcast_without_viewers_is_harmless() {
        let gateway = ChannelGateway::new();
        gateway.broadcast(&message("eu", 1));
        let rx = gateway.subscribe(&LobbyId::from("eu"));
        drop(rx);
        gateway.broadcast(&message("eu", 2));
        assert_eq!(gateway.viewer_count(&LobbyId::from("eu")), 0);
    }

    #[tokio::test]
    async fn abandoned_lobby_channel_is_released() {
        let gateway = ChannelGateway::new();
        for lobby in ["eu", "na", "sa"] {
            drop(gateway.subscribe(&LobbyId::from(lobby)));
            gateway.broadcast(&message(lobby, 1));
        }
        assert!(gateway.lobbies.lock().unwrap().is_empty());

        let mut eu = gateway.subscribe(&LobbyId::from("eu"));
        gateway.broadcast(&message("eu", 2));
        assert_eq!(eu.recv().await.unwrap().sequence, 2);
        assert_eq!(gateway.lobbies.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reply_reaches_only_its_connection() {
        let gateway = ChannelGateway::new();
        let alice = ConnectionId::new();
        let bob = ConnectionId::new();
        let mut alice_rx = gateway.connect(alice);
        let mut bob_rx = gateway.connect(bob);

        gateway.reply(alice, &rejection());

        assert_eq!(alice_rx.recv().await.unwrap().kind, "QUEUE_FULL");
        assert!(bob_rx.try_recv().is_err());
    }

    #[test]
    fn reply_to_closed_connection_is_dropped() {
        let gateway = ChannelGateway::new();
        let conn = ConnectionId::new();
        let rx = gateway.connect(conn);
        drop(rx);
        gateway.reply(conn, &rejection());
        gateway.disconnect(conn);
        gateway.reply(ConnectionId::new(), &rejection());
    }

    #[test]
    fn recording_gateway_keeps_order() {
        let gateway = RecordingGateway::new();
        gateway.broadcast(&message("eu", 1));
        gateway.broadcast(&message("eu", 2));
        let conn = ConnectionId::new();
        gateway.reply(conn, &rejection());

        let seqs: Vec<u64> = gateway.broadcasts().iter().map(|b| b.sequence).collect();
        assert_eq!(seqs, vec![1, 2]);
        assert_eq!(gateway.replies()[0].0, conn);

        gateway.clear();
        assert!(gateway.broadcasts().is_empty());
        assert!(gateway.replies().is_empty());
    }
}
