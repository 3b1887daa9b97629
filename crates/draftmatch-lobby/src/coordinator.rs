//! Coordinator: routes envelopes to lobbies and delivers the outcome.
//!
//! Lobbies are created by their first join and dropped once they are idle
//! with an empty queue. Each lobby has its own lock: a dispatch runs start to
//! finish under it, gateway delivery included, so actions on one lobby never
//! interleave and its broadcasts reach viewers in acceptance order. Separate
//! lobbies proceed independently.
//!
//! Lock order is registry, then lobby. The registry lock is never held while
//! waiting on a lobby.

use std::collections::HashMap;
use std::sync::Arc;

use draftmatch_queue::{InMemoryRatings, RatingDirectory};
use draftmatch_types::{
    Action, Broadcast, DraftState, DraftmatchError, Envelope, LobbyConfig, LobbyId, Rejection,
    Result,
};
use tokio::sync::Mutex;

use crate::gateway::Gateway;
use crate::lobby::Lobby;

/// `None` once the lobby has been closed; a dispatch that was waiting on it
/// looks the id up again.
type Slot = Arc<Mutex<Option<Lobby>>>;

#[derive(Default)]
struct Registry {
    open: HashMap<LobbyId, Slot>,
    /// Last sequence number of each closed lobby, resumed when it reopens.
    closed: HashMap<LobbyId, u64>,
}

/// Owns every lobby of one process.
pub struct Coordinator<G: Gateway> {
    config: LobbyConfig,
    ratings: Arc<dyn RatingDirectory>,
    gateway: Arc<G>,
    registry: Mutex<Registry>,
}

impl<G: Gateway> Coordinator<G> {
    /// Create a coordinator whose lobbies all use `config`.
    ///
    /// `ratings` keeps its own baseline; `config.rating_baseline` is not
    /// applied to it.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn new(
        config: LobbyConfig,
        ratings: Arc<dyn RatingDirectory>,
        gateway: Arc<G>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ratings,
            gateway,
            registry: Mutex::new(Registry::default()),
        })
    }

    /// Create a coordinator with an empty rating directory: every player is
    /// rated `config.rating_baseline`.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn with_baseline_ratings(config: LobbyConfig, gateway: Arc<G>) -> Result<Self> {
        let ratings = Arc::new(InMemoryRatings::new(config.rating_baseline));
        Self::new(config, ratings, gateway)
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Handle one inbound envelope.
    ///
    /// On success every resulting broadcast has been handed to the gateway
    /// and is also returned. On failure the sender alone gets a
    /// [`Rejection`] and the error is returned; no lobby changed.
    pub async fn dispatch(&self, envelope: Envelope) -> Result<Vec<Broadcast>> {
        let Envelope {
            lobby_id,
            connection_id,
            action,
        } = envelope;

        let outcome = self.route(&lobby_id, &action).await;
        if let Err(err) = &outcome {
            tracing::warn!(
                lobby = %lobby_id,
                connection = %connection_id,
                action = action.name(),
                actor = %action.actor(),
                error = %err,
                "Action rejected"
            );
            self.gateway
                .reply(connection_id, &Rejection::new(lobby_id, &action, err));
        }
        outcome
    }

    async fn route(&self, lobby_id: &LobbyId, action: &Action) -> Result<Vec<Broadcast>> {
        loop {
            let slot = self.slot(lobby_id, action).await?;
            let mut guard = slot.lock().await;
            let Some(lobby) = guard.as_mut() else {
                // Closed while we waited for it.
                continue;
            };

            let result = lobby.handle(action, self.ratings.as_ref());
            if let Ok(broadcasts) = &result {
                for message in broadcasts {
                    self.gateway.broadcast(message);
                }
            }
            // Also covers a join refused on a brand-new lobby.
            if lobby.is_dormant() {
                let sequence = lobby.sequence();
                self.close(lobby_id, &slot, sequence).await;
                *guard = None;
            }
            return result;
        }
    }

    /// The open lobby for `lobby_id`; a join opens one if there is none.
    async fn slot(&self, lobby_id: &LobbyId, action: &Action) -> Result<Slot> {
        let mut registry = self.registry.lock().await;
        if let Some(slot) = registry.open.get(lobby_id) {
            return Ok(Arc::clone(slot));
        }
        // Only a join may bring a lobby into existence.
        if !matches!(action, Action::JoinQueue { .. }) {
            return Err(DraftmatchError::NoActiveDraft);
        }
        let sequence = registry.closed.remove(lobby_id).unwrap_or(0);
        let lobby = Lobby::new(lobby_id.clone(), &self.config)?.with_sequence(sequence);
        tracing::debug!(lobby = %lobby_id, sequence, "Lobby opened");
        let slot = Arc::new(Mutex::new(Some(lobby)));
        registry.open.insert(lobby_id.clone(), Arc::clone(&slot));
        Ok(slot)
    }

    /// Called with the lobby's own lock held.
    async fn close(&self, lobby_id: &LobbyId, slot: &Slot, sequence: u64) {
        let mut registry = self.registry.lock().await;
        if registry
            .open
            .get(lobby_id)
            .is_some_and(|open| Arc::ptr_eq(open, slot))
        {
            registry.open.remove(lobby_id);
            registry.closed.insert(lobby_id.clone(), sequence);
            tracing::debug!(lobby = %lobby_id, sequence, "Lobby closed");
        }
    }

    async fn peek<T>(&self, lobby_id: &LobbyId, f: impl FnOnce(&Lobby) -> T) -> Option<T> {
        let slot = self.registry.lock().await.open.get(lobby_id).cloned()?;
        let guard = slot.lock().await;
        guard.as_ref().map(f)
    }

    /// Number of open lobbies.
    pub async fn lobby_count(&self) -> usize {
        self.registry.lock().await.open.len()
    }

    /// Queue length of a lobby, if it is open.
    pub async fn queue_len(&self, lobby_id: &LobbyId) -> Option<usize> {
        self.peek(lobby_id, Lobby::queue_len).await
    }

    /// Snapshot of a lobby's live draft.
    pub async fn draft(&self, lobby_id: &LobbyId) -> Option<DraftState> {
        self.peek(lobby_id, |lobby| lobby.draft().cloned())
            .await
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use draftmatch_types::{ConnectionId, Identity, MapId};

    use super::*;
    use crate::gateway::RecordingGateway;

    fn coordinator(config: LobbyConfig) -> Coordinator<RecordingGateway> {
        let ratings: InMemoryRatings = [("alice", 1200), ("bob", 1000)]
            .into_iter()
            .map(|(n, r)| (Identity::from(n), r))
            .collect();
        Coordinator::new(config, Arc::new(ratings), Arc::new(RecordingGateway::new())).unwrap()
    }

    fn join(lobby: &str, name: &str) -> Envelope {
        Envelope::new(
            LobbyId::from(lobby),
            ConnectionId::new(),
            Action::JoinQueue {
                identity: Identity::from(name),
            },
        )
    }

    fn ban(lobby: &str, captain: &str, map: &MapId) -> Envelope {
        Envelope::new(
            LobbyId::from(lobby),
            ConnectionId::new(),
            Action::BanMap {
                acting_captain: Identity::from(captain),
                map: map.clone(),
            },
        )
    }

    async fn play_duel(coord: &Coordinator<RecordingGateway>, lobby: &str) {
        coord.dispatch(join(lobby, "alice")).await.unwrap();
        coord.dispatch(join(lobby, "bob")).await.unwrap();
        let maps = coord
            .draft(&LobbyId::from(lobby))
            .await
            .unwrap()
            .candidate_maps;
        for map in &maps[..maps.len() - 1] {
            coord.dispatch(ban(lobby, "bob", map)).await.unwrap();
        }
    }

    fn sequences(coord: &Coordinator<RecordingGateway>, lobby: &str) -> Vec<u64> {
        coord
            .gateway()
            .broadcasts()
            .iter()
            .filter(|b| b.lobby_id == LobbyId::from(lobby))
            .map(|b| b.sequence)
            .collect()
    }

    #[tokio::test]
    async fn first_join_opens_lobby() {
        let coord = coordinator(LobbyConfig::duel());
        assert_eq!(coord.lobby_count().await, 0);
        coord.dispatch(join("eu", "alice")).await.unwrap();
        assert_eq!(coord.lobby_count().await, 1);
        assert_eq!(coord.queue_len(&LobbyId::from("eu")).await, Some(1));
        assert_eq!(coord.gateway().broadcasts().len(), 1);
    }

    #[tokio::test]
    async fn action_on_unknown_lobby_is_rejected_to_sender() {
        let coord = coordinator(LobbyConfig::duel());
        let conn = ConnectionId::new();
        let envelope = Envelope::new(
            LobbyId::from("ghost"),
            conn,
            Action::BanMap {
                acting_captain: Identity::from("alice"),
                map: MapId::from("Dune"),
            },
        );

        let err = coord.dispatch(envelope).await.unwrap_err();

        assert_eq!(err, DraftmatchError::NoActiveDraft);
        assert_eq!(coord.lobby_count().await, 0);
        assert!(coord.gateway().broadcasts().is_empty());
        let replies = coord.gateway().replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, conn);
        assert_eq!(replies[0].1.kind, "NO_ACTIVE_DRAFT");
    }

    #[tokio::test]
    async fn lobbies_are_independent() {
        let coord = coordinator(LobbyConfig::duel());
        coord.dispatch(join("eu", "alice")).await.unwrap();
        coord.dispatch(join("na", "bob")).await.unwrap();
        assert_eq!(coord.lobby_count().await, 2);
        assert!(coord.draft(&LobbyId::from("eu")).await.is_none());
        assert!(coord.draft(&LobbyId::from("na")).await.is_none());
    }

    #[tokio::test]
    async fn finalized_lobby_closes() {
        let coord = coordinator(LobbyConfig::duel());
        play_duel(&coord, "eu").await;

        assert_eq!(coord.lobby_count().await, 0);
        let last = coord.gateway().broadcasts().pop().unwrap();
        assert_eq!(last.event.name(), "match-finalized");
    }

    #[tokio::test]
    async fn reopened_lobby_continues_sequence() {
        let coord = coordinator(LobbyConfig::duel());
        play_duel(&coord, "eu").await;
        assert_eq!(coord.lobby_count().await, 0);

        play_duel(&coord, "eu").await;

        let seqs = sequences(&coord, "eu");
        let expected: Vec<u64> = (1..=u64::try_from(seqs.len()).unwrap()).collect();
        assert_eq!(seqs, expected);
    }

    #[tokio::test]
    async fn rejection_on_closed_lobby_keeps_numbering() {
        let coord = coordinator(LobbyConfig::duel());
        play_duel(&coord, "eu").await;
        let last = u64::try_from(sequences(&coord, "eu").len()).unwrap();

        let err = coord
            .dispatch(ban("eu", "alice", &MapId::from("Dune")))
            .await
            .unwrap_err();
        assert_eq!(err, DraftmatchError::NoActiveDraft);
        assert_eq!(coord.lobby_count().await, 0);

        let out = coord.dispatch(join("eu", "carol")).await.unwrap();
        assert_eq!(out[0].sequence, last + 1);
    }

    #[tokio::test]
    async fn concurrent_lobbies_each_stay_gapless() {
        let coord = Arc::new(coordinator(LobbyConfig::duel()));
        let mut tasks = Vec::new();
        for lobby in ["eu", "na", "sa", "oc"] {
            let coord = Arc::clone(&coord);
            tasks.push(tokio::spawn(async move {
                play_duel(&coord, lobby).await;
                play_duel(&coord, lobby).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(coord.lobby_count().await, 0);
        for lobby in ["eu", "na", "sa", "oc"] {
            let seqs = sequences(&coord, lobby);
            let expected: Vec<u64> = (1..=u64::try_from(seqs.len()).unwrap()).collect();
            assert_eq!(seqs, expected, "{lobby}");
        }
    }

    #[tokio::test]
    async fn baseline_ratings_come_from_config() {
        let config = LobbyConfig {
            rating_baseline: 1750,
            ..LobbyConfig::duel()
        };
        let coord =
            Coordinator::with_baseline_ratings(config, Arc::new(RecordingGateway::new())).unwrap();
        coord.dispatch(join("eu", "x")).await.unwrap();
        coord.dispatch(join("eu", "y")).await.unwrap();

        let draft = coord.draft(&LobbyId::from("eu")).await.unwrap();
        assert_eq!(draft.captains[0].rating, 1750);
        assert_eq!(draft.captains[1].rating, 1750);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = LobbyConfig {
            maps: vec![MapId::from("Dune")],
            ..LobbyConfig::duel()
        };
        let result = Coordinator::new(
            config,
            Arc::new(InMemoryRatings::default()),
            Arc::new(RecordingGateway::new()),
        );
        assert!(result.is_err());
    }
}
