//! One matchmaking lobby: an admission queue and at most one live draft.
//!
//! [`Lobby::handle`] is the whole per-action transaction. It either returns
//! the broadcasts the action caused, stamped with consecutive sequence
//! numbers, or an error with no state change.

use chrono::Utc;
use draftmatch_draft::{DraftAction, DraftMachine, Transition};
use draftmatch_queue::{AdmissionQueue, MatchFormer, RatingDirectory};
use draftmatch_types::{
    Action, Broadcast, DraftState, Identity, LobbyConfig, LobbyEvent, LobbyId, Result,
};

/// Per-lobby context handed every action for that lobby.
pub struct Lobby {
    id: LobbyId,
    queue: AdmissionQueue,
    former: MatchFormer,
    machine: DraftMachine,
    /// Sequence number of the last broadcast emitted.
    sequence: u64,
}

impl Lobby {
    /// Create an empty, idle lobby.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn new(id: LobbyId, config: &LobbyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            id,
            queue: AdmissionQueue::with_capacity(config.threshold(), config.max_pending),
            former: MatchFormer::from_config(config),
            machine: DraftMachine::new(config.turn_policy),
            sequence: 0,
        })
    }

    /// Continue numbering after `sequence`, for a lobby id reopened after
    /// it went dormant. Viewers then never see a sequence number twice.
    #[must_use]
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    #[must_use]
    pub fn id(&self) -> &LobbyId {
        &self.id
    }

    /// Sequence number of the last broadcast emitted.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// The live draft, if any.
    #[must_use]
    pub fn draft(&self) -> Option<&DraftState> {
        self.machine.draft()
    }

    /// Idle with nobody waiting: nothing left worth keeping.
    #[must_use]
    pub fn is_dormant(&self) -> bool {
        self.machine.is_idle() && self.queue.is_empty()
    }

    /// Apply one action.
    ///
    /// Rating lookups happen inside this call, before any draft is
    /// created, and never again for that draft.
    pub fn handle(
        &mut self,
        action: &Action,
        ratings: &dyn RatingDirectory,
    ) -> Result<Vec<Broadcast>> {
        let events = match action {
            Action::JoinQueue { identity } => self.join(identity, ratings)?,
            Action::PickPlayer {
                acting_captain,
                target,
            } => self.act(
                &DraftAction::Pick {
                    captain: acting_captain.clone(),
                    target: target.clone(),
                },
                ratings,
            )?,
            Action::BanMap {
                acting_captain,
                map,
            } => self.act(
                &DraftAction::Ban {
                    captain: acting_captain.clone(),
                    map: map.clone(),
                },
                ratings,
            )?,
        };
        Ok(self.stamp(events))
    }

    fn join(
        &mut self,
        identity: &Identity,
        ratings: &dyn RatingDirectory,
    ) -> Result<Vec<LobbyEvent>> {
        // Players seated in the live draft cannot queue for the next one.
        let seated = self.machine.draft().is_some_and(|d| d.involves(identity));
        if seated {
            tracing::debug!(lobby = %self.id, identity = %identity, "Join ignored: already drafting");
        } else {
            self.queue.join(identity.clone())?;
        }

        let mut events = vec![self.queue_size()];
        if self.machine.is_idle() {
            self.try_form(ratings, &mut events);
        }
        Ok(events)
    }

    fn act(
        &mut self,
        action: &DraftAction,
        ratings: &dyn RatingDirectory,
    ) -> Result<Vec<LobbyEvent>> {
        match self.machine.apply(action)? {
            Transition::Updated(draft) => Ok(vec![LobbyEvent::DraftUpdate(draft)]),
            Transition::Finalized(draft) => {
                let mut events = vec![LobbyEvent::MatchFinalized(draft)];
                self.machine.reset();
                // Joins held during the draft may already fill the next batch.
                self.try_form(ratings, &mut events);
                Ok(events)
            }
        }
    }

    /// Form and start a draft if the queue holds a full batch.
    ///
    /// The batch is formed from a copy of the queue head and only drained
    /// once the draft has started, so a failed formation loses nobody.
    fn try_form(&mut self, ratings: &dyn RatingDirectory, events: &mut Vec<LobbyEvent>) {
        if !self.queue.is_ready() {
            return;
        }
        let batch: Vec<Identity> = self
            .queue
            .iter()
            .take(self.queue.threshold())
            .cloned()
            .collect();

        let started = self
            .former
            .form(&batch, ratings)
            .and_then(|draft| self.machine.start(draft.clone()).map(|()| draft));
        match started {
            Ok(draft) => {
                self.queue.drain_batch();
                tracing::info!(
                    lobby = %self.id,
                    match_id = %draft.match_id,
                    mode = %draft.mode,
                    waiting = self.queue.len(),
                    "Draft started"
                );
                events.push(LobbyEvent::DraftStarted(draft));
                events.push(self.queue_size());
            }
            Err(err) => {
                tracing::error!(lobby = %self.id, error = %err, "Formation failed; batch kept queued");
            }
        }
    }

    fn queue_size(&self) -> LobbyEvent {
        LobbyEvent::QueueSizeUpdate {
            size: self.queue.len(),
            threshold: self.queue.threshold(),
        }
    }

    fn stamp(&mut self, events: Vec<LobbyEvent>) -> Vec<Broadcast> {
        events
            .into_iter()
            .map(|event| {
                self.sequence += 1;
                Broadcast {
                    lobby_id: self.id.clone(),
                    sequence: self.sequence,
                    emitted_at: Utc::now(),
                    event,
                }
            })
            .collect()
    }
}
