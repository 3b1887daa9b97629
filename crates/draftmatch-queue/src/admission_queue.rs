//! Admission queue for players waiting to be matched.
//!
//! Identities are held in arrival order without duplicates. Once the queue
//! reaches its threshold, [`AdmissionQueue::drain_batch`] removes the oldest
//! `threshold` identities in one step and hands them to formation.

use std::collections::{HashSet, VecDeque};

use draftmatch_types::{DraftmatchError, Identity, Result, constants};

/// What a `join` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Appended; `size` is the new queue length.
    Queued { size: usize },
    /// Already waiting; nothing changed.
    AlreadyQueued { size: usize },
}

impl JoinOutcome {
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::Queued { size } | Self::AlreadyQueued { size } => size,
        }
    }
}

/// Distinct pending identities in arrival order.
pub struct AdmissionQueue {
    /// Identities in arrival order (front = oldest).
    entries: VecDeque<Identity>,
    /// Membership index for duplicate checks.
    members: HashSet<Identity>,
    /// Batch size that fires formation.
    threshold: usize,
    /// Maximum number of identities held.
    max_pending: usize,
}

impl AdmissionQueue {
    /// Create an empty queue with the default cap.
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self::with_capacity(threshold, constants::DEFAULT_MAX_PENDING)
    }

    /// Create an empty queue holding at most `max_pending` identities.
    #[must_use]
    pub fn with_capacity(threshold: usize, max_pending: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(threshold),
            members: HashSet::with_capacity(threshold),
            threshold,
            max_pending,
        }
    }

    /// Append `identity` unless it is already waiting.
    ///
    /// # Errors
    /// Returns `QueueFull` if a new identity would exceed the cap.
    pub fn join(&mut self, identity: Identity) -> Result<JoinOutcome> {
        if self.members.contains(&identity) {
            return Ok(JoinOutcome::AlreadyQueued { size: self.len() });
        }
        if self.entries.len() >= self.max_pending {
            return Err(DraftmatchError::QueueFull {
                capacity: self.max_pending,
            });
        }
        tracing::debug!(identity = %identity, size = self.entries.len() + 1, "Joined queue");
        self.members.insert(identity.clone());
        self.entries.push_back(identity);
        Ok(JoinOutcome::Queued { size: self.len() })
    }

    /// Remove and return the oldest `threshold` identities, if that many wait.
    ///
    /// Check and removal happen under the same `&mut` borrow, so no caller can
    /// observe a drained identity as still queued.
    pub fn drain_batch(&mut self) -> Option<Vec<Identity>> {
        if !self.is_ready() {
            return None;
        }
        let batch: Vec<Identity> = self.entries.drain(..self.threshold).collect();
        for identity in &batch {
            self.members.remove(identity);
        }
        Some(batch)
    }

    /// Whether a batch can be drained.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.threshold > 0 && self.entries.len() >= self.threshold
    }

    #[must_use]
    pub fn contains(&self, identity: &Identity) -> bool {
        self.members.contains(identity)
    }

    /// Number of identities currently waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Waiting identities, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.entries.iter()
    }
}
