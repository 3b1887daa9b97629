//! # draftmatch-queue
//!
//! **Admission plane**: who is waiting, what they are rated, and how a
//! waiting batch becomes a seeded draft.
//!
//! ## Architecture
//!
//! 1. **AdmissionQueue**: distinct identities in arrival order; drains a
//!    batch atomically once the mode threshold is reached
//! 2. **RatingDirectory**: read-only rating lookup with a baseline default
//! 3. **FillPolicy**: optional top-up of short batches
//! 4. **MatchFormer**: snapshots ratings, seeds captains, builds the `DraftState`
//!
//! ## Flow
//!
//! ```text
//! join() → AdmissionQueue.drain_batch() → MatchFormer.form() → DraftState
//! ```

pub mod admission_queue;
pub mod fill;
pub mod formation;
pub mod rating;

pub use admission_queue::{AdmissionQueue, JoinOutcome};
pub use fill::{FillPolicy, NoFill, PlaceholderFill};
pub use formation::MatchFormer;
pub use rating::{InMemoryRatings, RatingDirectory};
