//! # draftmatch-draft
//!
//! **The draft state machine for Draftmatch.**
//!
//! Holds one lobby's in-flight [`DraftState`](draftmatch_types::DraftState)
//! and applies captain actions to it:
//!
//! - **Idle → Drafting → Finalized → Idle**: only `Drafting` accepts actions
//! - **Validate, then apply**: a rejected action never touches the state
//! - **Turn policy**: free-for-all by default, strict alternation on request
//! - **Invariants**: player placement, ban monotonicity and final-map
//!   convergence are checked on every state the machine takes in

pub mod invariants;
pub mod state_machine;
pub mod turn;

pub use invariants::check_invariants;
pub use state_machine::{DraftAction, DraftMachine, MachineState, Transition};
pub use turn::{expected_banner, expected_picker};
