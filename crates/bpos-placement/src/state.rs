//! Placement state machine.
//!
//! # Design
//!
//! Explicit state machine for a single order placement. Every lifecycle event
//! is applied via [`Placement::apply`], which permits legal transitions only;
//! an illegal event returns [`TransitionError`], a programming error in the
//! service, never a business outcome.
//!
//! # State diagram
//!
//! ```text
//!               Validate            Allocate              CommitOk
//!   Received ───────────► Validating ───────► Allocating ───────► Committed (term.)
//!                             │                  │    ▲
//!                InvalidInput │     ShortStock   │    │ Conflict (retry, fresh tx)
//!                             ▼                  ▼    │
//!                          Rejected (term.) ◄────┘────┘
//!                                                │
//!                                   StorageError ▼
//!                                             Failed (term.)
//! ```
//!
//! `Conflict` keeps the placement in `Allocating`: a transient storage
//! conflict restarts the allocation from a fresh read without leaving the
//! state. Business rejections and infrastructure failures are terminal.

// ---------------------------------------------------------------------------
// PlacementState
// ---------------------------------------------------------------------------

/// All states one order placement can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementState {
    /// Submission received; nothing checked yet.
    Received,
    /// Input shape being validated (no storage access).
    Validating,
    /// Inside the storage transaction: decrement + persistence.
    Allocating,
    /// Order and lines persisted, inventory decremented. **Terminal.**
    Committed,
    /// Business-rule rejection (invalid input or insufficient stock). **Terminal.**
    Rejected,
    /// Infrastructure failure after retries exhausted. **Terminal.**
    Failed,
}

impl PlacementState {
    /// Returns `true` if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Rejected | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validating => "validating",
            Self::Allocating => "allocating",
            Self::Committed => "committed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// PlacementEvent
// ---------------------------------------------------------------------------

/// Events that drive state transitions in a [`Placement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementEvent {
    /// Start validating the submission shape.
    Validate,
    /// Validation found the submission malformed.
    InvalidInput,
    /// Validation passed; enter the storage transaction.
    Allocate,
    /// Transient storage conflict; allocation restarts from a fresh read.
    Conflict,
    /// Inventory short; the order cannot be fulfilled.
    ShortStock,
    /// Transaction committed.
    CommitOk,
    /// Unrecoverable storage error (or retries exhausted).
    StorageError,
}

// ---------------------------------------------------------------------------
// TransitionError
// ---------------------------------------------------------------------------

/// Returned when an event cannot legally be applied in the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: PlacementState,
    pub event: PlacementEvent,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "illegal placement transition: {:?} + {:?}",
            self.from, self.event
        )
    }
}

impl std::error::Error for TransitionError {}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// One order placement tracked through the explicit state machine.
#[derive(Debug, Clone)]
pub struct Placement {
    state: PlacementState,
}

impl Default for Placement {
    fn default() -> Self {
        Self::new()
    }
}

impl Placement {
    /// A fresh placement in the `Received` state.
    pub fn new() -> Self {
        Self {
            state: PlacementState::Received,
        }
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    /// Apply an event, enforcing legal transitions.
    pub fn apply(&mut self, event: PlacementEvent) -> Result<PlacementState, TransitionError> {
        use PlacementEvent::*;
        use PlacementState::*;

        let next = match (self.state, event) {
            (Received, Validate) => Validating,

            (Validating, InvalidInput) => Rejected,
            (Validating, Allocate) => Allocating,

            // Transient conflict: stay in Allocating, fresh transaction.
            (Allocating, Conflict) => Allocating,
            (Allocating, ShortStock) => Rejected,
            (Allocating, CommitOk) => Committed,
            (Allocating, StorageError) => Failed,

            (from, ev) => return Err(TransitionError { from, event: ev }),
        };

        self.state = next;
        Ok(next)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_placement_starts_received() {
        let p = Placement::new();
        assert_eq!(p.state(), PlacementState::Received);
        assert!(!p.state().is_terminal());
    }

    #[test]
    fn happy_path_reaches_committed() {
        let mut p = Placement::new();
        p.apply(PlacementEvent::Validate).unwrap();
        p.apply(PlacementEvent::Allocate).unwrap();
        p.apply(PlacementEvent::CommitOk).unwrap();
        assert_eq!(p.state(), PlacementState::Committed);
        assert!(p.state().is_terminal());
    }

    #[test]
    fn invalid_input_rejects_before_allocation() {
        let mut p = Placement::new();
        p.apply(PlacementEvent::Validate).unwrap();
        p.apply(PlacementEvent::InvalidInput).unwrap();
        assert_eq!(p.state(), PlacementState::Rejected);
    }

    #[test]
    fn short_stock_rejects_from_allocating() {
        let mut p = Placement::new();
        p.apply(PlacementEvent::Validate).unwrap();
        p.apply(PlacementEvent::Allocate).unwrap();
        p.apply(PlacementEvent::ShortStock).unwrap();
        assert_eq!(p.state(), PlacementState::Rejected);
    }

    #[test]
    fn conflict_keeps_allocating_then_commits() {
        let mut p = Placement::new();
        p.apply(PlacementEvent::Validate).unwrap();
        p.apply(PlacementEvent::Allocate).unwrap();
        p.apply(PlacementEvent::Conflict).unwrap();
        assert_eq!(p.state(), PlacementState::Allocating);
        p.apply(PlacementEvent::Conflict).unwrap();
        p.apply(PlacementEvent::CommitOk).unwrap();
        assert_eq!(p.state(), PlacementState::Committed);
    }

    #[test]
    fn storage_error_fails_from_allocating() {
        let mut p = Placement::new();
        p.apply(PlacementEvent::Validate).unwrap();
        p.apply(PlacementEvent::Allocate).unwrap();
        p.apply(PlacementEvent::StorageError).unwrap();
        assert_eq!(p.state(), PlacementState::Failed);
    }

    #[test]
    fn terminal_states_accept_nothing() {
        let mut p = Placement::new();
        p.apply(PlacementEvent::Validate).unwrap();
        p.apply(PlacementEvent::Allocate).unwrap();
        p.apply(PlacementEvent::CommitOk).unwrap();

        let err = p.apply(PlacementEvent::Validate).unwrap_err();
        assert_eq!(err.from, PlacementState::Committed);
        // State must not change after the error.
        assert_eq!(p.state(), PlacementState::Committed);
    }

    #[test]
    fn cannot_allocate_without_validating() {
        let mut p = Placement::new();
        let err = p.apply(PlacementEvent::Allocate).unwrap_err();
        assert_eq!(err.from, PlacementState::Received);
        assert_eq!(p.state(), PlacementState::Received);
    }

    #[test]
    fn conflict_is_illegal_outside_allocating() {
        let mut p = Placement::new();
        p.apply(PlacementEvent::Validate).unwrap();
        assert!(p.apply(PlacementEvent::Conflict).is_err());
    }
}
