//! The per-move state machine.
//!
//! `Idle -> OptimisticallyApplied -> {Confirmed | RolledBack}`. The pre-move
//! snapshot is captured when the optimistic snapshot is committed, so rolling
//! back restores exactly what readers saw before the move.

use crate::snapshot::BoardSnapshot;
use serde::Serialize;
use std::fmt;
use tokio::sync::RwLock;
use tracing::{trace, warn};

/// Where a move stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    Idle,
    OptimisticallyApplied,
    Confirmed,
    RolledBack,
}

impl MoveState {
    /// Legal transitions of the state machine
    pub fn can_advance_to(self, next: MoveState) -> bool {
        matches!(
            (self, next),
            (MoveState::Idle, MoveState::OptimisticallyApplied)
                | (MoveState::OptimisticallyApplied, MoveState::Confirmed)
                | (MoveState::OptimisticallyApplied, MoveState::RolledBack)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MoveState::Confirmed | MoveState::RolledBack)
    }
}

impl fmt::Display for MoveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoveState::Idle => "idle",
            MoveState::OptimisticallyApplied => "optimistically_applied",
            MoveState::Confirmed => "confirmed",
            MoveState::RolledBack => "rolled_back",
        };
        f.write_str(s)
    }
}

/// One optimistic change to the shared snapshot
pub(crate) struct MoveTransaction<'a> {
    snapshot: &'a RwLock<BoardSnapshot>,
    before: Option<BoardSnapshot>,
    state: MoveState,
}

impl<'a> MoveTransaction<'a> {
    pub(crate) fn new(snapshot: &'a RwLock<BoardSnapshot>) -> Self {
        Self {
            snapshot,
            before: None,
            state: MoveState::Idle,
        }
    }

    pub(crate) fn state(&self) -> MoveState {
        self.state
    }

    fn advance(&mut self, next: MoveState) -> bool {
        if !self.state.can_advance_to(next) {
            warn!(from = %self.state, to = %next, "ignored illegal move transition");
            return false;
        }
        trace!(from = %self.state, to = %next, "move transition");
        self.state = next;
        true
    }

    /// Commit the optimistic snapshot, remembering the one it replaced
    pub(crate) async fn apply(&mut self, next: BoardSnapshot) {
        if !self.advance(MoveState::OptimisticallyApplied) {
            return;
        }
        let mut guard = self.snapshot.write().await;
        self.before = Some(std::mem::replace(&mut *guard, next));
    }

    /// Keep the optimistic snapshot, merging authoritative fields into it
    pub(crate) async fn confirm(&mut self, merge: impl FnOnce(&mut BoardSnapshot)) {
        if !self.advance(MoveState::Confirmed) {
            return;
        }
        merge(&mut *self.snapshot.write().await);
        self.before = None;
    }

    /// Restore the pre-move snapshot
    pub(crate) async fn rollback(&mut self) {
        if !self.advance(MoveState::RolledBack) {
            return;
        }
        if let Some(before) = self.before.take() {
            *self.snapshot.write().await = before;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Board, List};

    fn snapshot(lists: usize) -> BoardSnapshot {
        let board = Board::new("T");
        let lists = (0..lists)
            .map(|i| List::new(board.id.clone(), format!("l{i}"), i))
            .collect();
        BoardSnapshot::new(board, lists)
    }

    #[test]
    fn test_transitions() {
        use MoveState::*;
        assert!(Idle.can_advance_to(OptimisticallyApplied));
        assert!(OptimisticallyApplied.can_advance_to(Confirmed));
        assert!(OptimisticallyApplied.can_advance_to(RolledBack));
        assert!(!Idle.can_advance_to(Confirmed));
        assert!(!Confirmed.can_advance_to(RolledBack));
        assert!(!RolledBack.can_advance_to(OptimisticallyApplied));
        assert!(RolledBack.is_terminal());
        assert!(!OptimisticallyApplied.is_terminal());
        assert_eq!(OptimisticallyApplied.to_string(), "optimistically_applied");
    }

    #[tokio::test]
    async fn test_rollback_restores_previous_snapshot() {
        let original = snapshot(1);
        let lock = RwLock::new(original.clone());
        let mut tx = MoveTransaction::new(&lock);

        tx.apply(original.with_lists(Vec::new())).await;
        assert_eq!(tx.state(), MoveState::OptimisticallyApplied);
        assert!(lock.read().await.lists().is_empty());

        tx.rollback().await;
        assert_eq!(tx.state(), MoveState::RolledBack);
        assert_eq!(*lock.read().await, original);
    }

    #[tokio::test]
    async fn test_confirm_keeps_optimistic_snapshot() {
        let original = snapshot(2);
        let lock = RwLock::new(original.clone());
        let mut tx = MoveTransaction::new(&lock);

        tx.apply(original.with_lists(Vec::new())).await;
        tx.confirm(|_| {}).await;
        assert_eq!(tx.state(), MoveState::Confirmed);
        assert!(lock.read().await.lists().is_empty());

        // Terminal: a late rollback changes nothing.
        tx.rollback().await;
        assert_eq!(tx.state(), MoveState::Confirmed);
        assert!(lock.read().await.lists().is_empty());
    }
}
