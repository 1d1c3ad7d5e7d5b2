//! Mutation coordinator: optimistic apply, remote confirm, reconcile.
//!
//! [`BoardCoordinator`] owns the shared [`BoardSnapshot`] and is the only
//! writer to it. Every public mutation resolves to a [`MutationOutcome`];
//! validation and not-found checks happen before any remote call, and a
//! failed remote call leaves the snapshot at its last known good state.
//!
//! Mutations are serialised through an async gate, so a move's rollback
//! target is always the snapshot its own optimistic apply replaced. Reads take
//! the snapshot lock only briefly and never wait on the gate.

mod card;
mod list;
mod movement;
mod transaction;

pub use movement::{ListMoveReport, MoveReport};
pub use transaction::MoveState;

use crate::activity::{ActivityLog, LogEntry};
use crate::auto_color::{is_hex_color, normalize_color};
use crate::celebration::{Celebration, CelebrationSink, LogCelebration};
use crate::config::EngineConfig;
use crate::error::{BoardError, MutationOutcome, Result};
use crate::remote::{BatchAck, BoardData, RemoteClient, RemoteOperation, RemoteStore};
use crate::snapshot::BoardSnapshot;
use crate::types::{BoardId, CardPositionUpdate, ListPositionUpdate, UserId};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Coordinates every user-initiated change to one board
pub struct BoardCoordinator<R> {
    client: RemoteClient<R>,
    config: EngineConfig,
    user: UserId,
    snapshot: RwLock<BoardSnapshot>,
    gate: Mutex<()>,
    activity: Mutex<ActivityLog>,
    celebrations: Arc<dyn CelebrationSink>,
}

impl<R: RemoteStore> BoardCoordinator<R> {
    /// Fetch a board from the store and coordinate it as `user`
    pub async fn load(store: R, board_id: &BoardId, user: UserId, config: EngineConfig) -> Result<Self> {
        let client = RemoteClient::new(store, config.remote_timeout());
        let data: BoardData = client
            .call(&RemoteOperation::FetchBoardData {
                board_id: board_id.clone(),
            })
            .await?;
        let snapshot = BoardSnapshot::new(data.board, data.lists);
        info!(
            board = %board_id,
            lists = snapshot.lists().len(),
            cards = snapshot.total_cards(),
            "loaded board"
        );
        Ok(Self::with_client(client, snapshot, user, config))
    }

    /// Coordinate an already fetched snapshot
    pub fn from_snapshot(store: R, snapshot: BoardSnapshot, user: UserId, config: EngineConfig) -> Self {
        let client = RemoteClient::new(store, config.remote_timeout());
        Self::with_client(client, snapshot, user, config)
    }

    fn with_client(client: RemoteClient<R>, snapshot: BoardSnapshot, user: UserId, config: EngineConfig) -> Self {
        Self {
            client,
            activity: Mutex::new(ActivityLog::new(config.activity_capacity)),
            config,
            user,
            snapshot: RwLock::new(snapshot),
            gate: Mutex::new(()),
            celebrations: Arc::new(LogCelebration),
        }
    }

    /// Replace the default log-only celebration sink
    pub fn with_celebration_sink(mut self, sink: Arc<dyn CelebrationSink>) -> Self {
        self.celebrations = sink;
        self
    }

    /// Re-fetch the board, discarding local state
    pub async fn reload(&self) -> Result<()> {
        let _turn = self.gate.lock().await;
        let board_id = self.snapshot.read().await.board().id.clone();
        let data: BoardData = self
            .client
            .call(&RemoteOperation::FetchBoardData {
                board_id: board_id.clone(),
            })
            .await?;
        *self.snapshot.write().await = BoardSnapshot::new(data.board, data.lists);
        debug!(board = %board_id, "reloaded board");
        Ok(())
    }

    /// A copy of the current snapshot
    pub async fn snapshot(&self) -> BoardSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Recorded mutations, newest first
    pub async fn activity(&self) -> Vec<LogEntry> {
        self.activity.lock().await.recent()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn store(&self) -> &R {
        self.client.store()
    }

    // =========================================================================
    // Shared plumbing for the operation modules
    // =========================================================================

    /// Log, record and convert the result of one mutation
    async fn finish<T: Serialize>(
        &self,
        op: &str,
        input: Value,
        started: Instant,
        result: Result<T>,
    ) -> MutationOutcome<T> {
        let duration_ms = started.elapsed().as_millis() as u64;
        let output = match &result {
            Ok(payload) => {
                info!(op, duration_ms, "mutation confirmed");
                Some(serde_json::to_value(payload).unwrap_or(Value::Null))
            }
            Err(error) if error.is_local() => {
                debug!(op, %error, "mutation rejected before remote call");
                None
            }
            Err(error) => {
                warn!(op, duration_ms, %error, "mutation failed");
                Some(json!({ "error": error.to_string() }))
            }
        };

        if let Some(output) = output {
            let entry = LogEntry::new(op, input, output, duration_ms).with_actor(self.user.clone());
            self.activity.lock().await.record(entry);
        }
        result.into()
    }

    /// Trim and bound a required title or name
    fn validate_text(&self, field: &str, value: &str) -> Result<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BoardError::validation(field, "must not be empty"));
        }
        if trimmed.chars().count() > self.config.max_title_len {
            return Err(BoardError::validation(
                field,
                format!("must be at most {} characters", self.config.max_title_len),
            ));
        }
        Ok(trimmed.to_string())
    }

    /// Check a 6-digit hex color and return its stored form
    fn validate_color(field: &str, value: &str) -> Result<String> {
        if !is_hex_color(value.trim()) {
            return Err(BoardError::validation(
                field,
                format!("'{value}' is not a 6-digit hex color"),
            ));
        }
        Ok(normalize_color(value))
    }

    /// Write card positions shifted by an archive; failure is logged only
    async fn write_card_positions(&self, updates: Vec<CardPositionUpdate>) {
        if updates.is_empty() {
            return;
        }
        let expected = updates.len();
        let op = RemoteOperation::BatchUpdatePositions { updates };
        self.write_positions_best_effort(&op, expected).await;
    }

    /// Write list positions shifted by an archive; failure is logged only
    async fn write_list_positions(&self, updates: Vec<ListPositionUpdate>) {
        if updates.is_empty() {
            return;
        }
        let expected = updates.len();
        let op = RemoteOperation::BatchUpdateListPositions { updates };
        self.write_positions_best_effort(&op, expected).await;
    }

    async fn write_positions_best_effort(&self, op: &RemoteOperation, expected: usize) {
        match self.batch_write(op, expected).await {
            Ok(()) => debug!(operation = op.name(), expected, "renumbered siblings after archive"),
            Err(error) => warn!(
                operation = op.name(),
                %error,
                "failed to write renumbered positions after archive"
            ),
        }
    }

    /// A batch position write; fewer affected rows than sent is a failure
    async fn batch_write(&self, op: &RemoteOperation, expected: usize) -> Result<()> {
        let ack: BatchAck = self.client.call(op).await?;
        if ack.affected < expected {
            return Err(BoardError::remote(
                op.name(),
                format!("partial update: {} of {} positions written", ack.affected, expected),
            ));
        }
        Ok(())
    }

    /// Fire the celebration side effect if enabled; never fails the caller.
    ///
    /// Returns whether the sink accepted it.
    fn celebrate(&self, celebration: Celebration) -> bool {
        if !self.config.celebrate {
            return false;
        }
        match self.celebrations.celebrate(&celebration) {
            Ok(()) => true,
            Err(error) => {
                warn!(card = %celebration.card_id, %error, "celebration failed");
                false
            }
        }
    }

    /// Snapshot invariants are checked in debug builds after every commit
    async fn debug_check_invariants(&self) {
        if cfg!(debug_assertions) {
            if let Err(violation) = self.snapshot.read().await.check_invariants() {
                warn!(%violation, "snapshot invariant violated");
            }
        }
    }
}
