//! Best-effort celebration when a card lands in a confetti list.
//!
//! A sink failure is logged by the coordinator and never changes the outcome
//! of the move that triggered it.

use crate::types::{BoardId, CardId, ListId};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::info;

/// A card arrived in a list with `confetti` set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Celebration {
    pub board_id: BoardId,
    pub list_id: ListId,
    pub list_name: String,
    pub card_id: CardId,
    pub card_title: String,
    /// The move also marked the card complete
    pub completed: bool,
}

/// Receives celebrations; the UI decides what confetti looks like
pub trait CelebrationSink: Send + Sync {
    fn celebrate(&self, celebration: &Celebration) -> Result<(), String>;
}

/// Logs celebrations at info; the default sink
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCelebration;

impl CelebrationSink for LogCelebration {
    fn celebrate(&self, celebration: &Celebration) -> Result<(), String> {
        info!(
            card = %celebration.card_id,
            list = %celebration.list_name,
            "{} reached {}",
            celebration.card_title,
            celebration.list_name
        );
        Ok(())
    }
}

/// Broadcast celebrations to every subscriber, e.g. UI event loops
impl CelebrationSink for broadcast::Sender<Celebration> {
    fn celebrate(&self, celebration: &Celebration) -> Result<(), String> {
        self.send(celebration.clone())
            .map(|_| ())
            .map_err(|_| "no celebration subscribers".to_string())
    }
}
