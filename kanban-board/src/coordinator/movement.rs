//! Card and list moves: the optimistic path.
//!
//! A move computes its target snapshot with the ordering engine, commits it
//! immediately, then issues one remote write. Within a list that write is a
//! batch of every renumbered position; across lists it is a single placement
//! of the moved card carrying `list_id`, `position` and, when the target is a
//! final list, `is_completed`. Any failure restores the pre-move snapshot.

use super::transaction::{MoveState, MoveTransaction};
use super::BoardCoordinator;
use crate::celebration::Celebration;
use crate::error::{BoardError, MutationOutcome, Result};
use crate::logging::Pretty;
use crate::ordering;
use crate::remote::{CardPlacement, RemoteOperation, RemoteStore};
use crate::types::{Card, CardId, ListId};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;
use tracing::{debug, warn};

/// What a card move did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveReport {
    /// The card as it now sits in the snapshot
    pub card: Card,
    pub from_list: ListId,
    pub to_list: ListId,
    pub from_index: usize,
    /// The clamped index the card landed on
    pub to_index: usize,
    pub state: MoveState,
    /// The move marked the card complete
    pub derived_completion: bool,
    /// A celebration was delivered to the sink
    pub celebrated: bool,
}

/// What a list move did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListMoveReport {
    pub list_id: ListId,
    pub from_index: usize,
    pub to_index: usize,
    pub state: MoveState,
}

impl<R: RemoteStore> BoardCoordinator<R> {
    /// Move a card to `target_index` of `target_list_id`.
    ///
    /// `source_list_id` must be the list currently holding the card. The
    /// index is clamped. Moving a card onto its own slot confirms without a
    /// remote call.
    pub async fn move_card(
        &self,
        card_id: &CardId,
        source_list_id: &ListId,
        target_list_id: &ListId,
        target_index: usize,
    ) -> MutationOutcome<MoveReport> {
        let started = Instant::now();
        let input = json!({
            "card_id": card_id,
            "source_list_id": source_list_id,
            "target_list_id": target_list_id,
            "target_index": target_index,
        });
        let result = self
            .move_card_inner(card_id, source_list_id, target_list_id, target_index)
            .await;
        self.finish("move card", input, started, result).await
    }

    async fn move_card_inner(
        &self,
        card_id: &CardId,
        source_list_id: &ListId,
        target_list_id: &ListId,
        target_index: usize,
    ) -> Result<MoveReport> {
        let _turn = self.gate.lock().await;
        let snapshot = self.snapshot.read().await.clone();

        let source = snapshot
            .find_list(source_list_id)
            .ok_or_else(|| BoardError::ListNotFound {
                id: source_list_id.to_string(),
            })?;
        let target = snapshot
            .find_list(target_list_id)
            .ok_or_else(|| BoardError::ListNotFound {
                id: target_list_id.to_string(),
            })?;
        let from_index = source
            .card_index(card_id)
            .ok_or_else(|| BoardError::CardNotFound {
                id: card_id.to_string(),
            })?;

        if source.id == target.id {
            let plan = ordering::move_within_list(source, card_id, target_index).ok_or_else(|| {
                BoardError::CardNotFound {
                    id: card_id.to_string(),
                }
            })?;
            if plan.is_noop() {
                debug!(card = %card_id, index = from_index, "move onto own slot, nothing to write");
                return Ok(MoveReport {
                    card: source.cards[from_index].clone(),
                    from_list: source.id.clone(),
                    to_list: target.id.clone(),
                    from_index,
                    to_index: from_index,
                    state: MoveState::Confirmed,
                    derived_completion: false,
                    celebrated: false,
                });
            }
            debug!(card = %card_id, from = plan.from_index, to = plan.to_index, "moving card within list");
            debug!("position updates: {}", Pretty(&plan.position_updates));

            let mut list = source.clone();
            list.cards = plan.cards;
            let next = snapshot.with_list(list);
            let expected = plan.position_updates.len();
            let op = RemoteOperation::BatchUpdatePositions {
                updates: plan.position_updates,
            };

            let mut tx = MoveTransaction::new(&self.snapshot);
            tx.apply(next).await;
            if let Err(error) = self.batch_write(&op, expected).await {
                tx.rollback().await;
                warn!(card = %card_id, state = %tx.state(), %error, "rolled back card move");
                return Err(error);
            }
            tx.confirm(|_| {}).await;
            self.debug_check_invariants().await;

            let card = self
                .snapshot
                .read()
                .await
                .find_card(card_id)
                .cloned()
                .ok_or_else(|| BoardError::CardNotFound {
                    id: card_id.to_string(),
                })?;
            return Ok(MoveReport {
                card,
                from_list: source.id.clone(),
                to_list: target.id.clone(),
                from_index: plan.from_index,
                to_index: plan.to_index,
                state: tx.state(),
                derived_completion: false,
                celebrated: false,
            });
        }

        let plan = ordering::move_across_lists(source, target, card_id, target_index).ok_or_else(|| {
            BoardError::CardNotFound {
                id: card_id.to_string(),
            }
        })?;
        debug!(
            card = %card_id,
            from = %source.id,
            to = %target.id,
            index = plan.moved_card.position,
            derived_completion = plan.derived_completion,
            "moving card across lists"
        );

        let mut next_source = source.clone();
        next_source.cards = plan.source_cards;
        let mut next_target = target.clone();
        next_target.cards = plan.target_cards;
        let next = snapshot.with_list(next_source).with_list(next_target);

        let to_index = plan.moved_card.position;
        let op = RemoteOperation::UpdateCardPosition {
            id: card_id.clone(),
            list_id: target.id.clone(),
            position: to_index,
            is_completed: plan.derived_completion.then_some(true),
        };

        let mut tx = MoveTransaction::new(&self.snapshot);
        tx.apply(next).await;
        let placement: CardPlacement = match self.client.call(&op).await {
            Ok(placement) => placement,
            Err(error) => {
                tx.rollback().await;
                warn!(card = %card_id, state = %tx.state(), %error, "rolled back card move");
                return Err(error);
            }
        };
        if placement.list_id != target.id || placement.position != to_index {
            warn!(
                card = %card_id,
                list = %placement.list_id,
                position = placement.position,
                "store placed card differently than requested"
            );
        }

        let mut card = plan.moved_card;
        tx.confirm(|snapshot| {
            if let Some(moved) = snapshot.card_mut(card_id) {
                moved.is_completed = placement.is_completed;
                if placement.updated_at.is_some() {
                    moved.updated_at = placement.updated_at;
                }
                card = moved.clone();
            }
        })
        .await;
        self.debug_check_invariants().await;

        let celebrated = target.confetti
            && self.celebrate(Celebration {
                board_id: snapshot.board().id.clone(),
                list_id: target.id.clone(),
                list_name: target.name.clone(),
                card_id: card_id.clone(),
                card_title: card.title.clone(),
                completed: plan.derived_completion,
            });

        Ok(MoveReport {
            card,
            from_list: source.id.clone(),
            to_list: target.id.clone(),
            from_index,
            to_index,
            state: tx.state(),
            derived_completion: plan.derived_completion,
            celebrated,
        })
    }

    /// Move a list to `target_index` among the board's lists
    pub async fn move_list(&self, list_id: &ListId, target_index: usize) -> MutationOutcome<ListMoveReport> {
        let started = Instant::now();
        let input = json!({ "list_id": list_id, "target_index": target_index });
        let result = self.move_list_inner(list_id, target_index).await;
        self.finish("move list", input, started, result).await
    }

    async fn move_list_inner(&self, list_id: &ListId, target_index: usize) -> Result<ListMoveReport> {
        let _turn = self.gate.lock().await;
        let snapshot = self.snapshot.read().await.clone();

        let plan = ordering::move_list(snapshot.lists(), list_id, target_index).ok_or_else(|| {
            BoardError::ListNotFound {
                id: list_id.to_string(),
            }
        })?;
        if plan.is_noop() {
            return Ok(ListMoveReport {
                list_id: list_id.clone(),
                from_index: plan.from_index,
                to_index: plan.to_index,
                state: MoveState::Confirmed,
            });
        }
        debug!(list = %list_id, from = plan.from_index, to = plan.to_index, "moving list");

        let expected = plan.position_updates.len();
        let op = RemoteOperation::BatchUpdateListPositions {
            updates: plan.position_updates,
        };

        let mut tx = MoveTransaction::new(&self.snapshot);
        tx.apply(snapshot.with_lists(plan.lists)).await;
        if let Err(error) = self.batch_write(&op, expected).await {
            tx.rollback().await;
            warn!(list = %list_id, state = %tx.state(), %error, "rolled back list move");
            return Err(error);
        }
        tx.confirm(|_| {}).await;
        self.debug_check_invariants().await;

        Ok(ListMoveReport {
            list_id: list_id.clone(),
            from_index: plan.from_index,
            to_index: plan.to_index,
            state: tx.state(),
        })
    }
}
