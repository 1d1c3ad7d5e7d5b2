//! Card mutations: create, update fields, archive.

use super::BoardCoordinator;
use crate::error::{BoardError, MutationOutcome, Result};
use crate::remote::{ArchiveAck, RemoteOperation, RemoteStore};
use crate::types::{Card, CardId, CardPatch, ListId};
use serde_json::json;
use std::time::Instant;
use tracing::debug;

impl<R: RemoteStore> BoardCoordinator<R> {
    /// Create a card at the end of a list
    pub async fn create_card(&self, list_id: &ListId, title: &str) -> MutationOutcome<Card> {
        let started = Instant::now();
        let input = json!({ "list_id": list_id, "title": title });
        let result = self.create_card_inner(list_id, title).await;
        self.finish("create card", input, started, result).await
    }

    async fn create_card_inner(&self, list_id: &ListId, title: &str) -> Result<Card> {
        let title = self.validate_text("title", title)?;

        let _turn = self.gate.lock().await;
        let position = self
            .snapshot
            .read()
            .await
            .card_count(list_id)
            .ok_or_else(|| BoardError::ListNotFound {
                id: list_id.to_string(),
            })?;
        debug!(list = %list_id, position, "creating card");

        let card: Card = self
            .client
            .call(&RemoteOperation::CreateCard {
                list_id: list_id.clone(),
                title,
                position,
                created_by: self.user.clone(),
            })
            .await?;

        let id = card.id.clone();
        let mut snapshot = self.snapshot.write().await;
        if !snapshot.push_card(list_id, card) {
            return Err(BoardError::ListNotFound {
                id: list_id.to_string(),
            });
        }
        let created = snapshot
            .find_card(&id)
            .cloned()
            .ok_or_else(|| BoardError::CardNotFound { id: id.to_string() })?;
        drop(snapshot);
        self.debug_check_invariants().await;
        Ok(created)
    }

    /// Update card fields; only the fields set in `patch` are sent.
    ///
    /// A patch that archives the card removes it from the snapshot once the
    /// store confirms, exactly like [`delete_card`](Self::delete_card).
    pub async fn update_card(&self, id: &CardId, patch: CardPatch) -> MutationOutcome<Card> {
        let started = Instant::now();
        let input = json!({ "id": id, "patch": &patch });
        let result = self.update_card_inner(id, patch).await;
        self.finish("update card", input, started, result).await
    }

    async fn update_card_inner(&self, id: &CardId, mut patch: CardPatch) -> Result<Card> {
        if patch.is_empty() {
            return Err(BoardError::validation("patch", "nothing to update"));
        }
        if let Some(title) = &patch.title {
            patch.title = Some(self.validate_text("title", title)?);
        }
        if let Some(Some(color)) = &patch.cover_color {
            patch.cover_color = Some(Some(Self::validate_color("cover_color", color)?));
        }

        let _turn = self.gate.lock().await;
        if self.snapshot.read().await.find_card(id).is_none() {
            return Err(BoardError::CardNotFound { id: id.to_string() });
        }
        debug!(card = %id, "updating card");

        let updated: Card = self
            .client
            .call(&RemoteOperation::UpdateCardFields {
                id: id.clone(),
                patch,
            })
            .await?;

        if updated.is_archived {
            let shifted = self.snapshot.write().await.remove_card(id).unwrap_or_default();
            self.write_card_positions(shifted).await;
            self.debug_check_invariants().await;
            return Ok(updated);
        }

        let mut snapshot = self.snapshot.write().await;
        let card = snapshot
            .card_mut(id)
            .ok_or_else(|| BoardError::CardNotFound { id: id.to_string() })?;
        card.title = updated.title;
        card.description = updated.description;
        card.due_date = updated.due_date;
        card.is_completed = updated.is_completed;
        card.cover_color = updated.cover_color;
        card.story_points = updated.story_points;
        card.priority = updated.priority;
        card.updated_at = updated.updated_at;
        Ok(card.clone())
    }

    /// Archive a card.
    ///
    /// The card stays visible until the store confirms, then it is removed
    /// and its siblings are renumbered.
    pub async fn delete_card(&self, id: &CardId) -> MutationOutcome<ArchiveAck> {
        let started = Instant::now();
        let input = json!({ "id": id });
        let result = self.delete_card_inner(id).await;
        self.finish("archive card", input, started, result).await
    }

    async fn delete_card_inner(&self, id: &CardId) -> Result<ArchiveAck> {
        let _turn = self.gate.lock().await;
        if self.snapshot.read().await.find_card(id).is_none() {
            return Err(BoardError::CardNotFound { id: id.to_string() });
        }
        debug!(card = %id, "archiving card");

        let ack: ArchiveAck = self
            .client
            .call(&RemoteOperation::ArchiveCard { id: id.clone() })
            .await?;
        if !ack.is_archived {
            return Err(BoardError::malformed("ArchiveCard", "store did not archive the card"));
        }

        let shifted = self.snapshot.write().await.remove_card(id).unwrap_or_default();
        self.write_card_positions(shifted).await;
        self.debug_check_invariants().await;
        Ok(ack)
    }
}
