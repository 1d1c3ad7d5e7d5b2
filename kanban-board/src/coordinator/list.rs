//! List mutations: create, update, archive.

use super::BoardCoordinator;
use crate::auto_color::auto_color;
use crate::error::{BoardError, MutationOutcome, Result};
use crate::remote::{ArchiveAck, RemoteOperation, RemoteStore};
use crate::types::{List, ListId, ListPatch};
use serde_json::json;
use std::time::Instant;
use tracing::debug;

impl<R: RemoteStore> BoardCoordinator<R> {
    /// Create a list at the end of the board.
    ///
    /// Waits for the store to assign an id; nothing is applied locally until
    /// the store confirms. Without `color` one is derived from the name.
    pub async fn create_list(&self, name: &str, color: Option<&str>) -> MutationOutcome<List> {
        let started = Instant::now();
        let input = json!({ "name": name, "color": color });
        let result = self.create_list_inner(name, color).await;
        self.finish("create list", input, started, result).await
    }

    async fn create_list_inner(&self, name: &str, color: Option<&str>) -> Result<List> {
        let name = self.validate_text("name", name)?;
        let color = match color {
            Some(color) => Self::validate_color("color", color)?,
            None => auto_color(&name).to_string(),
        };

        let _turn = self.gate.lock().await;
        let (board_id, position) = {
            let snapshot = self.snapshot.read().await;
            (snapshot.board().id.clone(), snapshot.lists().len())
        };
        debug!(%name, position, "creating list");

        let mut list: List = self
            .client
            .call(&RemoteOperation::CreateList {
                board_id,
                name,
                position,
                color,
                created_by: self.user.clone(),
            })
            .await?;
        list.cards.clear();

        let mut snapshot = self.snapshot.write().await;
        snapshot.push_list(list);
        let created = snapshot.lists()[snapshot.lists().len() - 1].clone();
        drop(snapshot);
        self.debug_check_invariants().await;
        Ok(created)
    }

    /// Update list fields; only the fields set in `patch` are sent
    pub async fn update_list(&self, id: &ListId, patch: ListPatch) -> MutationOutcome<List> {
        let started = Instant::now();
        let input = json!({ "id": id, "patch": &patch });
        let result = self.update_list_inner(id, patch).await;
        self.finish("update list", input, started, result).await
    }

    async fn update_list_inner(&self, id: &ListId, mut patch: ListPatch) -> Result<List> {
        if patch.is_empty() {
            return Err(BoardError::validation("patch", "nothing to update"));
        }
        if let Some(name) = &patch.name {
            patch.name = Some(self.validate_text("name", name)?);
        }
        if let Some(color) = &patch.color {
            patch.color = Some(Self::validate_color("color", color)?);
        }

        let _turn = self.gate.lock().await;
        if self.snapshot.read().await.find_list(id).is_none() {
            return Err(BoardError::ListNotFound { id: id.to_string() });
        }
        debug!(list = %id, "updating list");

        let updated: List = self
            .client
            .call(&RemoteOperation::UpdateList {
                id: id.clone(),
                patch,
            })
            .await?;

        let mut snapshot = self.snapshot.write().await;
        let list = snapshot
            .list_mut(id)
            .ok_or_else(|| BoardError::ListNotFound { id: id.to_string() })?;
        list.name = updated.name;
        list.color = updated.color;
        list.confetti = updated.confetti;
        list.is_final = updated.is_final;
        list.updated_at = updated.updated_at;
        Ok(list.clone())
    }

    /// Archive a list.
    ///
    /// The list stays in the snapshot until the store confirms, then it is
    /// removed and the remaining lists are renumbered.
    pub async fn delete_list(&self, id: &ListId) -> MutationOutcome<ArchiveAck> {
        let started = Instant::now();
        let input = json!({ "id": id });
        let result = self.delete_list_inner(id).await;
        self.finish("archive list", input, started, result).await
    }

    async fn delete_list_inner(&self, id: &ListId) -> Result<ArchiveAck> {
        let _turn = self.gate.lock().await;
        if self.snapshot.read().await.find_list(id).is_none() {
            return Err(BoardError::ListNotFound { id: id.to_string() });
        }
        debug!(list = %id, "archiving list");

        let ack: ArchiveAck = self
            .client
            .call(&RemoteOperation::ArchiveList { id: id.clone() })
            .await?;
        if !ack.is_archived {
            return Err(BoardError::malformed("ArchiveList", "store did not archive the list"));
        }

        let shifted = self
            .snapshot
            .write()
            .await
            .remove_list(id)
            .unwrap_or_default();
        self.write_list_positions(shifted).await;
        self.debug_check_invariants().await;
        Ok(ack)
    }
}
