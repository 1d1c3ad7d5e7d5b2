//! The catalogue of remote operations and their response payloads.

use crate::error::{BoardError, Result};
use crate::types::{
    Board, BoardId, CardId, CardPatch, CardPositionUpdate, List, ListId, ListPatch,
    ListPositionUpdate, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Every operation the coordinator issues.
///
/// Serializes adjacently tagged, `{"operation": name, "variables": {...}}`,
/// which is also how a store decodes what it was asked to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "variables")]
pub enum RemoteOperation {
    FetchBoardData {
        board_id: BoardId,
    },
    CreateList {
        board_id: BoardId,
        name: String,
        position: usize,
        color: String,
        created_by: UserId,
    },
    UpdateList {
        id: ListId,
        patch: ListPatch,
    },
    ArchiveList {
        id: ListId,
    },
    BatchUpdateListPositions {
        updates: Vec<ListPositionUpdate>,
    },
    CreateCard {
        list_id: ListId,
        title: String,
        position: usize,
        created_by: UserId,
    },
    UpdateCardFields {
        id: CardId,
        patch: CardPatch,
    },
    /// Place a card at `position` in `list_id`; the store renumbers the
    /// affected lists itself, so one write carries the whole move.
    UpdateCardPosition {
        id: CardId,
        list_id: ListId,
        position: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_completed: Option<bool>,
    },
    BatchUpdatePositions {
        updates: Vec<CardPositionUpdate>,
    },
    ArchiveCard {
        id: CardId,
    },
}

impl RemoteOperation {
    /// The operation name sent to the store
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchBoardData { .. } => "FetchBoardData",
            Self::CreateList { .. } => "CreateList",
            Self::UpdateList { .. } => "UpdateList",
            Self::ArchiveList { .. } => "ArchiveList",
            Self::BatchUpdateListPositions { .. } => "BatchUpdateListPositions",
            Self::CreateCard { .. } => "CreateCard",
            Self::UpdateCardFields { .. } => "UpdateCardFields",
            Self::UpdateCardPosition { .. } => "UpdateCardPosition",
            Self::BatchUpdatePositions { .. } => "BatchUpdatePositions",
            Self::ArchiveCard { .. } => "ArchiveCard",
        }
    }

    /// The variables object sent alongside the name
    pub fn variables(&self) -> Result<Value> {
        let mut envelope = serde_json::to_value(self)?;
        Ok(envelope
            .get_mut("variables")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// Rebuild an operation from a name and variables, as a store receives it
    pub fn decode(name: &str, variables: Value) -> Result<Self> {
        serde_json::from_value(json!({ "operation": name, "variables": variables }))
            .map_err(|e| BoardError::malformed(name, e.to_string()))
    }

    /// False only for reads
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::FetchBoardData { .. })
    }
}

/// Payload of `FetchBoardData`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardData {
    pub board: Board,
    /// Ordered non-archived lists, each with ordered non-archived cards
    pub lists: Vec<List>,
}

/// Payload of `ArchiveList` / `ArchiveCard`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveAck {
    pub id: String,
    pub is_archived: bool,
}

/// Payload of the batch position operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAck {
    pub affected: usize,
}

/// Payload of `UpdateCardPosition`: positional and derived fields only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPlacement {
    pub id: CardId,
    pub list_id: ListId,
    pub position: usize,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PositionUpdate;

    #[test]
    fn test_name_and_variables() {
        let op = RemoteOperation::UpdateCardPosition {
            id: CardId::from_string("c1"),
            list_id: ListId::from_string("done"),
            position: 0,
            is_completed: Some(true),
        };
        assert_eq!(op.name(), "UpdateCardPosition");
        let vars = op.variables().unwrap();
        assert_eq!(vars["id"], "c1");
        assert_eq!(vars["list_id"], "done");
        assert_eq!(vars["is_completed"], true);
        assert!(op.is_mutation());
    }

    #[test]
    fn test_is_completed_omitted_when_unchanged() {
        let op = RemoteOperation::UpdateCardPosition {
            id: CardId::from_string("c1"),
            list_id: ListId::from_string("todo"),
            position: 2,
            is_completed: None,
        };
        let vars = op.variables().unwrap();
        assert!(vars.get("is_completed").is_none());
    }

    #[test]
    fn test_decode_matches_encode() {
        let op = RemoteOperation::BatchUpdatePositions {
            updates: vec![
                PositionUpdate::new(CardId::from_string("a"), 0),
                PositionUpdate::new(CardId::from_string("b"), 1),
            ],
        };
        let decoded = RemoteOperation::decode(op.name(), op.variables().unwrap()).unwrap();
        assert_eq!(decoded, op);
    }

    #[test]
    fn test_decode_unknown_operation() {
        let err = RemoteOperation::decode("DropTables", json!({})).unwrap_err();
        assert!(matches!(err, BoardError::MalformedPayload { .. }));
    }

    #[test]
    fn test_update_card_fields_sends_only_patch_subset() {
        let op = RemoteOperation::UpdateCardFields {
            id: CardId::from_string("c1"),
            patch: CardPatch::new().with_title("New title"),
        };
        let vars = op.variables().unwrap();
        assert_eq!(vars["patch"], json!({ "title": "New title" }));
        assert!(!RemoteOperation::FetchBoardData {
            board_id: BoardId::from_string("b")
        }
        .is_mutation());
    }
}
