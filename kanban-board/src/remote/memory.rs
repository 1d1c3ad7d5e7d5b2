//! In-memory authoritative store.
//!
//! [`RemoteTables`] holds flat board, list and card tables and implements the
//! server side of every [`RemoteOperation`]. [`InMemoryRemote`] wraps it with
//! fault injection, artificial latency and call recording so coordinator
//! behaviour can be exercised without a network.

use super::{ArchiveAck, BatchAck, BoardData, CardPlacement, RemoteOperation, RemoteResponse, RemoteStore};
use crate::ordering::clamp_index;
use crate::types::{Board, BoardId, Card, CardId, List, ListId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Flat tables as a store would keep them.
///
/// Lists in `lists` carry no cards; cards reference their list by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteTables {
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

type Applied = std::result::Result<Value, String>;

fn to_data<T: Serialize>(value: &T) -> Applied {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

impl RemoteTables {
    /// Insert a board together with nested lists and cards
    pub fn insert_board(&mut self, board: Board, lists: Vec<List>) {
        for mut list in lists {
            list.board_id = board.id.clone();
            for mut card in std::mem::take(&mut list.cards) {
                card.list_id = list.id.clone();
                self.cards.push(card);
            }
            self.lists.push(list);
        }
        self.boards.push(board);
    }

    pub fn board_ids(&self) -> Vec<BoardId> {
        self.boards.iter().map(|b| b.id.clone()).collect()
    }

    pub fn find_list(&self, id: &ListId) -> Option<&List> {
        self.lists.iter().find(|l| &l.id == id)
    }

    pub fn find_card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|c| &c.id == id)
    }

    fn active_list_mut(&mut self, id: &ListId) -> std::result::Result<&mut List, String> {
        self.lists
            .iter_mut()
            .find(|l| &l.id == id && !l.is_archived)
            .ok_or_else(|| format!("list not found: {id}"))
    }

    fn active_card_mut(&mut self, id: &CardId) -> std::result::Result<&mut Card, String> {
        self.cards
            .iter_mut()
            .find(|c| &c.id == id && !c.is_archived)
            .ok_or_else(|| format!("card not found: {id}"))
    }

    /// Ids of a list's active cards in position order, skipping `except`
    fn ordered_card_ids(&self, list_id: &ListId, except: &CardId) -> Vec<CardId> {
        let mut cards: Vec<&Card> = self
            .cards
            .iter()
            .filter(|c| &c.list_id == list_id && !c.is_archived && &c.id != except)
            .collect();
        cards.sort_by_key(|c| c.position);
        cards.into_iter().map(|c| c.id.clone()).collect()
    }

    fn assign_positions(&mut self, ordered: &[CardId], now: DateTime<Utc>) {
        for (position, id) in ordered.iter().enumerate() {
            if let Some(card) = self.cards.iter_mut().find(|c| &c.id == id) {
                if card.position != position {
                    card.position = position;
                    card.updated_at = Some(now);
                }
            }
        }
    }

    fn fetch(&self, board_id: &BoardId) -> Applied {
        let board = self
            .boards
            .iter()
            .find(|b| &b.id == board_id)
            .ok_or_else(|| format!("board not found: {board_id}"))?;

        let mut lists: Vec<List> = self
            .lists
            .iter()
            .filter(|l| &l.board_id == board_id && !l.is_archived)
            .cloned()
            .collect();
        lists.sort_by_key(|l| l.position);
        for list in &mut lists {
            let mut cards: Vec<Card> = self
                .cards
                .iter()
                .filter(|c| c.list_id == list.id && !c.is_archived)
                .cloned()
                .collect();
            cards.sort_by_key(|c| c.position);
            list.cards = cards;
        }

        to_data(&BoardData {
            board: board.clone(),
            lists,
        })
    }

    /// Execute one operation against the tables.
    ///
    /// `Err` carries the message a store would send back in `error`.
    pub fn apply(&mut self, operation: RemoteOperation, now: DateTime<Utc>) -> Applied {
        match operation {
            RemoteOperation::FetchBoardData { board_id } => self.fetch(&board_id),

            RemoteOperation::CreateList {
                board_id,
                name,
                position,
                color,
                created_by,
            } => {
                if !self.boards.iter().any(|b| b.id == board_id) {
                    return Err(format!("board not found: {board_id}"));
                }
                let mut list = List::new(board_id, name, position).with_color(color);
                list.created_by = Some(created_by);
                list.created_at = Some(now);
                list.updated_at = Some(now);
                self.lists.push(list.clone());
                to_data(&list)
            }

            RemoteOperation::UpdateList { id, patch } => {
                let list = self.active_list_mut(&id)?;
                patch.apply_to(list);
                list.updated_at = Some(now);
                to_data(&*list)
            }

            RemoteOperation::ArchiveList { id } => {
                let list = self.active_list_mut(&id)?;
                list.is_archived = true;
                list.updated_at = Some(now);
                to_data(&ArchiveAck {
                    id: id.to_string(),
                    is_archived: true,
                })
            }

            RemoteOperation::BatchUpdateListPositions { updates } => {
                let mut affected = 0;
                for update in updates {
                    if let Ok(list) = self.active_list_mut(&update.id) {
                        list.position = update.position;
                        list.updated_at = Some(now);
                        affected += 1;
                    }
                }
                to_data(&BatchAck { affected })
            }

            RemoteOperation::CreateCard {
                list_id,
                title,
                position,
                created_by,
            } => {
                self.active_list_mut(&list_id)?;
                let mut card = Card::new(title, list_id, position);
                card.created_by = Some(created_by);
                card.created_at = Some(now);
                card.updated_at = Some(now);
                self.cards.push(card.clone());
                to_data(&card)
            }

            RemoteOperation::UpdateCardFields { id, patch } => {
                let card = self.active_card_mut(&id)?;
                patch.apply_to(card);
                card.updated_at = Some(now);
                to_data(&*card)
            }

            RemoteOperation::UpdateCardPosition {
                id,
                list_id,
                position,
                is_completed,
            } => {
                self.active_list_mut(&list_id)?;
                let source_list = self.active_card_mut(&id)?.list_id.clone();

                if source_list != list_id {
                    let remaining = self.ordered_card_ids(&source_list, &id);
                    self.assign_positions(&remaining, now);
                }
                let mut target = self.ordered_card_ids(&list_id, &id);
                let index = clamp_index(position, target.len());
                target.insert(index, id.clone());

                let card = self.active_card_mut(&id)?;
                card.list_id = list_id;
                if let Some(completed) = is_completed {
                    card.is_completed = completed;
                }
                card.updated_at = Some(now);
                self.assign_positions(&target, now);

                let card = self.active_card_mut(&id)?;
                to_data(&CardPlacement {
                    id: card.id.clone(),
                    list_id: card.list_id.clone(),
                    position: card.position,
                    is_completed: card.is_completed,
                    updated_at: card.updated_at,
                })
            }

            RemoteOperation::BatchUpdatePositions { updates } => {
                let mut affected = 0;
                for update in updates {
                    if let Ok(card) = self.active_card_mut(&update.id) {
                        card.position = update.position;
                        card.updated_at = Some(now);
                        affected += 1;
                    }
                }
                to_data(&BatchAck { affected })
            }

            RemoteOperation::ArchiveCard { id } => {
                let card = self.active_card_mut(&id)?;
                card.is_archived = true;
                card.updated_at = Some(now);
                to_data(&ArchiveAck {
                    id: id.to_string(),
                    is_archived: true,
                })
            }
        }
    }
}

/// One call as the store received it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedCall {
    pub operation: String,
    pub variables: Value,
}

#[derive(Debug, Clone)]
enum Fault {
    Error(String),
    Data(Value),
}

impl Fault {
    fn into_response(self) -> RemoteResponse {
        match self {
            Fault::Error(message) => RemoteResponse::error(message),
            Fault::Data(data) => RemoteResponse::data(data),
        }
    }
}

#[derive(Debug, Clone)]
struct FaultRule {
    operation: String,
    fault: Fault,
    once: bool,
}

/// An in-process [`RemoteStore`] backed by [`RemoteTables`]
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    tables: Mutex<RemoteTables>,
    faults: Mutex<VecDeque<FaultRule>>,
    latency: Mutex<Option<Duration>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing tables
    pub fn from_tables(tables: RemoteTables) -> Self {
        Self {
            tables: Mutex::new(tables),
            ..Self::default()
        }
    }

    /// Start with one board holding the given lists and cards
    pub fn with_board(board: Board, lists: Vec<List>) -> Self {
        let mut tables = RemoteTables::default();
        tables.insert_board(board, lists);
        Self::from_tables(tables)
    }

    /// A copy of the current tables
    pub async fn tables(&self) -> RemoteTables {
        self.tables.lock().await.clone()
    }

    /// Fail the next call to `operation` with `message`
    pub async fn fail_next(&self, operation: &str, message: impl Into<String>) {
        self.push_fault(operation, Fault::Error(message.into()), true).await;
    }

    /// Fail every call to `operation` until faults are cleared
    pub async fn fail_always(&self, operation: &str, message: impl Into<String>) {
        self.push_fault(operation, Fault::Error(message.into()), false).await;
    }

    /// Answer the next call to `operation` with `data`, bypassing the tables
    pub async fn respond_next(&self, operation: &str, data: Value) {
        self.push_fault(operation, Fault::Data(data), true).await;
    }

    pub async fn clear_faults(&self) {
        self.faults.lock().await.clear();
    }

    /// Delay every call by `latency`
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().await = latency;
    }

    /// Every call received so far, oldest first
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Number of calls received for `operation`
    pub async fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    async fn push_fault(&self, operation: &str, fault: Fault, once: bool) {
        self.faults.lock().await.push_back(FaultRule {
            operation: operation.to_string(),
            fault,
            once,
        });
    }

    async fn take_fault(&self, operation: &str) -> Option<Fault> {
        let mut faults = self.faults.lock().await;
        let index = faults.iter().position(|r| r.operation == operation)?;
        if faults[index].once {
            faults.remove(index).map(|r| r.fault)
        } else {
            Some(faults[index].fault.clone())
        }
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn execute(&self, operation: &str, variables: Value) -> RemoteResponse {
        self.calls.lock().await.push(RecordedCall {
            operation: operation.to_string(),
            variables: variables.clone(),
        });

        let latency = *self.latency.lock().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(fault) = self.take_fault(operation).await {
            debug!(operation, "injected fault");
            return fault.into_response();
        }

        let op = match RemoteOperation::decode(operation, variables) {
            Ok(op) => op,
            Err(e) => return RemoteResponse::error(e.to_string()),
        };
        match self.tables.lock().await.apply(op, Utc::now()) {
            Ok(data) => RemoteResponse::data(data),
            Err(message) => RemoteResponse::error(message),
        }
    }
}
