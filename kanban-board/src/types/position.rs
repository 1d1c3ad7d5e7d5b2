//! Position types for dense, zero-based ordering.

use super::ids::{CardId, ListId};
use serde::{Deserialize, Serialize};

/// One renumbered sibling: the id and its new dense rank
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionUpdate<I> {
    pub id: I,
    pub position: usize,
}

impl<I> PositionUpdate<I> {
    pub fn new(id: I, position: usize) -> Self {
        Self { id, position }
    }
}

/// Renumbered card within a list
pub type CardPositionUpdate = PositionUpdate<CardId>;

/// Renumbered list within a board
pub type ListPositionUpdate = PositionUpdate<ListId>;

/// Anything that carries a dense sibling rank
pub trait Positioned {
    type Id: Clone;

    fn id(&self) -> &Self::Id;
    fn position(&self) -> usize;
    fn set_position(&mut self, position: usize);
}

impl Positioned for super::card::Card {
    type Id = CardId;

    fn id(&self) -> &CardId {
        &self.id
    }

    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

impl Positioned for super::board::List {
    type Id = ListId;

    fn id(&self) -> &ListId {
        &self.id
    }

    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}
