//! Board-level types: Board and List

use super::card::Card;
use super::ids::{BoardId, CardId, ListId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kanban board - metadata only, lists are carried by the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    /// Optional background styling (CSS color or image reference)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Board {
    /// Create a new board with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BoardId::new(),
            name: name.into(),
            background: None,
        }
    }

    /// Use a specific id instead of a freshly minted one
    pub fn with_id(mut self, id: impl Into<BoardId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the background styling
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Get the default lists for a new board
    pub fn default_lists(&self) -> Vec<List> {
        vec![
            List::new(self.id.clone(), "To Do", 0),
            List::new(self.id.clone(), "Doing", 1),
            List::new(self.id.clone(), "Done", 2)
                .with_final(true)
                .with_confetti(true),
        ]
    }
}

/// A list defines a workflow stage and owns an ordered run of cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub board_id: BoardId,
    pub name: String,
    /// Dense zero-based rank among the board's non-archived lists
    pub position: usize,
    /// 6-character hex color code without #
    #[serde(default)]
    pub color: String,
    /// Celebrate when cards arrive here
    #[serde(default)]
    pub confetti: bool,
    /// Cards moved here are marked complete
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_archived: bool,
    /// Cards ordered by ascending position
    #[serde(default)]
    pub cards: Vec<Card>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl List {
    /// Create a new, empty list with an auto-assigned color
    pub fn new(board_id: BoardId, name: impl Into<String>, position: usize) -> Self {
        let name = name.into();
        let color = crate::auto_color::auto_color(&name).to_string();
        Self {
            id: ListId::new(),
            board_id,
            name,
            position,
            color,
            confetti: false,
            is_final: false,
            is_archived: false,
            cards: Vec::new(),
            created_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Use a specific id instead of a freshly minted one
    pub fn with_id(mut self, id: impl Into<ListId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    pub fn with_confetti(mut self, confetti: bool) -> Self {
        self.confetti = confetti;
        self
    }

    /// Replace the cards, stamping each with this list's id
    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        for card in &mut self.cards {
            card.list_id = self.id.clone();
        }
        self
    }

    /// Find a card by ID
    pub fn find_card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|c| &c.id == id)
    }

    /// Index of a card within this list
    pub fn card_index(&self, id: &CardId) -> Option<usize> {
        self.cards.iter().position(|c| &c.id == id)
    }

    /// Number of cards in the list
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_creation() {
        let board = Board::new("Roadmap").with_background("#112233");
        assert_eq!(board.name, "Roadmap");
        assert_eq!(board.background.as_deref(), Some("#112233"));
    }

    #[test]
    fn test_default_lists() {
        let board = Board::new("Test");
        let lists = board.default_lists();
        assert_eq!(lists.len(), 3);
        assert_eq!(lists[0].name, "To Do");
        assert_eq!(lists[2].position, 2);
        assert!(lists[2].is_final);
        assert!(lists[2].confetti);
        assert!(!lists[0].is_final);
        assert!(lists.iter().all(|l| l.board_id == board.id));
    }

    #[test]
    fn test_with_cards_stamps_list_id() {
        let list = List::new(BoardId::from_string("b"), "Doing", 0).with_id("doing");
        let card = Card::new("x", ListId::from_string("elsewhere"), 0);
        let list = list.with_cards(vec![card]);
        assert_eq!(list.cards[0].list_id.as_str(), "doing");
        assert_eq!(list.card_count(), 1);
    }
}
