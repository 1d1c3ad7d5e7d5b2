//! BoardSnapshot - the in-memory board the UI renders from.
//!
//! A snapshot holds one board and its non-archived lists, each list holding its
//! non-archived cards in ascending position order. Accessors are read-only;
//! changes are produced by the ordering engine and committed by the coordinator.

use crate::ordering::{self, InvariantViolation};
use crate::types::{Board, Card, CardId, CardPositionUpdate, List, ListId, ListPositionUpdate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One board with its ordered lists and cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    board: Board,
    lists: Vec<List>,
}

impl BoardSnapshot {
    /// Build a snapshot from fetched records.
    ///
    /// Archived lists and cards are dropped, everything is sorted by position
    /// and then renumbered densely, so a store with gaps still yields a valid
    /// snapshot.
    pub fn new(board: Board, lists: Vec<List>) -> Self {
        let mut lists: Vec<List> = lists.into_iter().filter(|l| !l.is_archived).collect();
        lists.sort_by_key(|l| l.position);
        let shifted_lists = ordering::renumber(&mut lists).len();

        let mut shifted_cards = 0;
        for list in &mut lists {
            list.cards.retain(|c| !c.is_archived);
            list.cards.sort_by_key(|c| c.position);
            for card in &mut list.cards {
                card.list_id = list.id.clone();
            }
            shifted_cards += ordering::renumber(&mut list.cards).len();
        }

        if shifted_lists + shifted_cards > 0 {
            debug!(
                board = %board.id,
                shifted_lists,
                shifted_cards,
                "normalized sparse positions while building snapshot"
            );
        }

        Self { board, lists }
    }

    /// An empty snapshot for a board with no lists
    pub fn empty(board: Board) -> Self {
        Self {
            board,
            lists: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Lists in position order
    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    /// Find a list by ID
    pub fn find_list(&self, id: &ListId) -> Option<&List> {
        self.lists.iter().find(|l| &l.id == id)
    }

    /// Index of a list in board order
    pub fn list_index(&self, id: &ListId) -> Option<usize> {
        self.lists.iter().position(|l| &l.id == id)
    }

    /// Find a card by ID across all lists
    pub fn find_card(&self, id: &CardId) -> Option<&Card> {
        self.lists.iter().find_map(|l| l.find_card(id))
    }

    /// Locate a card as `(list index, card index)`
    pub fn card_location(&self, id: &CardId) -> Option<(usize, usize)> {
        self.lists
            .iter()
            .enumerate()
            .find_map(|(li, l)| l.card_index(id).map(|ci| (li, ci)))
    }

    /// The list currently holding a card
    pub fn list_of_card(&self, id: &CardId) -> Option<&List> {
        self.card_location(id).map(|(li, _)| &self.lists[li])
    }

    /// Number of cards in a list
    pub fn card_count(&self, list_id: &ListId) -> Option<usize> {
        self.find_list(list_id).map(List::card_count)
    }

    /// Number of cards across the board
    pub fn total_cards(&self) -> usize {
        self.lists.iter().map(List::card_count).sum()
    }

    /// Verify every structural invariant.
    ///
    /// Lists and cards must be densely numbered in array order, every card
    /// must live in exactly one list, and its `list_id` must name that list.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        ordering::verify_ordered(&self.lists)?;

        let mut seen = HashSet::new();
        for list in &self.lists {
            ordering::verify_ordered(&list.cards)?;
            for card in &list.cards {
                if card.list_id != list.id {
                    return Err(InvariantViolation::WrongList {
                        card: card.id.to_string(),
                        expected: list.id.to_string(),
                        found: card.list_id.to_string(),
                    });
                }
                if !seen.insert(&card.id) {
                    return Err(InvariantViolation::MultipleResidency {
                        card: card.id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Crate-internal builders used by the coordinator
    // =========================================================================

    /// Copy with one list replaced by id
    pub(crate) fn with_list(&self, list: List) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.lists.iter_mut().find(|l| l.id == list.id) {
            *slot = list;
        }
        next
    }

    /// Copy with the list array replaced
    pub(crate) fn with_lists(&self, lists: Vec<List>) -> Self {
        Self {
            board: self.board.clone(),
            lists,
        }
    }

    /// Append a list at the end of the board
    pub(crate) fn push_list(&mut self, mut list: List) {
        list.position = self.lists.len();
        self.lists.push(list);
    }

    /// Append a card at the end of a list; false when the list is unknown
    pub(crate) fn push_card(&mut self, list_id: &ListId, mut card: Card) -> bool {
        let Some(list) = self.list_mut(list_id) else {
            return false;
        };
        card.list_id = list.id.clone();
        card.position = list.cards.len();
        list.cards.push(card);
        true
    }

    /// Remove a list and renumber the rest, returning the shifted positions
    pub(crate) fn remove_list(&mut self, id: &ListId) -> Option<Vec<ListPositionUpdate>> {
        let index = self.list_index(id)?;
        self.lists.remove(index);
        Some(ordering::renumber(&mut self.lists))
    }

    /// Remove a card and renumber its siblings, returning the shifted positions
    pub(crate) fn remove_card(&mut self, id: &CardId) -> Option<Vec<CardPositionUpdate>> {
        let (li, ci) = self.card_location(id)?;
        let cards = &mut self.lists[li].cards;
        cards.remove(ci);
        Some(ordering::renumber(cards))
    }

    pub(crate) fn list_mut(&mut self, id: &ListId) -> Option<&mut List> {
        self.lists.iter_mut().find(|l| &l.id == id)
    }

    pub(crate) fn card_mut(&mut self, id: &CardId) -> Option<&mut Card> {
        self.lists
            .iter_mut()
            .find_map(|l| l.cards.iter_mut().find(|c| &c.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoardId;

    fn board() -> Board {
        Board {
            id: BoardId::from_string("b1"),
            name: "Test".into(),
            background: None,
        }
    }

    fn list(id: &str, position: usize, cards: &[(&str, usize)]) -> List {
        let cards = cards
            .iter()
            .map(|(cid, pos)| Card::new(*cid, ListId::from_string(id), *pos).with_id(*cid))
            .collect();
        List::new(BoardId::from_string("b1"), id, position)
            .with_id(id)
            .with_cards(cards)
    }

    #[test]
    fn test_new_sorts_and_renumbers() {
        let snap = BoardSnapshot::new(
            board(),
            vec![
                list("done", 7, &[]),
                list("todo", 2, &[("b", 5), ("a", 1), ("c", 9)]),
            ],
        );
        assert_eq!(snap.lists()[0].id.as_str(), "todo");
        assert_eq!(snap.lists()[0].position, 0);
        assert_eq!(snap.lists()[1].position, 1);
        let ids: Vec<_> = snap.lists()[0].cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(snap.check_invariants().is_ok());
    }

    #[test]
    fn test_new_drops_archived() {
        let mut archived_list = list("old", 0, &[]);
        archived_list.is_archived = true;
        let mut todo = list("todo", 1, &[("a", 0), ("b", 1)]);
        todo.cards[0].is_archived = true;

        let snap = BoardSnapshot::new(board(), vec![archived_list, todo]);
        assert_eq!(snap.lists().len(), 1);
        assert_eq!(snap.card_count(&ListId::from_string("todo")), Some(1));
        assert_eq!(snap.find_card(&CardId::from_string("b")).unwrap().position, 0);
    }

    #[test]
    fn test_lookups() {
        let snap = BoardSnapshot::new(
            board(),
            vec![list("todo", 0, &[("a", 0)]), list("done", 1, &[("x", 0), ("y", 1)])],
        );
        assert_eq!(snap.card_location(&CardId::from_string("y")), Some((1, 1)));
        assert_eq!(
            snap.list_of_card(&CardId::from_string("a")).unwrap().id.as_str(),
            "todo"
        );
        assert_eq!(snap.list_index(&ListId::from_string("done")), Some(1));
        assert!(snap.find_card(&CardId::from_string("zzz")).is_none());
        assert_eq!(snap.card_count(&ListId::from_string("missing")), None);
        assert_eq!(snap.total_cards(), 3);
    }

    #[test]
    fn test_remove_card_renumbers_siblings() {
        let mut snap = BoardSnapshot::new(board(), vec![list("todo", 0, &[("a", 0), ("b", 1), ("c", 2)])]);
        let shifted = snap.remove_card(&CardId::from_string("a")).unwrap();
        assert_eq!(shifted.len(), 2);
        assert_eq!(snap.find_card(&CardId::from_string("c")).unwrap().position, 1);
        assert!(snap.check_invariants().is_ok());
        assert!(snap.remove_card(&CardId::from_string("a")).is_none());
    }

    #[test]
    fn test_push_and_remove_lists() {
        let mut snap = BoardSnapshot::empty(board());
        snap.push_list(list("todo", 9, &[]));
        snap.push_list(list("done", 9, &[]));
        assert_eq!(snap.lists()[1].position, 1);

        assert!(snap.push_card(&ListId::from_string("done"), Card::new("x", ListId::from_string("todo"), 7)));
        assert_eq!(snap.lists()[1].cards[0].list_id.as_str(), "done");
        assert_eq!(snap.lists()[1].cards[0].position, 0);
        assert!(!snap.push_card(&ListId::from_string("nope"), Card::new("y", ListId::from_string("nope"), 0)));

        let shifted = snap.remove_list(&ListId::from_string("todo")).unwrap();
        assert_eq!(shifted, vec![ListPositionUpdate::new(ListId::from_string("done"), 0)]);
        assert!(snap.check_invariants().is_ok());
    }

    #[test]
    fn test_check_invariants_detects_duplicate_residency() {
        let snap = BoardSnapshot::new(
            board(),
            vec![list("todo", 0, &[("a", 0)]), list("done", 1, &[("b", 0)])],
        );
        let mut done = snap.lists()[1].clone();
        let mut dup = snap.lists()[0].cards[0].clone();
        dup.list_id = done.id.clone();
        dup.position = 1;
        done.cards.push(dup);
        let broken = snap.with_list(done);
        assert!(matches!(
            broken.check_invariants(),
            Err(InvariantViolation::MultipleResidency { .. })
        ));
    }
}
