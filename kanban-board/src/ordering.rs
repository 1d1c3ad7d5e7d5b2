//! Ordering engine: pure functions computing the effect of a move.
//!
//! Positions are dense zero-based ranks. Every structural change renumbers
//! the affected siblings to `0..n-1` in their new order instead of using
//! fractional keys, so there is no precision drift and no rebalancing pass.
//! Out-of-range target indices are clamped, never rejected.

use crate::types::{Card, CardId, CardPositionUpdate, List, ListId, PositionUpdate, Positioned};
use serde::Serialize;
use thiserror::Error;

/// A structural invariant that does not hold
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Positions are not a permutation of `0..n-1`
    #[error("positions {found:?} are not a permutation of 0..{len}")]
    NotDense { found: Vec<usize>, len: usize },

    /// An item's position does not match its array index
    #[error("item {id} at index {index} has position {position}")]
    OutOfOrder {
        id: String,
        index: usize,
        position: usize,
    },

    /// A card appears in more than one list
    #[error("card {card} appears in more than one list")]
    MultipleResidency { card: String },

    /// A card's list_id does not match the list holding it
    #[error("card {card} is held by list {expected} but points at {found}")]
    WrongList {
        card: String,
        expected: String,
        found: String,
    },
}

/// Result of reordering a card inside one list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithinListMove {
    /// The list's cards in their new order, renumbered
    pub cards: Vec<Card>,
    /// Every card's new position, in new order
    pub position_updates: Vec<CardPositionUpdate>,
    pub from_index: usize,
    /// The clamped index the card landed on
    pub to_index: usize,
}

impl WithinListMove {
    /// True when the card stays where it was
    pub fn is_noop(&self) -> bool {
        self.from_index == self.to_index
    }
}

/// Result of moving a card from one list to another
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossListMove {
    /// Remaining source cards, renumbered
    pub source_cards: Vec<Card>,
    /// Target cards including the moved card, renumbered
    pub target_cards: Vec<Card>,
    /// The moved card as it now sits in the target list
    pub moved_card: Card,
    /// True when arriving in a final list flipped `is_completed` to true
    pub derived_completion: bool,
    /// Source cards whose position shifted
    pub source_updates: Vec<CardPositionUpdate>,
    /// Target cards whose position shifted, including the moved card
    pub target_updates: Vec<CardPositionUpdate>,
}

/// Result of reordering lists on a board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListReorder {
    pub lists: Vec<List>,
    pub position_updates: Vec<PositionUpdate<ListId>>,
    pub from_index: usize,
    pub to_index: usize,
}

impl ListReorder {
    pub fn is_noop(&self) -> bool {
        self.from_index == self.to_index
    }
}

/// Clamp a requested index into `0..=max`.
pub fn clamp_index(target: usize, max: usize) -> usize {
    target.min(max)
}

/// Renumber items to `0..n-1` in array order.
///
/// Returns updates only for items whose position actually changed.
pub fn renumber<T: Positioned>(items: &mut [T]) -> Vec<PositionUpdate<T::Id>> {
    let mut changed = Vec::new();
    for (index, item) in items.iter_mut().enumerate() {
        if item.position() != index {
            item.set_position(index);
            changed.push(PositionUpdate::new(item.id().clone(), index));
        }
    }
    changed
}

/// Every item's current position, in array order.
pub fn positions_of<T: Positioned>(items: &[T]) -> Vec<PositionUpdate<T::Id>> {
    items
        .iter()
        .map(|item| PositionUpdate::new(item.id().clone(), item.position()))
        .collect()
}

/// Move one item to `target_index` (clamped to the last slot) and renumber.
///
/// Returns the reordered copy plus `(from, to)`, or `None` when no item has
/// the given id.
fn reorder<T>(items: &[T], id: &T::Id, target_index: usize) -> Option<(Vec<T>, usize, usize)>
where
    T: Positioned + Clone,
    T::Id: PartialEq,
{
    let from = items.iter().position(|item| item.id() == id)?;
    let mut reordered = items.to_vec();
    let item = reordered.remove(from);
    let to = clamp_index(target_index, reordered.len());
    reordered.insert(to, item);
    renumber(&mut reordered);
    Some((reordered, from, to))
}

/// Reorder a card within its list.
///
/// The card is removed from its index and reinserted at `target_index`,
/// clamped to `[0, len-1]`. Every card is renumbered and reported, since any
/// card between the old and new index shifts by one. Returns `None` when the
/// card is not in the list.
pub fn move_within_list(list: &List, card_id: &CardId, target_index: usize) -> Option<WithinListMove> {
    let (cards, from_index, to_index) = reorder(&list.cards, card_id, target_index)?;
    let position_updates = positions_of(&cards);
    Some(WithinListMove {
        cards,
        position_updates,
        from_index,
        to_index,
    })
}

/// Move a card out of `source` and into `target` at `target_index`.
///
/// The index is clamped to `[0, target.len]`. Both lists are renumbered. When
/// the target is a final list and the card was not complete, the moved card
/// comes out completed; a completed card never becomes incomplete here.
/// Returns `None` when the card is not in the source list.
pub fn move_across_lists(
    source: &List,
    target: &List,
    card_id: &CardId,
    target_index: usize,
) -> Option<CrossListMove> {
    let from = source.card_index(card_id)?;

    let mut source_cards = source.cards.clone();
    let mut moved_card = source_cards.remove(from);
    let source_updates = renumber(&mut source_cards);

    let derived_completion = target.is_final && !moved_card.is_completed;
    if derived_completion {
        moved_card.is_completed = true;
    }
    moved_card.list_id = target.id.clone();

    let mut target_cards = target.cards.clone();
    let to = clamp_index(target_index, target_cards.len());
    // Force a reported update for the arriving card even if its old rank matches.
    moved_card.position = usize::MAX;
    target_cards.insert(to, moved_card);
    let target_updates = renumber(&mut target_cards);
    let moved_card = target_cards[to].clone();

    Some(CrossListMove {
        source_cards,
        target_cards,
        moved_card,
        derived_completion,
        source_updates,
        target_updates,
    })
}

/// Reorder a list among the board's lists.
pub fn move_list(lists: &[List], list_id: &ListId, target_index: usize) -> Option<ListReorder> {
    let (lists, from_index, to_index) = reorder(lists, list_id, target_index)?;
    let position_updates = positions_of(&lists);
    Some(ListReorder {
        lists,
        position_updates,
        from_index,
        to_index,
    })
}

/// Check that positions form a permutation of `0..n-1`.
pub fn verify_dense<T: Positioned>(items: &[T]) -> Result<(), InvariantViolation> {
    let mut found: Vec<usize> = items.iter().map(Positioned::position).collect();
    found.sort_unstable();
    if found.iter().enumerate().all(|(i, p)| i == *p) {
        Ok(())
    } else {
        Err(InvariantViolation::NotDense {
            len: items.len(),
            found,
        })
    }
}

/// Check that every item's position equals its array index.
pub fn verify_ordered<T>(items: &[T]) -> Result<(), InvariantViolation>
where
    T: Positioned,
    T::Id: std::fmt::Display,
{
    verify_dense(items)?;
    for (index, item) in items.iter().enumerate() {
        if item.position() != index {
            return Err(InvariantViolation::OutOfOrder {
                id: item.id().to_string(),
                index,
                position: item.position(),
            });
        }
    }
    Ok(())
}
