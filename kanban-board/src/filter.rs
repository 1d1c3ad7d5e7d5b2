//! Filter/search view: a read-only projection of a snapshot.
//!
//! Each non-empty criterion narrows the result; within one criterion any
//! match is enough. The projection borrows from the snapshot and never
//! changes it or its positions.

use crate::error::BoardError;
use crate::snapshot::BoardSnapshot;
use crate::types::{Card, List, MemberId, Priority, TagId};
use std::collections::HashSet;
use std::str::FromStr;

/// Pseudo member id selecting cards with nobody assigned
pub const UNASSIGNED: &str = "unassigned";

/// One entry of the member filter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberFilter {
    Unassigned,
    Member(MemberId),
}

impl MemberFilter {
    /// `"unassigned"` selects cards without members; anything else is a member id
    pub fn parse(value: &str) -> Self {
        if value == UNASSIGNED {
            Self::Unassigned
        } else {
            Self::Member(MemberId::from_string(value))
        }
    }

    fn matches(&self, card: &Card) -> bool {
        match self {
            Self::Unassigned => card.members.is_empty(),
            Self::Member(id) => card.has_member(id),
        }
    }
}

impl FromStr for MemberFilter {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BoardError::validation("member", "must not be empty"));
        }
        Ok(Self::parse(s))
    }
}

/// Filter state as the UI holds it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardFilter {
    query: String,
    members: HashSet<MemberFilter>,
    tags: HashSet<TagId>,
    priorities: HashSet<Priority>,
}

impl BoardFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match on card titles
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into().trim().to_lowercase();
        self
    }

    pub fn with_member(mut self, member: MemberFilter) -> Self {
        self.members.insert(member);
        self
    }

    pub fn with_members(mut self, members: impl IntoIterator<Item = MemberFilter>) -> Self {
        self.members.extend(members);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<TagId>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priorities.insert(priority);
        self
    }

    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
            && self.members.is_empty()
            && self.tags.is_empty()
            && self.priorities.is_empty()
    }

    /// Whether one card passes every criterion
    pub fn matches(&self, card: &Card) -> bool {
        let text = self.query.is_empty() || card.title.to_lowercase().contains(&self.query);
        let members = self.members.is_empty() || self.members.iter().any(|m| m.matches(card));
        let tags = self.tags.is_empty() || self.tags.iter().any(|t| card.has_tag(t));
        let priority = self.priorities.is_empty()
            || card.priority.is_some_and(|p| self.priorities.contains(&p));
        text && members && tags && priority
    }

    /// Project every list of the snapshot, keeping only matching cards
    pub fn apply<'a>(&self, snapshot: &'a BoardSnapshot) -> Vec<FilteredList<'a>> {
        snapshot
            .lists()
            .iter()
            .map(|list| FilteredList {
                list,
                cards: list.cards.iter().filter(|c| self.matches(c)).collect(),
            })
            .collect()
    }
}

/// One list with the subset of its cards that passed the filter
#[derive(Debug, Clone)]
pub struct FilteredList<'a> {
    pub list: &'a List,
    pub cards: Vec<&'a Card>,
}

impl FilteredList<'_> {
    /// Cards of the list the filter hid
    pub fn hidden_count(&self) -> usize {
        self.list.cards.len() - self.cards.len()
    }

    /// An owned list holding only the visible cards, positions untouched
    pub fn to_owned_list(&self) -> List {
        let mut list = self.list.clone();
        list.cards = self.cards.iter().map(|c| (*c).clone()).collect();
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Board, BoardId, ListId, Member, Tag};

    fn card(title: &str, position: usize) -> Card {
        Card::new(title, ListId::from_string("l"), position).with_id(title)
    }

    fn snapshot() -> BoardSnapshot {
        let alice = Member::new("alice", "Alice");
        let cards = vec![
            card("Fix login bug", 0),
            card("BUG in export", 1).with_members(vec![alice.clone()]),
            card("Write docs", 2),
            card("debug flaky test", 3).with_priority(Priority::High),
            card("Release notes", 4).with_tags(vec![Tag::new("t1", "release")]),
        ];
        let list = List::new(BoardId::from_string("b"), "Work", 0)
            .with_id("l")
            .with_cards(cards);
        BoardSnapshot::new(Board::new("B"), vec![list])
    }

    fn titles(lists: &[FilteredList<'_>]) -> Vec<String> {
        lists[0].cards.iter().map(|c| c.title.clone()).collect()
    }

    #[test]
    fn test_text_and_unassigned() {
        let snap = snapshot();
        let filter = BoardFilter::new()
            .with_query("bug")
            .with_member(MemberFilter::parse("unassigned"));
        let view = filter.apply(&snap);
        assert_eq!(titles(&view), vec!["Fix login bug", "debug flaky test"]);
        assert_eq!(view[0].hidden_count(), 3);
    }

    #[test]
    fn test_member_or_unassigned() {
        let snap = snapshot();
        let filter = BoardFilter::new()
            .with_query("BUG")
            .with_members([MemberFilter::Unassigned, MemberFilter::parse("alice")]);
        assert_eq!(titles(&filter.apply(&snap)).len(), 3);
    }

    #[test]
    fn test_tag_and_priority() {
        let snap = snapshot();
        let by_tag = BoardFilter::new().with_tag("t1");
        assert_eq!(titles(&by_tag.apply(&snap)), vec!["Release notes"]);

        let by_priority = BoardFilter::new().with_priority(Priority::High);
        assert_eq!(titles(&by_priority.apply(&snap)), vec!["debug flaky test"]);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let snap = snapshot();
        let filter = BoardFilter::new().with_query("   ");
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&snap)[0].cards.len(), 5);
    }

    #[test]
    fn test_projection_keeps_positions_and_snapshot() {
        let snap = snapshot();
        let before = snap.clone();
        let view = BoardFilter::new().with_query("notes").apply(&snap);
        let owned = view[0].to_owned_list();
        assert_eq!(owned.cards.len(), 1);
        assert_eq!(owned.cards[0].position, 4);
        assert_eq!(snap, before);
    }

    #[test]
    fn test_member_filter_from_str() {
        assert_eq!("unassigned".parse::<MemberFilter>().unwrap(), MemberFilter::Unassigned);
        assert!(matches!(
            "bob".parse::<MemberFilter>().unwrap(),
            MemberFilter::Member(_)
        ));
        assert!("  ".parse::<MemberFilter>().is_err());
    }
}
