//! Field-level patches for lists and cards.
//!
//! Only fields that are `Some` are serialized, so a remote update carries the
//! subset being changed and never clobbers unrelated fields. Clearable card
//! fields use `Option<Option<T>>`: `Some(None)` serializes as `null` (clear),
//! `None` is omitted (leave as is).

use super::board::List;
use super::card::{Card, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Distinguish an explicit `null` (clear) from an absent field (keep).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Changes to a list's non-positional fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confetti: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_final: Option<bool>,
}

impl ListPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_confetti(mut self, confetti: bool) -> Self {
        self.confetti = Some(confetti);
        self
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = Some(is_final);
        self
    }

    /// True when nothing would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.confetti.is_none() && self.is_final.is_none()
    }

    /// Apply the set fields to a list
    pub fn apply_to(&self, list: &mut List) {
        if let Some(name) = &self.name {
            list.name = name.clone();
        }
        if let Some(color) = &self.color {
            list.color = color.clone();
        }
        if let Some(confetti) = self.confetti {
            list.confetti = confetti;
        }
        if let Some(is_final) = self.is_final {
            list.is_final = is_final;
        }
    }
}

/// Changes to a card's non-positional fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cover_color: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub story_points: Option<Option<u8>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Option<Priority>>,
}

impl CardPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set (`Some`) or clear (`None`) the description
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.is_completed = Some(completed);
        self
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.is_archived = Some(archived);
        self
    }

    pub fn with_cover_color(mut self, color: Option<String>) -> Self {
        self.cover_color = Some(color);
        self
    }

    pub fn with_story_points(mut self, points: Option<u8>) -> Self {
        self.story_points = Some(points);
        self
    }

    pub fn with_priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = Some(priority);
        self
    }

    /// True when nothing would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.is_completed.is_none()
            && self.is_archived.is_none()
            && self.cover_color.is_none()
            && self.story_points.is_none()
            && self.priority.is_none()
    }

    /// Apply the set fields to a card
    pub fn apply_to(&self, card: &mut Card) {
        if let Some(title) = &self.title {
            card.title = title.clone();
        }
        if let Some(description) = &self.description {
            card.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            card.due_date = due_date;
        }
        if let Some(completed) = self.is_completed {
            card.is_completed = completed;
        }
        if let Some(archived) = self.is_archived {
            card.is_archived = archived;
        }
        if let Some(color) = &self.cover_color {
            card.cover_color = color.clone();
        }
        if let Some(points) = self.story_points {
            card.story_points = points;
        }
        if let Some(priority) = self.priority {
            card.priority = priority;
        }
    }
}
