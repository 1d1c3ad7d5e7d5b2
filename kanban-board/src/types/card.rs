//! Card types: Card, Priority, Member, Tag

use super::ids::{CardId, ListId, MemberId, TagId, UserId};
use crate::error::BoardError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A card on a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub list_id: ListId,
    /// Dense zero-based rank within the owning list
    pub position: usize,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// 6-character hex color code without #
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_archived: bool,

    /// Assigned workspace members
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Denormalized aggregates; attachments and comments live in their own subsystems
    #[serde(default)]
    pub attachment_count: u32,
    #[serde(default)]
    pub comment_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Create a new, unsaved card at the given position in a list
    pub fn new(title: impl Into<String>, list_id: ListId, position: usize) -> Self {
        Self {
            id: CardId::new(),
            list_id,
            position,
            title: title.into(),
            description: None,
            due_date: None,
            cover_color: None,
            story_points: None,
            priority: None,
            is_completed: false,
            is_archived: false,
            members: Vec::new(),
            tags: Vec::new(),
            attachment_count: 0,
            comment_count: 0,
            created_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Use a specific id instead of a freshly minted one
    pub fn with_id(mut self, id: impl Into<CardId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.is_completed = completed;
        self
    }

    /// Number of assigned members
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Check whether the given member is assigned
    pub fn has_member(&self, id: &MemberId) -> bool {
        self.members.iter().any(|m| &m.id == id)
    }

    /// Check whether the given tag is applied
    pub fn has_tag(&self, id: &TagId) -> bool {
        self.tags.iter().any(|t| &t.id == id)
    }
}

/// Card priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(BoardError::validation(
                "priority",
                format!("unknown priority '{other}' (expected low, normal, high or urgent)"),
            )),
        }
    }
}

/// A workspace member assigned to a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A tag applied to a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// 6-character hex color code without #
    pub color: String,
}

impl Tag {
    /// Create a tag with an auto-assigned color derived from its name
    pub fn new(id: impl Into<TagId>, name: impl Into<String>) -> Self {
        let name = name.into();
        let color = crate::auto_color::auto_color(&name).to_string();
        Self {
            id: id.into(),
            name,
            color,
        }
    }
}
