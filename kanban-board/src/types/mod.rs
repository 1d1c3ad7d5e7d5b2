//! Core types for the board engine

mod board;
mod card;
mod ids;
mod patch;
mod position;

// Re-export all types
pub use board::{Board, List};
pub use card::{Card, Member, Priority, Tag};
pub use ids::{BoardId, CardId, ListId, LogEntryId, MemberId, TagId, UserId};
pub use patch::{CardPatch, ListPatch};
pub use position::{CardPositionUpdate, ListPositionUpdate, PositionUpdate, Positioned};
