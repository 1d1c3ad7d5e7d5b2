//! Kanban board ordering engine with optimistic mutations
//!
//! This crate keeps one board's lists and cards in a densely numbered order
//! while changes are applied optimistically and confirmed against a remote
//! store that may fail, stall or answer garbage.
//!
//! ## Overview
//!
//! - **Dense positions** - Siblings are always numbered `0..n-1`; every
//!   structural change renumbers instead of using fractional keys
//! - **Pure ordering engine** - [`ordering`] computes moves without touching state
//! - **Optimistic moves** - The coordinator commits a move before the store
//!   answers and restores the exact prior snapshot if it fails
//! - **Final lists** - Cards arriving in a final list are completed as part of
//!   the same write
//! - **Store-agnostic** - Persistence is anything implementing [`RemoteStore`]
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use kanban_board::{BoardCoordinator, EngineConfig, InMemoryRemote, Board, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let board = Board::new("Roadmap");
//! let lists = board.default_lists();
//! let todo = lists[0].id.clone();
//! let done = lists[2].id.clone();
//! let store = InMemoryRemote::with_board(board.clone(), lists);
//!
//! let coordinator =
//!     BoardCoordinator::load(store, &board.id, UserId::from_string("alice"), EngineConfig::default())
//!         .await?;
//!
//! let card = coordinator.create_card(&todo, "Ship it").await;
//! if let Some(card) = card.payload {
//!     let moved = coordinator.move_card(&card.id, &todo, &done, 0).await;
//!     assert!(moved.payload.unwrap().card.is_completed);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Move lifecycle
//!
//! ```text
//! Idle -> OptimisticallyApplied -> Confirmed
//!                               \-> RolledBack
//! ```

pub mod activity;
pub mod auto_color;
pub mod celebration;
pub mod config;
pub mod coordinator;
pub mod drop_target;
pub mod error;
pub mod filter;
pub mod logging;
pub mod ordering;
pub mod remote;
pub mod snapshot;
pub mod types;

pub use activity::{ActivityLog, LogEntry};
pub use celebration::{Celebration, CelebrationSink, LogCelebration};
pub use config::EngineConfig;
pub use coordinator::{BoardCoordinator, ListMoveReport, MoveReport, MoveState};
pub use drop_target::{resolve_drop_index, resolve_move_index, ElementRect};
pub use error::{BoardError, MutationOutcome, Result};
pub use filter::{BoardFilter, FilteredList, MemberFilter, UNASSIGNED};
pub use logging::Pretty;
pub use ordering::{CrossListMove, InvariantViolation, ListReorder, WithinListMove};
pub use remote::{BoardFileLock, InMemoryRemote, JsonFileRemote, RemoteClient, RemoteOperation, RemoteResponse, RemoteStore};
pub use snapshot::BoardSnapshot;
pub use types::*;
