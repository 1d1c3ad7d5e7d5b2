//! CLI definition for the kanban board command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kanban_board::{MemberFilter, Priority};

/// Kanban board - ordered lists and cards kept in a local JSON board file.
///
/// Every mutation runs through the board coordinator: it is validated,
/// applied to the in-memory board, written to the board file, and rolled
/// back if the write fails. Each command prints its outcome as JSON.
#[derive(Parser, Debug)]
#[command(name = "kanban-board")]
#[command(version)]
#[command(about = "Kanban board ordering engine over a JSON board file")]
#[command(
    long_about = "Manage a kanban board stored in a JSON file.\n\n\
    Cards and lists keep dense positions (0..n-1). Moving a card into a final \
    list marks it complete.\n\n\
    Environment variables:\n  \
    KANBAN_BOARD_REMOTE_TIMEOUT_MS  Timeout for one store call\n  \
    KANBAN_BOARD_CELEBRATE          Enable or disable the confetti side effect\n  \
    KANBAN_BOARD_LOG_FILTER         Default tracing filter when RUST_LOG is unset"
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Board file to read and write
    #[arg(long, global = true, value_name = "PATH", default_value = "board.json")]
    pub board_file: PathBuf,

    /// Engine configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// User id recorded as the creator and activity actor
    #[arg(long, global = true, value_name = "ID", default_value = "local")]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new board file with To Do, Doing and Done lists
    Init {
        /// Board name
        #[arg(long)]
        name: String,
    },

    /// Print the board, optionally filtered
    Show {
        /// Case-insensitive substring matched against card titles
        #[arg(long)]
        query: Option<String>,
        /// Member id, or "unassigned" for cards without members (repeatable)
        #[arg(long = "member", value_name = "ID")]
        members: Vec<MemberFilter>,
        /// Tag id (repeatable)
        #[arg(long = "tag", value_name = "ID")]
        tags: Vec<String>,
        /// Priority: low, normal, high or urgent (repeatable)
        #[arg(long = "priority", value_name = "PRIORITY")]
        priorities: Vec<Priority>,
    },

    /// Append a list to the board
    AddList {
        #[arg(long)]
        name: String,
        /// 6-digit hex color; auto-assigned from the name when omitted
        #[arg(long)]
        color: Option<String>,
    },

    /// Change a list's name, color or flags
    UpdateList {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        confetti: Option<bool>,
        /// Cards moved into a final list are marked complete
        #[arg(long = "final")]
        is_final: Option<bool>,
    },

    /// Archive a list and renumber the remaining lists
    ArchiveList {
        #[arg(long)]
        id: String,
    },

    /// Append a card to a list
    AddCard {
        /// Target list id
        #[arg(long)]
        list: String,
        #[arg(long)]
        title: String,
    },

    /// Change a card's fields
    UpdateCard {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        points: Option<u8>,
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Archive a card and renumber its siblings
    ArchiveCard {
        #[arg(long)]
        id: String,
    },

    /// Move a card to a position in the same or another list
    MoveCard {
        #[arg(long)]
        card: String,
        #[arg(long)]
        to_list: String,
        /// Zero-based target index; clamped to the list length
        #[arg(long)]
        index: usize,
    },

    /// Move a list to a position on the board
    MoveList {
        #[arg(long)]
        list: String,
        /// Zero-based target index; clamped to the list count
        #[arg(long)]
        index: usize,
    },
}
