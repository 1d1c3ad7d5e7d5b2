//! Command handlers: open the board file, run one coordinator call, report.

use std::path::Path;

use anyhow::{bail, Context};
use kanban_board::{
    Board, BoardCoordinator, BoardError, BoardFilter, BoardSnapshot, CardId, CardPatch,
    EngineConfig, JsonFileRemote, ListId, ListPatch, MutationOutcome, UserId,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::{Cli, Commands};

/// Run the selected command and return its outcome as JSON.
///
/// The board file lock is held for the whole command. `Err` is reserved for
/// setup failures (locked, missing or unreadable board file); expected
/// mutation failures come back as an outcome with `success: false`.
pub async fn run(cli: &Cli, config: EngineConfig) -> anyhow::Result<Value> {
    let _lock = JsonFileRemote::lock(&cli.board_file)
        .await
        .with_context(|| format!("locking board file {}", cli.board_file.display()))?;

    let coordinator = match &cli.command {
        Commands::Init { name } => return init(&cli.board_file, name).await,
        _ => open(&cli.board_file, &cli.user, config).await?,
    };
    let outcome = match &cli.command {
        Commands::Init { .. } => unreachable!("init returns before the board file is opened"),
        Commands::Show {
            query,
            members,
            tags,
            priorities,
        } => {
            let mut filter = BoardFilter::new().with_members(members.iter().cloned());
            if let Some(query) = query {
                filter = filter.with_query(query.as_str());
            }
            for tag in tags {
                filter = filter.with_tag(tag.as_str());
            }
            for priority in priorities {
                filter = filter.with_priority(*priority);
            }
            to_json(MutationOutcome::ok(render(&coordinator.snapshot().await, &filter)))?
        }
        Commands::AddList { name, color } => {
            to_json(coordinator.create_list(name, color.as_deref()).await)?
        }
        Commands::UpdateList {
            id,
            name,
            color,
            confetti,
            is_final,
        } => {
            let mut patch = ListPatch::new();
            if let Some(name) = name {
                patch = patch.with_name(name.as_str());
            }
            if let Some(color) = color {
                patch = patch.with_color(color.as_str());
            }
            if let Some(confetti) = confetti {
                patch = patch.with_confetti(*confetti);
            }
            if let Some(is_final) = is_final {
                patch = patch.with_final(*is_final);
            }
            to_json(coordinator.update_list(&ListId::from_string(id), patch).await)?
        }
        Commands::ArchiveList { id } => {
            to_json(coordinator.delete_list(&ListId::from_string(id)).await)?
        }
        Commands::AddCard { list, title } => {
            to_json(coordinator.create_card(&ListId::from_string(list), title).await)?
        }
        Commands::UpdateCard {
            id,
            title,
            description,
            priority,
            points,
            completed,
        } => {
            let mut patch = CardPatch::new();
            if let Some(title) = title {
                patch = patch.with_title(title.as_str());
            }
            if let Some(description) = description {
                patch = patch.with_description(Some(description.clone()));
            }
            if let Some(priority) = priority {
                patch = patch.with_priority(Some(*priority));
            }
            if let Some(points) = points {
                patch = patch.with_story_points(Some(*points));
            }
            if let Some(completed) = completed {
                patch = patch.with_completed(*completed);
            }
            to_json(coordinator.update_card(&CardId::from_string(id), patch).await)?
        }
        Commands::ArchiveCard { id } => {
            to_json(coordinator.delete_card(&CardId::from_string(id)).await)?
        }
        Commands::MoveCard {
            card,
            to_list,
            index,
        } => {
            let card = CardId::from_string(card);
            let source = coordinator
                .snapshot()
                .await
                .list_of_card(&card)
                .map(|list| list.id.clone());
            match source {
                Some(source) => to_json(
                    coordinator
                        .move_card(&card, &source, &ListId::from_string(to_list), *index)
                        .await,
                )?,
                None => to_json(MutationOutcome::<()>::failed(
                    BoardError::CardNotFound {
                        id: card.to_string(),
                    }
                    .to_string(),
                ))?,
            }
        }
        Commands::MoveList { list, index } => {
            to_json(coordinator.move_list(&ListId::from_string(list), *index).await)?
        }
    };
    Ok(outcome)
}

/// Whether a rendered outcome reports success
pub fn succeeded(outcome: &Value) -> bool {
    outcome["success"].as_bool().unwrap_or(false)
}

async fn init(path: &Path, name: &str) -> anyhow::Result<Value> {
    let board = Board::new(name);
    let lists = board.default_lists();
    JsonFileRemote::create(path, board.clone(), lists.clone())
        .await
        .with_context(|| format!("creating board file {}", path.display()))?;
    debug!(path = %path.display(), board = %board.id, "board file created");
    to_json(MutationOutcome::ok(BoardSnapshot::new(board, lists)))
}

async fn open(
    path: &Path,
    user: &str,
    config: EngineConfig,
) -> anyhow::Result<BoardCoordinator<JsonFileRemote>> {
    let remote = JsonFileRemote::open(path)
        .await
        .with_context(|| format!("opening board file {}", path.display()))?;
    let Some(board_id) = remote.board_ids().await.into_iter().next() else {
        bail!("no board in {}", path.display());
    };
    let coordinator = BoardCoordinator::load(remote, &board_id, UserId::from_string(user), config)
        .await
        .with_context(|| format!("loading board {board_id}"))?;
    Ok(coordinator)
}

fn render(snapshot: &BoardSnapshot, filter: &BoardFilter) -> Value {
    let view = filter.apply(snapshot);
    let hidden: usize = view.iter().map(|l| l.hidden_count()).sum();
    let lists: Vec<_> = view.iter().map(|l| l.to_owned_list()).collect();
    json!({
        "board": snapshot.board(),
        "lists": lists,
        "hidden_cards": hidden,
    })
}

fn to_json<T: Serialize>(outcome: MutationOutcome<T>) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(outcome)?)
}
