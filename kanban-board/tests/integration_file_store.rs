//! Integration tests for the JSON file store behind the coordinator

use kanban_board::{Board, BoardCoordinator, EngineConfig, JsonFileRemote, ListPatch, UserId};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_board_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("boards").join("team.json");

    let board = Board::new("Team");
    let lists = board.default_lists();
    let (todo, done) = (lists[0].id.clone(), lists[2].id.clone());
    let remote = JsonFileRemote::create(&path, board.clone(), lists).await.unwrap();
    let coordinator = BoardCoordinator::load(remote, &board.id, UserId::from_string("u"), EngineConfig::default())
        .await
        .unwrap();

    let first = coordinator.create_card(&todo, "first").await.payload.unwrap();
    let second = coordinator.create_card(&todo, "second").await.payload.unwrap();
    assert!(coordinator.move_card(&second.id, &todo, &todo, 0).await.success);
    assert!(coordinator.move_card(&first.id, &todo, &done, 0).await.success);
    assert!(coordinator
        .update_list(&todo, ListPatch::new().with_name("Backlog"))
        .await
        .success);
    let local = coordinator.snapshot().await;
    drop(coordinator);

    let reopened = JsonFileRemote::open(&path).await.unwrap();
    assert_eq!(reopened.board_ids().await, vec![board.id.clone()]);
    let coordinator = BoardCoordinator::load(reopened, &board.id, UserId::from_string("u"), EngineConfig::default())
        .await
        .unwrap();
    let snapshot = coordinator.snapshot().await;

    let backlog = snapshot.find_list(&todo).unwrap();
    assert_eq!(backlog.name, "Backlog");
    assert_eq!(backlog.cards.len(), 1);
    assert_eq!(backlog.cards[0].id, second.id);
    assert_eq!(backlog.cards[0].position, 0);

    let moved = snapshot.find_card(&first.id).unwrap();
    assert_eq!(moved.list_id, done);
    assert!(moved.is_completed);

    assert_eq!(snapshot.total_cards(), local.total_cards());
    assert!(snapshot.check_invariants().is_ok());
}

#[cfg(unix)]
#[tokio::test]
async fn test_write_abandoned_by_timeout_is_not_committed() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("board.json");

    let board = Board::new("Team");
    let lists = board.default_lists();
    let (todo, done) = (lists[0].id.clone(), lists[2].id.clone());
    let remote = Arc::new(JsonFileRemote::create(&path, board.clone(), lists).await.unwrap());
    let config = EngineConfig::default().with_remote_timeout(Duration::from_millis(300));
    let coordinator = BoardCoordinator::load(remote.clone(), &board.id, UserId::from_string("u"), config)
        .await
        .unwrap();
    let card = coordinator.create_card(&todo, "stuck").await.payload.unwrap();

    // A FIFO at the temp path blocks the write until something reads it.
    let temp_path = path.with_extension("tmp");
    let status = std::process::Command::new("mkfifo")
        .arg(&temp_path)
        .status()
        .unwrap();
    assert!(status.success());

    let outcome = coordinator.move_card(&card.id, &todo, &done, 0).await;
    assert!(!outcome.success);
    assert!(outcome.message.unwrap().contains("timed out"));

    // Let the abandoned blocking write finish, then clear the FIFO.
    let reader = {
        let temp_path = temp_path.clone();
        std::thread::spawn(move || std::fs::read(temp_path).unwrap())
    };
    reader.join().unwrap();
    std::fs::remove_file(&temp_path).unwrap();

    coordinator.reload().await.unwrap();
    let stored = coordinator.snapshot().await.find_card(&card.id).cloned().unwrap();
    assert_eq!(stored.list_id, todo);
    assert!(!stored.is_completed);

    // The next successful write must not carry the abandoned move to disk.
    assert!(coordinator.create_card(&todo, "after").await.success);
    let reopened = JsonFileRemote::open(&path).await.unwrap();
    let coordinator = BoardCoordinator::load(reopened, &board.id, UserId::from_string("u"), EngineConfig::default())
        .await
        .unwrap();
    let snapshot = coordinator.snapshot().await;
    assert_eq!(snapshot.find_card(&card.id).unwrap().list_id, todo);
    assert_eq!(snapshot.find_list(&done).unwrap().card_count(), 0);
}
