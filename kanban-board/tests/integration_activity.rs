//! Integration tests for activity logging

use kanban_board::{
    Board, BoardCoordinator, CardId, CardPatch, EngineConfig, InMemoryRemote, ListId, UserId,
};
use std::sync::Arc;

#[test_log::test(tokio::test)]
async fn test_activity_logging_end_to_end() {
    let board = Board::new("Activity");
    let lists = board.default_lists();
    let todo = lists[0].id.clone();
    let done = lists[2].id.clone();
    let remote = Arc::new(InMemoryRemote::with_board(board.clone(), lists));
    let coordinator = BoardCoordinator::load(
        remote.clone(),
        &board.id,
        UserId::from_string("test-user"),
        EngineConfig::default(),
    )
    .await
    .unwrap();

    // Logged: reaches the store and succeeds
    let card = coordinator.create_card(&todo, "Write tests").await.payload.unwrap();
    coordinator
        .update_card(&card.id, CardPatch::new().with_title("Write more tests"))
        .await;
    coordinator.move_card(&card.id, &todo, &done, 0).await;

    // Not logged: rejected locally
    coordinator.create_card(&todo, "").await;
    coordinator.delete_card(&CardId::from_string("ghost")).await;

    // Logged: reaches the store and fails
    remote.fail_next("ArchiveCard", "read-only replica").await;
    coordinator.delete_card(&card.id).await;

    let entries = coordinator.activity().await;
    let ops: Vec<_> = entries.iter().map(|e| e.op.as_str()).collect();
    assert_eq!(ops, vec!["archive card", "move card", "update card", "create card"]);

    assert!(entries
        .iter()
        .all(|e| e.actor == Some(UserId::from_string("test-user"))));
    assert!(entries[0].is_error());
    assert_eq!(entries[0].output["error"], "ArchiveCard failed: read-only replica");
    assert_eq!(entries[1].output["derived_completion"], true);
    assert_eq!(entries[3].input["title"], "Write tests");
}

#[tokio::test]
async fn test_activity_ring_is_bounded() {
    let board = Board::new("Bounded");
    let lists = board.default_lists();
    let todo: ListId = lists[0].id.clone();
    let remote = InMemoryRemote::with_board(board.clone(), lists);
    let config = EngineConfig {
        activity_capacity: 3,
        ..EngineConfig::default()
    };
    let coordinator = BoardCoordinator::load(remote, &board.id, UserId::from_string("u"), config)
        .await
        .unwrap();

    for i in 0..5 {
        coordinator.create_card(&todo, &format!("card {i}")).await;
    }
    let entries = coordinator.activity().await;
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].input["title"], "card 4");
    assert_eq!(entries[2].input["title"], "card 2");
}
