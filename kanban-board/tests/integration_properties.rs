//! Property tests: random move sequences keep the board consistent

use kanban_board::{
    Board, BoardCoordinator, BoardSnapshot, Card, CardId, EngineConfig, InMemoryRemote, List,
    ListId, UserId,
};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Step {
    card: usize,
    target_list: usize,
    target_index: usize,
    fail: bool,
}

fn step() -> impl Strategy<Value = Step> {
    (0usize..12, 0usize..3, 0usize..8, prop::bool::weighted(0.25)).prop_map(
        |(card, target_list, target_index, fail)| Step {
            card,
            target_list,
            target_index,
            fail,
        },
    )
}

fn fixture() -> (Board, Vec<List>) {
    let board = Board::new("Props").with_id("b");
    let names = ["todo", "doing", "done"];
    let lists = names
        .iter()
        .enumerate()
        .map(|(li, name)| {
            let cards = (0..4)
                .map(|ci| {
                    let id = format!("{name}-{ci}");
                    Card::new(id.clone(), ListId::from_string(*name), ci).with_id(id)
                })
                .collect();
            List::new(board.id.clone(), *name, li)
                .with_id(*name)
                .with_final(*name == "done")
                .with_cards(cards)
        })
        .collect();
    (board, lists)
}

/// `(list, card, position, completed)` for every card, in board order
fn layout(snapshot: &BoardSnapshot) -> Vec<(String, String, usize, bool)> {
    snapshot
        .lists()
        .iter()
        .flat_map(|l| {
            l.cards
                .iter()
                .map(|c| (l.id.to_string(), c.id.to_string(), c.position, c.is_completed))
        })
        .collect()
}

async fn run(steps: Vec<Step>) -> std::result::Result<(), TestCaseError> {
    let (board, lists) = fixture();
    let all_cards: Vec<CardId> = lists
        .iter()
        .flat_map(|l| l.cards.iter().map(|c| c.id.clone()))
        .collect();
    let remote = Arc::new(InMemoryRemote::with_board(board.clone(), lists));
    let coordinator = BoardCoordinator::load(remote.clone(), &board.id, UserId::from_string("p"), EngineConfig::default())
        .await
        .map_err(|e| TestCaseError::fail(e.to_string()))?;

    for step in steps {
        let before = coordinator.snapshot().await;
        let card_id = &all_cards[step.card];
        let source = before.list_of_card(card_id).map(|l| l.id.clone());
        let Some(source) = source else {
            return Err(TestCaseError::fail(format!("{card_id} lost")));
        };
        let target = before.lists()[step.target_list].id.clone();
        let was_completed = before.find_card(card_id).map(|c| c.is_completed);

        if step.fail {
            remote.fail_next("BatchUpdatePositions", "injected").await;
            remote.fail_next("UpdateCardPosition", "injected").await;
        }
        let outcome = coordinator
            .move_card(card_id, &source, &target, step.target_index)
            .await;
        remote.clear_faults().await;

        let after = coordinator.snapshot().await;
        prop_assert!(after.check_invariants().is_ok(), "{:?}", after.check_invariants());
        prop_assert_eq!(after.total_cards(), all_cards.len());

        if !outcome.success {
            prop_assert_eq!(&after, &before);
            continue;
        }

        let moved = after.find_card(card_id).unwrap();
        if after.find_list(&target).unwrap().is_final {
            prop_assert!(moved.is_completed);
        }
        if was_completed == Some(true) {
            prop_assert!(moved.is_completed);
        }
    }

    let local = coordinator.snapshot().await;
    coordinator
        .reload()
        .await
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(layout(&local), layout(&coordinator.snapshot().await));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_moves_keep_board_consistent(steps in prop::collection::vec(step(), 1..20)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(run(steps))?;
    }
}
