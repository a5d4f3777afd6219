//! End-to-end drag flows: gesture in, batched persistence out.
//!
//! Each test drives the public engine surface the way an adapter would —
//! load the board, run a drag session against a layout snapshot, hand the
//! committed move to the persistence bridge — and asserts on the store's
//! call log and final rows.

use std::sync::Arc;
use std::time::{Duration, Instant};

use corkboard::store::{ListRecord, MemoryStore, Profile, StoreCall, TaskPosition, TaskRecord};
use corkboard::{
    Board, BoardLayout, CardBox, ColumnLayout, DragController, DropOutcome, EngineConfig, Grip,
    ListId, LiveUpdate, Notice, Notifier, PersistBridge, Point, Rect, SessionError, TaskId, ops,
};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc::UnboundedReceiver;

fn task_record(id: &str, list: &str, position: usize) -> TaskRecord {
    TaskRecord {
        id: TaskId::from(id),
        list_id: ListId::from(list),
        title: format!("Task {id}"),
        description: String::new(),
        completed: false,
        position,
    }
}

fn list_record(id: &str, title: &str, position: usize) -> ListRecord {
    ListRecord {
        id: ListId::from(id),
        title: title.to_string(),
        position,
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::seeded(
        Profile {
            id: "user-1".to_string(),
            theme: "dark".to_string(),
        },
        vec![
            list_record("a", "To do", 0),
            list_record("b", "Doing", 1),
            list_record("c", "Done", 2),
        ],
        vec![
            task_record("t1", "a", 0),
            task_record("t2", "a", 1),
            task_record("t3", "a", 2),
            task_record("t4", "b", 0),
        ],
    ))
}

async fn load_fixture() -> (Board, Arc<MemoryStore>, Notifier, UnboundedReceiver<Notice>) {
    let store = seeded_store();
    let (notifier, notices) = Notifier::channel();
    let board = ops::load_board(store.as_ref(), &notifier, &EngineConfig::default(), "user-1")
        .await
        .unwrap();
    (board, store, notifier, notices)
}

/// Columns 120px apart and 100 wide; cards 50 tall below a 40px header.
/// Rebuilt after every live move, the way a presentation layer re-lays-out.
fn layout_of(board: &Board) -> BoardLayout {
    BoardLayout {
        columns: board
            .lists
            .iter()
            .enumerate()
            .map(|(i, l)| {
                let x = i as f32 * 120.0;
                ColumnLayout {
                    id: l.id.clone(),
                    bounds: Rect::new(x, 0.0, 100.0, 600.0),
                    cards: l
                        .tasks
                        .iter()
                        .enumerate()
                        .map(|(j, t)| CardBox {
                            id: t.id.clone(),
                            bounds: Rect::new(x, 40.0 + j as f32 * 50.0, 100.0, 50.0),
                        })
                        .collect(),
                }
            })
            .collect(),
    }
}

/// Pointer over column `col`, just above the midpoint of card slot `slot`.
fn over_slot(col: usize, slot: usize) -> Point {
    Point::new(col as f32 * 120.0 + 50.0, 40.0 + slot as f32 * 50.0 + 10.0)
}

/// Instants a comfortable frame apart, so the gate admits every sample.
fn frame(t0: Instant, n: u64) -> Instant {
    t0 + Duration::from_millis(n * 20)
}

fn pos(id: &str, position: usize) -> TaskPosition {
    TaskPosition {
        id: TaskId::from(id),
        position,
    }
}

async fn reorder_calls(store: &MemoryStore) -> Vec<StoreCall> {
    store
        .calls()
        .await
        .into_iter()
        .filter(|c| matches!(c, StoreCall::ReorderTasks { .. } | StoreCall::ReorderLists { .. }))
        .collect()
}

#[tokio::test]
async fn test_cross_list_drag_persists_exactly_the_affected_lists() {
    let (mut board, store, notifier, mut notices) = load_fixture().await;
    let bridge = PersistBridge::new(store.clone(), notifier);
    let mut drag = DragController::new(&EngineConfig::default());
    let t0 = Instant::now();

    drag.start_task(&board, &"t2".into()).unwrap();
    let layout = layout_of(&board);
    drag.update(&mut board, &layout, over_slot(1, 0), t0).unwrap();

    let outcome = drag.drop_session(&board).unwrap();
    let DropOutcome::Moved(mv) = outcome else {
        panic!("expected a move, got {outcome:?}");
    };
    // The machine is IDLE before any persistence happens.
    assert!(!drag.is_dragging());
    bridge.commit(&board, &mv).await;

    let calls = reorder_calls(store.as_ref()).await;
    assert_eq!(calls.len(), 2);
    let for_list = |id: &str| {
        calls
            .iter()
            .find_map(|c| match c {
                StoreCall::ReorderTasks { list_id, positions } if list_id == &ListId::from(id) => {
                    Some(positions.clone())
                }
                _ => None,
            })
            .unwrap()
    };
    assert_eq!(for_list("a"), vec![pos("t1", 0), pos("t3", 1)]);
    assert_eq!(for_list("b"), vec![pos("t2", 0), pos("t4", 1)]);

    // Store rows converge on what the user is looking at.
    let records = store.task_records().await;
    let t2 = records.iter().find(|t| t.id.as_str() == "t2").unwrap();
    assert_eq!(t2.list_id, ListId::from("b"));
    assert_eq!(t2.position, 0);
    assert!(notices.try_recv().is_err());
}

#[tokio::test]
async fn test_same_list_drag_makes_one_batched_write() {
    let (mut board, store, notifier, _notices) = load_fixture().await;
    let bridge = PersistBridge::new(store.clone(), notifier);
    let mut drag = DragController::new(&EngineConfig::default());

    drag.start_task(&board, &"t3".into()).unwrap();
    let layout = layout_of(&board);
    drag.update(&mut board, &layout, over_slot(0, 0), Instant::now())
        .unwrap();

    let DropOutcome::Moved(mv) = drag.drop_session(&board).unwrap() else {
        panic!("expected a move");
    };
    bridge.commit(&board, &mv).await;

    let calls = reorder_calls(store.as_ref()).await;
    assert_eq!(
        calls,
        vec![StoreCall::ReorderTasks {
            list_id: ListId::from("a"),
            positions: vec![pos("t3", 0), pos("t1", 1), pos("t2", 2)],
        }]
    );
}

#[tokio::test]
async fn test_drop_at_origin_issues_no_writes() {
    let (mut board, store, _notifier, _notices) = load_fixture().await;
    let original = board.clone();
    let mut drag = DragController::new(&EngineConfig::default());

    drag.start_task(&board, &"t2".into()).unwrap();
    let layout = layout_of(&board);
    // Hovering over its own slot resolves to the current placement.
    drag.update(&mut board, &layout, over_slot(0, 1), Instant::now())
        .unwrap();

    assert_eq!(drag.drop_session(&board).unwrap(), DropOutcome::Unchanged);
    assert_eq!(board, original);
    assert!(reorder_calls(store.as_ref()).await.is_empty());
}

#[tokio::test]
async fn test_cancelled_drag_restores_board_and_writes_nothing() {
    let (mut board, store, _notifier, _notices) = load_fixture().await;
    let original = board.clone();
    let mut drag = DragController::new(&EngineConfig::default());
    let t0 = Instant::now();

    // Wander across two other columns before bailing out.
    drag.start_task(&board, &"t2".into()).unwrap();
    let layout = layout_of(&board);
    drag.update(&mut board, &layout, over_slot(1, 0), frame(t0, 0))
        .unwrap();
    let layout = layout_of(&board);
    drag.update(&mut board, &layout, over_slot(2, 0), frame(t0, 1))
        .unwrap();
    assert_ne!(board, original);

    drag.cancel(&mut board).unwrap();
    assert_eq!(board, original);
    assert!(!drag.is_dragging());
    // The only store traffic in this whole test is the initial fetch.
    assert_eq!(
        store.calls().await,
        vec![StoreCall::FetchBoard {
            user_id: "user-1".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_list_drag_makes_one_full_order_write() {
    let (mut board, store, notifier, _notices) = load_fixture().await;
    let bridge = PersistBridge::new(store.clone(), notifier);
    let mut drag = DragController::new(&EngineConfig::default());

    drag.start_list(&board, &"c".into(), Grip::Header).unwrap();
    let layout = layout_of(&board);
    drag.update(&mut board, &layout, Point::new(10.0, 10.0), Instant::now())
        .unwrap();

    let DropOutcome::Moved(mv) = drag.drop_session(&board).unwrap() else {
        panic!("expected a move");
    };
    bridge.commit(&board, &mv).await;

    let calls = reorder_calls(store.as_ref()).await;
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], StoreCall::ReorderLists { positions } if positions.len() == 3));
    let records = store.list_records().await;
    let position_of = |id: &str| {
        records
            .iter()
            .find(|l| l.id.as_str() == id)
            .unwrap()
            .position
    };
    assert_eq!(position_of("c"), 0);
    assert_eq!(position_of("a"), 1);
    assert_eq!(position_of("b"), 2);
}

#[tokio::test]
async fn test_list_drag_from_card_area_never_starts() {
    let (board, store, _notifier, _notices) = load_fixture().await;
    let mut drag = DragController::new(&EngineConfig::default());

    let err = drag.start_list(&board, &"b".into(), Grip::Body).unwrap_err();
    assert_eq!(err, SessionError::NotOnHeader);
    assert!(!drag.is_dragging());
    assert!(reorder_calls(store.as_ref()).await.is_empty());
}

#[tokio::test]
async fn test_drop_of_a_task_deleted_mid_drag_acts_as_cancel() {
    let (mut board, store, notifier, _notices) = load_fixture().await;
    let mut drag = DragController::new(&EngineConfig::default());

    drag.start_task(&board, &"t2".into()).unwrap();
    let layout = layout_of(&board);
    drag.update(&mut board, &layout, over_slot(1, 0), Instant::now())
        .unwrap();

    // Another surface deletes the card under the user's finger.
    ops::delete_task(&mut board, store.as_ref(), &notifier, &"t2".into())
        .await
        .unwrap();

    assert_eq!(drag.drop_session(&board).unwrap(), DropOutcome::Vanished);
    assert!(!drag.is_dragging());
    assert!(reorder_calls(store.as_ref()).await.is_empty());
    assert_eq!(board.verify(), Ok(()));
}

#[tokio::test]
async fn test_pointer_flood_coalesces_to_frame_granularity() {
    let (mut board, _store, _notifier, _notices) = load_fixture().await;
    let mut drag = DragController::new(&EngineConfig::default());
    let t0 = Instant::now();

    drag.start_task(&board, &"t2".into()).unwrap();
    let layout = layout_of(&board);
    let first = drag.update(&mut board, &layout, over_slot(1, 0), t0).unwrap();
    assert!(matches!(first, LiveUpdate::Task { .. }));

    // A burst of samples inside the 16ms frame window all coalesce away.
    let layout = layout_of(&board);
    for ms in 1..=10 {
        let update = drag
            .update(
                &mut board,
                &layout,
                over_slot(2, 0),
                t0 + Duration::from_millis(ms),
            )
            .unwrap();
        assert_eq!(update, LiveUpdate::Deferred);
    }
    assert_eq!(board.locate_task(&"t2".into()), Some((ListId::from("b"), 0)));

    // The next frame applies the latest pointer.
    let update = drag
        .update(
            &mut board,
            &layout,
            over_slot(2, 0),
            t0 + Duration::from_millis(20),
        )
        .unwrap();
    assert_eq!(
        update,
        LiveUpdate::Task {
            list: ListId::from("c"),
            index: 0,
        }
    );
}
