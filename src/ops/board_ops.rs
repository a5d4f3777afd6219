use super::OpError;
use crate::config::EngineConfig;
use crate::model::{Board, List, ListId, ModelError};
use crate::notify::Notifier;
use crate::store::BoardStore;

/// Themes a profile may select
pub const THEMES: &[&str] = &["dark", "light", "awesome"];

// ---------------------------------------------------------------------------
// 1 — Loading
// ---------------------------------------------------------------------------

/// Fetch a user's records and assemble the in-memory board.
pub async fn load_board<S: BoardStore>(
    store: &S,
    notifier: &Notifier,
    config: &EngineConfig,
    user_id: &str,
) -> Result<Board, OpError> {
    match store.fetch_board(user_id).await {
        Ok(snapshot) => {
            let mut board = Board::from_snapshot(snapshot, config);
            // A stored theme that is no longer offered falls back to the
            // default rather than failing the load.
            if !THEMES.contains(&board.profile.theme.as_str()) {
                tracing::warn!(theme = %board.profile.theme, "unknown stored theme, using dark");
                board.profile.theme = "dark".to_string();
            }
            tracing::debug!(
                lists = board.lists.len(),
                archived = board.archive.is_some(),
                "board loaded"
            );
            Ok(board)
        }
        Err(err) => {
            notifier.error("Failed to load your board. Please refresh.");
            Err(err.into())
        }
    }
}

// ---------------------------------------------------------------------------
// 2 — List CRUD
// ---------------------------------------------------------------------------

/// Create an empty list at the right edge of the board. Store-first.
pub async fn create_list<S: BoardStore>(
    board: &mut Board,
    store: &S,
    notifier: &Notifier,
    title: &str,
) -> Result<ListId, OpError> {
    let position = board.lists.len();
    let record = match store.create_list(title, position).await {
        Ok(record) => record,
        Err(err) => {
            notifier.error("Failed to create list");
            return Err(err.into());
        }
    };
    let id = record.id.clone();
    board.lists.push(List::from(record));
    board.renumber_lists();
    Ok(id)
}

/// Rename a list optimistically; restore the old title if the write fails.
pub async fn rename_list<S: BoardStore>(
    board: &mut Board,
    store: &S,
    notifier: &Notifier,
    list_id: &ListId,
    title: &str,
) -> Result<(), OpError> {
    let list = board
        .list_mut(list_id)
        .ok_or_else(|| ModelError::UnknownList(list_id.clone()))?;
    let previous = std::mem::replace(&mut list.title, title.to_string());

    if let Err(err) = store.rename_list(list_id, title).await {
        if let Some(list) = board.list_mut(list_id) {
            list.title = previous;
        }
        notifier.error("Failed to rename list");
        return Err(err.into());
    }
    Ok(())
}

/// Delete a list and every task it holds. Store-first.
pub async fn delete_list<S: BoardStore>(
    board: &mut Board,
    store: &S,
    notifier: &Notifier,
    list_id: &ListId,
) -> Result<(), OpError> {
    if board.list(list_id).is_none() {
        return Err(ModelError::UnknownList(list_id.clone()).into());
    }
    if let Err(err) = store.delete_list(list_id).await {
        notifier.error("Failed to delete list");
        return Err(err.into());
    }
    board.remove_list(list_id);
    Ok(())
}

// ---------------------------------------------------------------------------
// 3 — Theme
// ---------------------------------------------------------------------------

/// Switch the profile's theme.
///
/// The new theme stays applied locally even when persisting it fails —
/// reverting a visible theme switch under the user would be worse than
/// living with an unsaved preference.
pub async fn set_theme<S: BoardStore>(
    board: &mut Board,
    store: &S,
    notifier: &Notifier,
    theme: &str,
) -> Result<(), OpError> {
    if !THEMES.contains(&theme) {
        return Err(OpError::UnknownTheme(theme.to_string()));
    }
    board.profile.theme = theme.to_string();
    if let Err(err) = store.update_theme(theme).await {
        notifier.error("Failed to save theme preference");
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskId;
    use crate::notify::{Notice, NoticeKind};
    use crate::store::{
        BoardSnapshot, ListRecord, MemoryStore, Profile, StoreCall, StoreError, TaskRecord,
    };
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn snapshot() -> BoardSnapshot {
        BoardSnapshot {
            profile: Profile {
                id: "user-1".to_string(),
                theme: "dark".to_string(),
            },
            lists: vec![
                ListRecord {
                    id: ListId::from("a"),
                    title: "To do".to_string(),
                    position: 0,
                },
                ListRecord {
                    id: ListId::from("b"),
                    title: "Doing".to_string(),
                    position: 1,
                },
            ],
            tasks: vec![TaskRecord {
                id: TaskId::from("t1"),
                list_id: ListId::from("a"),
                title: "First".to_string(),
                description: String::new(),
                completed: false,
                position: 0,
            }],
        }
    }

    fn fixture() -> (Board, MemoryStore, Notifier, UnboundedReceiver<Notice>) {
        let snapshot = snapshot();
        let store = MemoryStore::seeded(
            snapshot.profile.clone(),
            snapshot.lists.clone(),
            snapshot.tasks.clone(),
        );
        let board = Board::from_snapshot(snapshot, &EngineConfig::default());
        let (notifier, notices) = Notifier::channel();
        (board, store, notifier, notices)
    }

    fn expect_error_notice(notices: &mut UnboundedReceiver<Notice>, message: &str) {
        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, message);
    }

    // --- 1 Loading ---

    #[tokio::test]
    async fn test_load_board_assembles_from_snapshot() {
        let (expected, store, notifier, _notices) = fixture();
        let board = load_board(&store, &notifier, &EngineConfig::default(), "user-1")
            .await
            .unwrap();
        assert_eq!(board, expected);
        assert_eq!(
            store.calls().await,
            vec![StoreCall::FetchBoard {
                user_id: "user-1".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_load_board_failure_notifies() {
        let (_, store, notifier, mut notices) = fixture();
        store
            .fail_next(StoreError::Backend("down".to_string()))
            .await;
        load_board(&store, &notifier, &EngineConfig::default(), "user-1")
            .await
            .unwrap_err();
        expect_error_notice(&mut notices, "Failed to load your board. Please refresh.");
    }

    #[tokio::test]
    async fn test_load_board_defaults_unknown_stored_theme() {
        let mut snap = snapshot();
        snap.profile.theme = "sepia".to_string();
        let store = MemoryStore::seeded(snap.profile.clone(), snap.lists, snap.tasks);
        let (notifier, _notices) = Notifier::channel();
        let board = load_board(&store, &notifier, &EngineConfig::default(), "user-1")
            .await
            .unwrap();
        assert_eq!(board.profile.theme, "dark");
    }

    // --- 2 List CRUD ---

    #[tokio::test]
    async fn test_create_list_appends_at_right_edge() {
        let (mut board, store, notifier, _notices) = fixture();
        let id = create_list(&mut board, &store, &notifier, "Done")
            .await
            .unwrap();
        assert_eq!(board.lists.len(), 3);
        assert_eq!(board.lists[2].id, id);
        assert_eq!(board.lists[2].position, 2);
        assert!(store.list_records().await.iter().any(|l| l.id == id));
        assert_eq!(board.verify(), Ok(()));
    }

    #[tokio::test]
    async fn test_rename_list_rolls_back_on_failure() {
        let (mut board, store, notifier, mut notices) = fixture();
        store
            .fail_next(StoreError::Backend("down".to_string()))
            .await;
        rename_list(&mut board, &store, &notifier, &"a".into(), "Backlog")
            .await
            .unwrap_err();
        assert_eq!(board.list(&"a".into()).unwrap().title, "To do");
        expect_error_notice(&mut notices, "Failed to rename list");

        rename_list(&mut board, &store, &notifier, &"a".into(), "Backlog")
            .await
            .unwrap();
        assert_eq!(board.list(&"a".into()).unwrap().title, "Backlog");
        let records = store.list_records().await;
        assert_eq!(
            records.iter().find(|l| l.id.as_str() == "a").unwrap().title,
            "Backlog"
        );
    }

    #[tokio::test]
    async fn test_delete_list_takes_its_tasks_with_it() {
        let (mut board, store, notifier, _notices) = fixture();
        delete_list(&mut board, &store, &notifier, &"a".into())
            .await
            .unwrap();
        assert_eq!(board.lists.len(), 1);
        assert_eq!(board.task(&"t1".into()), None);
        assert!(store.task_records().await.is_empty());
        // The surviving list slides into the freed position.
        assert_eq!(board.lists[0].position, 0);
    }

    #[tokio::test]
    async fn test_delete_list_is_store_first() {
        let (mut board, store, notifier, mut notices) = fixture();
        store
            .fail_next(StoreError::Backend("down".to_string()))
            .await;
        delete_list(&mut board, &store, &notifier, &"a".into())
            .await
            .unwrap_err();
        assert_eq!(board.lists.len(), 2);
        assert!(board.task(&"t1".into()).is_some());
        expect_error_notice(&mut notices, "Failed to delete list");
    }

    // --- 3 Theme ---

    #[tokio::test]
    async fn test_set_theme_rejects_unknown_theme() {
        let (mut board, store, notifier, _notices) = fixture();
        let err = set_theme(&mut board, &store, &notifier, "solarized")
            .await
            .unwrap_err();
        assert!(matches!(err, OpError::UnknownTheme(_)));
        assert_eq!(board.profile.theme, "dark");
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_set_theme_keeps_local_value_on_failed_write() {
        let (mut board, store, notifier, mut notices) = fixture();
        store
            .fail_next(StoreError::Backend("down".to_string()))
            .await;
        set_theme(&mut board, &store, &notifier, "light")
            .await
            .unwrap_err();
        // Local switch survives; only the persisted value is stale.
        assert_eq!(board.profile.theme, "light");
        assert_eq!(store.profile().await.theme, "dark");
        expect_error_notice(&mut notices, "Failed to save theme preference");
    }
}
