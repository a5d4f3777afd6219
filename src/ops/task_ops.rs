use super::OpError;
use crate::config::EngineConfig;
use crate::model::{Board, List, ListId, ModelError, Task, TaskId};
use crate::notify::Notifier;
use crate::store::{BoardStore, TaskPatch};

// ---------------------------------------------------------------------------
// 1 — Create / delete
// ---------------------------------------------------------------------------

/// Create a task at the bottom of `list_id`.
///
/// Store-first: the task only appears locally once the backend has issued
/// its row, so a failed create leaves no phantom card behind.
pub async fn create_task<S: BoardStore>(
    board: &mut Board,
    store: &S,
    notifier: &Notifier,
    list_id: &ListId,
    title: &str,
) -> Result<TaskId, OpError> {
    let position = board
        .list(list_id)
        .ok_or_else(|| ModelError::UnknownList(list_id.clone()))?
        .tasks
        .len();

    let record = match store.create_task(list_id, title, position).await {
        Ok(record) => record,
        Err(err) => {
            notifier.error("Failed to create task");
            return Err(err.into());
        }
    };

    let id = record.id.clone();
    if let Some(list) = board.list_mut(list_id) {
        list.tasks.push(Task::from(record));
        list.renumber();
    }
    tracing::debug!(task = %id, list = %list_id, "created task");
    Ok(id)
}

/// Delete a task from wherever it lives, archive included. Store-first.
pub async fn delete_task<S: BoardStore>(
    board: &mut Board,
    store: &S,
    notifier: &Notifier,
    task_id: &TaskId,
) -> Result<(), OpError> {
    if board.task(task_id).is_none() {
        return Err(ModelError::UnknownTask(task_id.clone()).into());
    }
    if let Err(err) = store.delete_task(task_id).await {
        notifier.error("Failed to delete task");
        return Err(err.into());
    }
    board.remove_task(task_id);
    Ok(())
}

// ---------------------------------------------------------------------------
// 2 — Field edits
// ---------------------------------------------------------------------------

/// The editable text fields of a task; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Apply a title/description edit optimistically and persist it.
///
/// On a failed write, exactly the fields this edit touched are restored to
/// their prior values; anything else about the task is left alone. This is
/// the one place the engine rolls local state back — reorder persistence
/// deliberately does not (see [`crate::bridge::PersistBridge`]).
pub async fn update_task_fields<S: BoardStore>(
    board: &mut Board,
    store: &S,
    notifier: &Notifier,
    task_id: &TaskId,
    edit: TaskEdit,
) -> Result<(), OpError> {
    let task = board
        .task_mut(task_id)
        .ok_or_else(|| ModelError::UnknownTask(task_id.clone()))?;

    let mut undo = TaskEdit::default();
    if let Some(title) = &edit.title {
        undo.title = Some(std::mem::replace(&mut task.title, title.clone()));
    }
    if let Some(description) = &edit.description {
        undo.description = Some(std::mem::replace(&mut task.description, description.clone()));
    }

    let patch = TaskPatch {
        title: edit.title,
        description: edit.description,
        ..TaskPatch::default()
    };
    if let Err(err) = store.update_task(task_id, patch).await {
        if let Some(task) = board.task_mut(task_id) {
            if let Some(title) = undo.title {
                task.title = title;
            }
            if let Some(description) = undo.description {
                task.description = description;
            }
        }
        notifier.error("Failed to save task changes");
        return Err(err.into());
    }
    Ok(())
}

/// Flip a task's completed flag optimistically; flip it back if the write
/// fails. Returns the flag's new value.
pub async fn toggle_completed<S: BoardStore>(
    board: &mut Board,
    store: &S,
    notifier: &Notifier,
    task_id: &TaskId,
) -> Result<bool, OpError> {
    let task = board
        .task_mut(task_id)
        .ok_or_else(|| ModelError::UnknownTask(task_id.clone()))?;
    task.completed = !task.completed;
    let completed = task.completed;

    let patch = TaskPatch {
        completed: Some(completed),
        ..TaskPatch::default()
    };
    if let Err(err) = store.update_task(task_id, patch).await {
        if let Some(task) = board.task_mut(task_id) {
            task.completed = !completed;
        }
        notifier.error("Failed to update task");
        return Err(err.into());
    }
    Ok(completed)
}

// ---------------------------------------------------------------------------
// 3 — Archive / restore
// ---------------------------------------------------------------------------

/// Move a task into the archive list, creating that list on first use.
///
/// The archive list is created far past the draggable position range so it
/// never interleaves with real columns, and is recognized on later loads by
/// its reserved title. Archiving an already-archived task is a no-op.
pub async fn archive_task<S: BoardStore>(
    board: &mut Board,
    store: &S,
    notifier: &Notifier,
    config: &EngineConfig,
    task_id: &TaskId,
) -> Result<(), OpError> {
    if board.locate_task(task_id).is_none() {
        if board.task(task_id).is_some() {
            return Ok(());
        }
        return Err(ModelError::UnknownTask(task_id.clone()).into());
    }

    let (archive_id, position) = match &board.archive {
        Some(archive) => (archive.id.clone(), archive.tasks.len()),
        None => {
            let at = board.lists.iter().map(|l| l.position).max().unwrap_or(0) + 1000;
            match store.create_list(&config.archive_title, at).await {
                Ok(record) => {
                    let archive = List::from(record);
                    let id = archive.id.clone();
                    board.archive = Some(archive);
                    (id, 0)
                }
                Err(err) => {
                    notifier.error("Failed to archive task");
                    return Err(err.into());
                }
            }
        }
    };

    let patch = TaskPatch {
        list_id: Some(archive_id.clone()),
        position: Some(position),
        ..TaskPatch::default()
    };
    if let Err(err) = store.update_task(task_id, patch).await {
        notifier.error("Failed to archive task");
        return Err(err.into());
    }

    if let Some(task) = board.remove_task(task_id)
        && let Some(archive) = board.archive.as_mut()
    {
        archive.tasks.push(task);
        archive.renumber();
    }
    tracing::debug!(task = %task_id, "archived task");
    Ok(())
}

/// Move a task out of the archive, to the end of `target` when that list
/// still exists, else to the end of the leftmost list. Returns the list
/// the task landed in.
pub async fn unarchive_task<S: BoardStore>(
    board: &mut Board,
    store: &S,
    notifier: &Notifier,
    task_id: &TaskId,
    target: Option<&ListId>,
) -> Result<ListId, OpError> {
    let archived = board
        .archive
        .as_ref()
        .is_some_and(|a| a.index_of(task_id).is_some());
    if !archived {
        return Err(ModelError::UnknownTask(task_id.clone()).into());
    }

    let target = target
        .and_then(|id| board.list(id))
        .or_else(|| board.lists.first())
        .ok_or(OpError::NoRestoreTarget)?;
    let target_id = target.id.clone();
    let position = target.tasks.len();

    let patch = TaskPatch {
        list_id: Some(target_id.clone()),
        position: Some(position),
        ..TaskPatch::default()
    };
    if let Err(err) = store.update_task(task_id, patch).await {
        notifier.error("Failed to restore task");
        return Err(err.into());
    }

    if let Some(task) = board.remove_task(task_id)
        && let Some(list) = board.list_mut(&target_id)
    {
        list.tasks.push(task);
        list.renumber();
    }
    Ok(target_id)
}
