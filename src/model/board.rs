use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ids::{ListId, TaskId};
use super::list::List;
use super::task::Task;
use crate::config::EngineConfig;
use crate::store::{BoardSnapshot, Profile};

/// Error type for ordering-model operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("unknown list: {0}")]
    UnknownList(ListId),
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),
    #[error("task {task} is not in list {list}")]
    TaskNotInList { task: TaskId, list: ListId },
    #[error("ordering invariant violated: {0}")]
    InvariantViolated(String),
}

/// What a move operation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The item was moved; `index` is its final (clamped) index
    Moved { index: usize },
    /// Source and target placement were identical; nothing changed
    Noop,
}

/// The in-memory ordering model: draggable lists, the archive, and the profile.
///
/// An owned value, not a global — callers pass it `&mut` into the drag
/// controller and the board operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Draggable lists in display order
    pub lists: Vec<List>,
    /// The archive list once it exists; never part of `lists`
    pub archive: Option<List>,
    pub profile: Profile,
}

impl Board {
    pub fn new(profile: Profile) -> Self {
        Board {
            lists: Vec::new(),
            archive: None,
            profile,
        }
    }

    // -----------------------------------------------------------------------
    // 1 — Assembly from a store snapshot
    // -----------------------------------------------------------------------

    /// Build a board from fetched records.
    ///
    /// Lists and tasks are ordered by their stored positions (which may be
    /// gapped), lists bearing the reserved archive title are held out of the
    /// draggable set (the first becomes the archive), and everything is
    /// renumbered dense. A task whose `list_id` matches no kept list is
    /// dropped with a warning rather than failing the load.
    pub fn from_snapshot(snapshot: BoardSnapshot, config: &EngineConfig) -> Board {
        let BoardSnapshot {
            profile,
            mut lists,
            mut tasks,
        } = snapshot;
        lists.sort_by_key(|l| l.position);
        tasks.sort_by_key(|t| t.position);

        let mut board = Board::new(profile);
        for record in lists {
            let list = List::from(record);
            if list.title != config.archive_title {
                board.lists.push(list);
            } else if board.archive.is_none() {
                board.archive = Some(list);
            } else {
                tracing::warn!(list = %list.id, "dropping duplicate archive-titled list");
            }
        }

        for record in tasks {
            let home = board
                .lists
                .iter_mut()
                .find(|l| l.id == record.list_id)
                .or_else(|| {
                    board
                        .archive
                        .as_mut()
                        .filter(|archive| archive.id == record.list_id)
                });
            match home {
                Some(list) => list.tasks.push(Task::from(record)),
                None => {
                    tracing::warn!(
                        task = %record.id,
                        list = %record.list_id,
                        "dropping task that references a missing list"
                    );
                }
            }
        }

        board.renumber_lists();
        for list in &mut board.lists {
            list.renumber();
        }
        if let Some(archive) = &mut board.archive {
            archive.renumber();
        }
        board.debug_verify();
        board
    }

    // -----------------------------------------------------------------------
    // 2 — Lookup
    // -----------------------------------------------------------------------

    /// A draggable list by id (the archive is not draggable; see `task`)
    pub fn list(&self, id: &ListId) -> Option<&List> {
        self.lists.iter().find(|l| &l.id == id)
    }

    pub fn list_mut(&mut self, id: &ListId) -> Option<&mut List> {
        self.lists.iter_mut().find(|l| &l.id == id)
    }

    /// Index of a draggable list within the board
    pub fn list_index(&self, id: &ListId) -> Option<usize> {
        self.lists.iter().position(|l| &l.id == id)
    }

    /// Placement of a task among the draggable lists
    pub fn locate_task(&self, task: &TaskId) -> Option<(ListId, usize)> {
        for list in &self.lists {
            if let Some(index) = list.index_of(task) {
                return Some((list.id.clone(), index));
            }
        }
        None
    }

    /// A task anywhere on the board, archive included
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.all_lists().find_map(|l| l.task(id))
    }

    pub fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        for list in self.lists.iter_mut().chain(self.archive.as_mut()) {
            if let Some(task) = list.task_mut(id) {
                return Some(task);
            }
        }
        None
    }

    /// Draggable lists followed by the archive, if present
    pub fn all_lists(&self) -> impl Iterator<Item = &List> {
        self.lists.iter().chain(self.archive.as_ref())
    }

    // -----------------------------------------------------------------------
    // 3 — Move operations
    // -----------------------------------------------------------------------

    /// Move a task from `from` to `to`, inserting at `target_index`.
    ///
    /// `target_index` is the insertion index in the destination after the
    /// task has been removed from its source, clamped to the valid range.
    /// Both affected lists come out with dense positions. Reports `Noop`
    /// when source and target placement coincide.
    pub fn move_task(
        &mut self,
        task: &TaskId,
        from: &ListId,
        to: &ListId,
        target_index: usize,
    ) -> Result<MoveOutcome, ModelError> {
        let from_pos = self
            .list_index(from)
            .ok_or_else(|| ModelError::UnknownList(from.clone()))?;
        let to_pos = self
            .list_index(to)
            .ok_or_else(|| ModelError::UnknownList(to.clone()))?;
        let current = self.lists[from_pos]
            .index_of(task)
            .ok_or_else(|| ModelError::TaskNotInList {
                task: task.clone(),
                list: from.clone(),
            })?;

        let outcome = if from == to {
            let list = &mut self.lists[from_pos];
            let target = target_index.min(list.tasks.len().saturating_sub(1));
            if target == current {
                return Ok(MoveOutcome::Noop);
            }
            let moved = list.tasks.remove(current);
            list.tasks.insert(target, moved);
            list.renumber();
            MoveOutcome::Moved { index: target }
        } else {
            let moved = self.lists[from_pos].tasks.remove(current);
            self.lists[from_pos].renumber();
            let dest = &mut self.lists[to_pos];
            let target = target_index.min(dest.tasks.len());
            dest.tasks.insert(target, moved);
            dest.renumber();
            MoveOutcome::Moved { index: target }
        };

        self.debug_verify();
        Ok(outcome)
    }

    /// Reorder the board's draggable lists, inserting `list` at `target_index`.
    pub fn move_list(
        &mut self,
        list: &ListId,
        target_index: usize,
    ) -> Result<MoveOutcome, ModelError> {
        let current = self
            .list_index(list)
            .ok_or_else(|| ModelError::UnknownList(list.clone()))?;
        let target = target_index.min(self.lists.len().saturating_sub(1));
        if target == current {
            return Ok(MoveOutcome::Noop);
        }
        let moved = self.lists.remove(current);
        self.lists.insert(target, moved);
        self.renumber_lists();
        self.debug_verify();
        Ok(MoveOutcome::Moved { index: target })
    }

    // -----------------------------------------------------------------------
    // 4 — Structural edits used by the board operations
    // -----------------------------------------------------------------------

    /// Remove a task from whichever list holds it (archive included)
    pub(crate) fn remove_task(&mut self, id: &TaskId) -> Option<Task> {
        for list in self.lists.iter_mut().chain(self.archive.as_mut()) {
            if let Some(index) = list.index_of(id) {
                let task = list.tasks.remove(index);
                list.renumber();
                return Some(task);
            }
        }
        None
    }

    /// Remove a draggable list outright
    pub(crate) fn remove_list(&mut self, id: &ListId) -> Option<List> {
        let index = self.list_index(id)?;
        let list = self.lists.remove(index);
        self.renumber_lists();
        Some(list)
    }

    /// Rewrite list positions after a structural change
    pub(crate) fn renumber_lists(&mut self) {
        for (i, list) in self.lists.iter_mut().enumerate() {
            list.position = i;
        }
    }

    // -----------------------------------------------------------------------
    // 5 — Invariant
    // -----------------------------------------------------------------------

    /// Check the ordering invariant: list positions dense, task positions
    /// dense per list, back-references agreeing, and no task present twice.
    pub fn verify(&self) -> Result<(), ModelError> {
        for (i, list) in self.lists.iter().enumerate() {
            if list.position != i {
                return Err(ModelError::InvariantViolated(format!(
                    "list {} has position {} at index {}",
                    list.id, list.position, i
                )));
            }
        }
        let mut seen: HashSet<&TaskId> = HashSet::new();
        for list in self.all_lists() {
            for (i, task) in list.tasks.iter().enumerate() {
                if task.position != i {
                    return Err(ModelError::InvariantViolated(format!(
                        "task {} has position {} at index {} of list {}",
                        task.id, task.position, i, list.id
                    )));
                }
                if task.list_id != list.id {
                    return Err(ModelError::InvariantViolated(format!(
                        "task {} in list {} claims list {}",
                        task.id, list.id, task.list_id
                    )));
                }
                if !seen.insert(&task.id) {
                    return Err(ModelError::InvariantViolated(format!(
                        "task {} appears in more than one list",
                        task.id
                    )));
                }
            }
        }
        Ok(())
    }

    fn debug_verify(&self) {
        debug_assert_eq!(self.verify(), Ok(()));
    }
}
