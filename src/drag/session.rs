use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::drag::geometry::{BoardLayout, Point};
use crate::model::{Board, ListId, ModelError, MoveOutcome, TaskId};

/// Error type for misuse of the drag-session state machine.
///
/// These signal programming-contract violations in the integration, not
/// user-facing failures; a correct adapter never produces them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a drag session is already active")]
    AlreadyDragging,
    #[error("no drag session is active")]
    NotDragging,
    #[error("list drags must start on the list header")]
    NotOnHeader,
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Which kind of item a gesture is dragging. Carried by the session so
/// gesture recognizers can ignore events tagged for the other kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Task,
    List,
}

/// The region of a list's chrome a gesture originated on. Task cards sit
/// inside list columns, so a list drag is only valid from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grip {
    Header,
    Body,
}

/// Ephemeral state of one in-progress drag. Created on gesture start,
/// destroyed on drop or cancel, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSession {
    Task {
        task_id: TaskId,
        origin_list: ListId,
        origin_index: usize,
        current_list: ListId,
        current_index: usize,
    },
    List {
        list_id: ListId,
        origin_index: usize,
        current_index: usize,
    },
}

impl DragSession {
    pub fn kind(&self) -> DragKind {
        match self {
            DragSession::Task { .. } => DragKind::Task,
            DragSession::List { .. } => DragKind::List,
        }
    }
}

/// A live placement change reported from `update`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveUpdate {
    /// The dragged task now sits at this placement
    Task { list: ListId, index: usize },
    /// The dragged list now sits at this index
    List { index: usize },
    /// The pointer resolved to the current placement; nothing moved
    Unchanged,
    /// The sample arrived inside the current frame window and was coalesced
    Deferred,
}

/// The result of ending a drag with `drop_session`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// A net move, ready for the persistence bridge
    Moved(CommittedMove),
    /// The item ended exactly where it started; nothing to persist
    Unchanged,
    /// The dragged item no longer exists; the drop degrades to a cancel
    Vanished,
}

/// A finished move as handed to the persistence bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommittedMove {
    Task {
        task_id: TaskId,
        from: ListId,
        from_index: usize,
        to: ListId,
        to_index: usize,
    },
    List {
        list_id: ListId,
        from_index: usize,
        to_index: usize,
    },
}

/// The placement an item was put back to by `cancel`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restored {
    Task {
        task_id: TaskId,
        list: ListId,
        index: usize,
    },
    List {
        list_id: ListId,
        index: usize,
    },
    /// The item (or its origin) no longer exists; nothing to restore
    Gone,
}

/// Admits at most one pointer sample per rendering frame
#[derive(Debug)]
struct FrameGate {
    interval: Duration,
    last: Option<Instant>,
}

impl FrameGate {
    fn new(interval: Duration) -> Self {
        FrameGate {
            interval,
            last: None,
        }
    }

    /// True if a sample at `now` may be applied. The first sample of a
    /// gesture always passes.
    fn admit(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last
            && now.duration_since(last) < self.interval
        {
            return false;
        }
        self.last = Some(now);
        true
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

/// Finite-state machine owning at most one drag gesture at a time.
///
/// Observable states are IDLE (no session) and DRAGGING; the committed and
/// cancelled terminal states are the return values of [`drop_session`] and
/// [`cancel`], both of which unconditionally return the machine to IDLE.
///
/// [`drop_session`]: DragController::drop_session
/// [`cancel`]: DragController::cancel
#[derive(Debug)]
pub struct DragController {
    session: Option<DragSession>,
    gate: FrameGate,
}

impl DragController {
    pub fn new(config: &EngineConfig) -> Self {
        DragController {
            session: None,
            gate: FrameGate::new(Duration::from_millis(config.frame_interval_ms)),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    // -----------------------------------------------------------------------
    // 1 — Start
    // -----------------------------------------------------------------------

    /// Begin dragging a task card. Valid only from IDLE; the task's current
    /// placement becomes the origin for cancel-restore.
    pub fn start_task(&mut self, board: &Board, task_id: &TaskId) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyDragging);
        }
        let (list, index) = board
            .locate_task(task_id)
            .ok_or_else(|| ModelError::UnknownTask(task_id.clone()))?;
        tracing::debug!(task = %task_id, list = %list, index, "task drag started");
        self.session = Some(DragSession::Task {
            task_id: task_id.clone(),
            origin_list: list.clone(),
            origin_index: index,
            current_list: list,
            current_index: index,
        });
        self.gate.reset();
        Ok(())
    }

    /// Begin dragging a list column. Valid only from IDLE, and only when the
    /// gesture originated on the list's header — a grab anywhere else on the
    /// column belongs to the cards it covers.
    pub fn start_list(
        &mut self,
        board: &Board,
        list_id: &ListId,
        grip: Grip,
    ) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyDragging);
        }
        if grip != Grip::Header {
            return Err(SessionError::NotOnHeader);
        }
        let index = board
            .list_index(list_id)
            .ok_or_else(|| ModelError::UnknownList(list_id.clone()))?;
        tracing::debug!(list = %list_id, index, "list drag started");
        self.session = Some(DragSession::List {
            list_id: list_id.clone(),
            origin_index: index,
            current_index: index,
        });
        self.gate.reset();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // 2 — Live updates
    // -----------------------------------------------------------------------

    /// Apply a pointer sample against the current layout.
    ///
    /// Samples are coalesced to frame granularity; an admitted sample
    /// resolves an insertion point and, when it differs from the session's
    /// current placement, performs the live, non-persisted model move.
    /// Never touches persisted state.
    pub fn update(
        &mut self,
        board: &mut Board,
        layout: &BoardLayout,
        pointer: Point,
        now: Instant,
    ) -> Result<LiveUpdate, SessionError> {
        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::NotDragging);
        };
        if !self.gate.admit(now) {
            return Ok(LiveUpdate::Deferred);
        }

        match session {
            DragSession::Task {
                task_id,
                current_list,
                current_index,
                ..
            } => {
                let Some(column) = layout.column_at(pointer) else {
                    // Pointer over a gutter or off the board: hold placement.
                    return Ok(LiveUpdate::Unchanged);
                };
                let target = column.card_insertion(pointer, task_id);
                if &column.id == current_list && target == *current_index {
                    return Ok(LiveUpdate::Unchanged);
                }
                let from = current_list.clone();
                match board.move_task(task_id, &from, &column.id, target) {
                    Ok(MoveOutcome::Moved { index }) => {
                        *current_list = column.id.clone();
                        *current_index = index;
                        Ok(LiveUpdate::Task {
                            list: column.id.clone(),
                            index,
                        })
                    }
                    Ok(MoveOutcome::Noop) => Ok(LiveUpdate::Unchanged),
                    Err(err) => {
                        // Layout and model disagree (the item vanished
                        // mid-drag); drop_session will resolve the session.
                        tracing::debug!(error = %err, "live task move skipped");
                        Ok(LiveUpdate::Unchanged)
                    }
                }
            }
            DragSession::List {
                list_id,
                current_index,
                ..
            } => {
                let target = layout.column_insertion(pointer, list_id);
                if target == *current_index {
                    return Ok(LiveUpdate::Unchanged);
                }
                match board.move_list(list_id, target) {
                    Ok(MoveOutcome::Moved { index }) => {
                        *current_index = index;
                        Ok(LiveUpdate::List { index })
                    }
                    Ok(MoveOutcome::Noop) => Ok(LiveUpdate::Unchanged),
                    Err(err) => {
                        tracing::debug!(error = %err, "live list move skipped");
                        Ok(LiveUpdate::Unchanged)
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // 3 — Drop and cancel
    // -----------------------------------------------------------------------

    /// End the drag as a successful drop. The model already reflects the
    /// final placement from live updates; this resolves the session into a
    /// net move for the bridge and returns the machine to IDLE.
    pub fn drop_session(&mut self, board: &Board) -> Result<DropOutcome, SessionError> {
        let session = self.session.take().ok_or(SessionError::NotDragging)?;
        match session {
            DragSession::Task {
                task_id,
                origin_list,
                origin_index,
                current_list,
                current_index,
            } => {
                if board.locate_task(&task_id).is_none() {
                    tracing::warn!(task = %task_id, "dragged task vanished before drop");
                    return Ok(DropOutcome::Vanished);
                }
                if origin_list == current_list && origin_index == current_index {
                    return Ok(DropOutcome::Unchanged);
                }
                Ok(DropOutcome::Moved(CommittedMove::Task {
                    task_id,
                    from: origin_list,
                    from_index: origin_index,
                    to: current_list,
                    to_index: current_index,
                }))
            }
            DragSession::List {
                list_id,
                origin_index,
                current_index,
            } => {
                if board.list_index(&list_id).is_none() {
                    tracing::warn!(list = %list_id, "dragged list vanished before drop");
                    return Ok(DropOutcome::Vanished);
                }
                if origin_index == current_index {
                    return Ok(DropOutcome::Unchanged);
                }
                Ok(DropOutcome::Moved(CommittedMove::List {
                    list_id,
                    from_index: origin_index,
                    to_index: current_index,
                }))
            }
        }
    }

    /// Abort the drag, putting the item back at its origin placement.
    /// No persistence call results — committed state never changed.
    pub fn cancel(&mut self, board: &mut Board) -> Result<Restored, SessionError> {
        let session = self.session.take().ok_or(SessionError::NotDragging)?;
        match session {
            DragSession::Task {
                task_id,
                origin_list,
                origin_index,
                current_list,
                current_index,
            } => {
                if board.locate_task(&task_id).is_none() {
                    tracing::warn!(task = %task_id, "dragged task vanished before cancel");
                    return Ok(Restored::Gone);
                }
                if current_list == origin_list && current_index == origin_index {
                    return Ok(Restored::Task {
                        task_id,
                        list: origin_list,
                        index: origin_index,
                    });
                }
                match board.move_task(&task_id, &current_list, &origin_list, origin_index) {
                    Ok(MoveOutcome::Moved { index }) => Ok(Restored::Task {
                        task_id,
                        list: origin_list,
                        index,
                    }),
                    Ok(MoveOutcome::Noop) => Ok(Restored::Task {
                        task_id,
                        list: origin_list,
                        index: origin_index,
                    }),
                    Err(err) => {
                        tracing::warn!(task = %task_id, error = %err, "cancel found nothing to restore");
                        Ok(Restored::Gone)
                    }
                }
            }
            DragSession::List {
                list_id,
                origin_index,
                current_index,
            } => {
                if board.list_index(&list_id).is_none() {
                    tracing::warn!(list = %list_id, "dragged list vanished before cancel");
                    return Ok(Restored::Gone);
                }
                if current_index == origin_index {
                    return Ok(Restored::List {
                        list_id,
                        index: origin_index,
                    });
                }
                match board.move_list(&list_id, origin_index) {
                    Ok(_) => Ok(Restored::List {
                        list_id,
                        index: origin_index,
                    }),
                    Err(err) => {
                        tracing::warn!(list = %list_id, error = %err, "cancel found nothing to restore");
                        Ok(Restored::Gone)
                    }
                }
            }
        }
    }
}
