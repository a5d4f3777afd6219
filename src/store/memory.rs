use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    BoardSnapshot, BoardStore, ListPosition, ListRecord, Profile, StoreError, TaskPatch,
    TaskPosition, TaskRecord,
};
use crate::model::{ListId, TaskId};

/// One call a `MemoryStore` received, for test assertions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FetchBoard {
        user_id: String,
    },
    CreateTask {
        list_id: ListId,
        title: String,
        position: usize,
    },
    UpdateTask {
        task_id: TaskId,
        patch: TaskPatch,
    },
    DeleteTask {
        task_id: TaskId,
    },
    ReorderTasks {
        list_id: ListId,
        positions: Vec<TaskPosition>,
    },
    CreateList {
        title: String,
        position: usize,
    },
    RenameList {
        list_id: ListId,
        title: String,
    },
    DeleteList {
        list_id: ListId,
    },
    ReorderLists {
        positions: Vec<ListPosition>,
    },
    UpdateTheme {
        theme: String,
    },
}

#[derive(Debug, Default)]
struct Inner {
    profile: Profile,
    lists: Vec<ListRecord>,
    tasks: Vec<TaskRecord>,
    calls: Vec<StoreCall>,
    fail_next: Option<StoreError>,
    next_id: u64,
}

impl Inner {
    fn take_failure(&mut self) -> Result<(), StoreError> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn issue_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn task_mut(&mut self, id: &TaskId) -> Result<&mut TaskRecord, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("task {id}")))
    }

    fn list_mut(&mut self, id: &ListId) -> Result<&mut ListRecord, StoreError> {
        self.lists
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("list {id}")))
    }
}

/// In-memory `BoardStore`: the reference backend for tests and demos.
///
/// Records every call in order and can be armed to fail the next one,
/// which is how the rollback and no-rollback paths get exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store pre-seeded with records, positions taken as given.
    pub fn seeded(profile: Profile, lists: Vec<ListRecord>, tasks: Vec<TaskRecord>) -> Self {
        MemoryStore {
            inner: Mutex::new(Inner {
                profile,
                lists,
                tasks,
                ..Inner::default()
            }),
        }
    }

    /// Arm the store to fail its next call with `err`.
    pub async fn fail_next(&self, err: StoreError) {
        self.inner.lock().await.fail_next = Some(err);
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().await.calls.clone()
    }

    /// Current task rows, for asserting on persisted state.
    pub async fn task_records(&self) -> Vec<TaskRecord> {
        self.inner.lock().await.tasks.clone()
    }

    /// Current list rows.
    pub async fn list_records(&self) -> Vec<ListRecord> {
        self.inner.lock().await.lists.clone()
    }

    /// The stored profile.
    pub async fn profile(&self) -> Profile {
        self.inner.lock().await.profile.clone()
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn fetch_board(&self, user_id: &str) -> Result<BoardSnapshot, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::FetchBoard {
            user_id: user_id.to_string(),
        });
        inner.take_failure()?;
        Ok(BoardSnapshot {
            profile: inner.profile.clone(),
            lists: inner.lists.clone(),
            tasks: inner.tasks.clone(),
        })
    }

    async fn create_task(
        &self,
        list_id: &ListId,
        title: &str,
        position: usize,
    ) -> Result<TaskRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::CreateTask {
            list_id: list_id.clone(),
            title: title.to_string(),
            position,
        });
        inner.take_failure()?;
        inner.list_mut(list_id)?;
        let id = TaskId::new(inner.issue_id("task"));
        let record = TaskRecord {
            id,
            list_id: list_id.clone(),
            title: title.to_string(),
            description: String::new(),
            completed: false,
            position,
        };
        inner.tasks.push(record.clone());
        Ok(record)
    }

    async fn update_task(
        &self,
        task_id: &TaskId,
        patch: TaskPatch,
    ) -> Result<TaskRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::UpdateTask {
            task_id: task_id.clone(),
            patch: patch.clone(),
        });
        inner.take_failure()?;
        let task = inner.task_mut(task_id)?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        if let Some(list_id) = patch.list_id {
            task.list_id = list_id;
        }
        if let Some(position) = patch.position {
            task.position = position;
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::DeleteTask {
            task_id: task_id.clone(),
        });
        inner.take_failure()?;
        // Row-filtered delete: a missing row is not an error.
        inner.tasks.retain(|t| &t.id != task_id);
        Ok(())
    }

    async fn reorder_tasks(
        &self,
        list_id: &ListId,
        positions: &[TaskPosition],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::ReorderTasks {
            list_id: list_id.clone(),
            positions: positions.to_vec(),
        });
        inner.take_failure()?;
        // Row-filtered updates: entries whose row is gone are skipped.
        for entry in positions {
            if let Ok(task) = inner.task_mut(&entry.id) {
                task.position = entry.position;
                task.list_id = list_id.clone();
            }
        }
        Ok(())
    }

    async fn create_list(&self, title: &str, position: usize) -> Result<ListRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::CreateList {
            title: title.to_string(),
            position,
        });
        inner.take_failure()?;
        let id = ListId::new(inner.issue_id("list"));
        let record = ListRecord {
            id,
            title: title.to_string(),
            position,
        };
        inner.lists.push(record.clone());
        Ok(record)
    }

    async fn rename_list(&self, list_id: &ListId, title: &str) -> Result<ListRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::RenameList {
            list_id: list_id.clone(),
            title: title.to_string(),
        });
        inner.take_failure()?;
        let list = inner.list_mut(list_id)?;
        list.title = title.to_string();
        Ok(list.clone())
    }

    async fn delete_list(&self, list_id: &ListId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::DeleteList {
            list_id: list_id.clone(),
        });
        inner.take_failure()?;
        // Contained tasks go first, then the list itself.
        inner.tasks.retain(|t| &t.list_id != list_id);
        inner.lists.retain(|l| &l.id != list_id);
        Ok(())
    }

    async fn reorder_lists(&self, positions: &[ListPosition]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::ReorderLists {
            positions: positions.to_vec(),
        });
        inner.take_failure()?;
        for entry in positions {
            if let Ok(list) = inner.list_mut(&entry.id) {
                list.position = entry.position;
            }
        }
        Ok(())
    }

    async fn update_theme(&self, theme: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::UpdateTheme {
            theme: theme.to_string(),
        });
        inner.take_failure()?;
        inner.profile.theme = theme.to_string();
        Ok(())
    }
}
