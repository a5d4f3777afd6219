pub mod memory;

pub use memory::{MemoryStore, StoreCall};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{ListId, TaskId};

/// Error from a persistence backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("backend failure: {0}")]
    Backend(String),
}

/// The board owner's profile as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            id: String::new(),
            theme: default_theme(),
        }
    }
}

fn default_theme() -> String {
    "dark".to_string()
}

/// A list row in wire shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRecord {
    pub id: ListId,
    pub title: String,
    pub position: usize,
}

/// A task row in wire shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub list_id: ListId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    pub position: usize,
}

/// Everything needed to rehydrate one user's board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub profile: Profile,
    pub lists: Vec<ListRecord>,
    pub tasks: Vec<TaskRecord>,
}

/// Partial update of a task; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// Set when the task is re-parented (archive / unarchive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<ListId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

/// One entry of a batched task set-positions call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPosition {
    pub id: TaskId,
    pub position: usize,
}

/// One entry of a batched list set-positions call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPosition {
    pub id: ListId,
    pub position: usize,
}

/// Asynchronous persistence backend for a board.
///
/// Implementations validate ownership and either commit a call atomically or
/// fail it; the engine never issues partial writes within one call.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Fetch the full board for a user.
    async fn fetch_board(&self, user_id: &str) -> Result<BoardSnapshot, StoreError>;

    async fn create_task(
        &self,
        list_id: &ListId,
        title: &str,
        position: usize,
    ) -> Result<TaskRecord, StoreError>;

    async fn update_task(&self, task_id: &TaskId, patch: TaskPatch)
    -> Result<TaskRecord, StoreError>;

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), StoreError>;

    /// Batched set-positions for one list's members. Every entry is
    /// re-parented to `list_id` as well, which converges tasks whose
    /// stored back-reference went stale.
    async fn reorder_tasks(
        &self,
        list_id: &ListId,
        positions: &[TaskPosition],
    ) -> Result<(), StoreError>;

    async fn create_list(&self, title: &str, position: usize) -> Result<ListRecord, StoreError>;

    async fn rename_list(&self, list_id: &ListId, title: &str) -> Result<ListRecord, StoreError>;

    /// Delete a list along with every task it still contains.
    async fn delete_list(&self, list_id: &ListId) -> Result<(), StoreError>;

    async fn reorder_lists(&self, positions: &[ListPosition]) -> Result<(), StoreError>;

    /// Persist the owner's theme preference.
    async fn update_theme(&self, theme: &str) -> Result<(), StoreError>;
}
