use serde::{Deserialize, Serialize};

use super::ids::{ListId, TaskId};
use crate::store::TaskRecord;

/// A single kanban card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Back-reference to the owning list; membership itself lives on `List`
    pub list_id: ListId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// Dense zero-based ordering key within the owning list
    pub position: usize,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Task {
            id: record.id,
            list_id: record.list_id,
            title: record.title,
            description: record.description,
            completed: record.completed,
            position: record.position,
        }
    }
}
