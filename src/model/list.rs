use serde::{Deserialize, Serialize};

use super::ids::{ListId, TaskId};
use super::task::Task;
use crate::store::ListRecord;

/// A named, ordered column of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub title: String,
    /// Dense zero-based ordering key within the board
    pub position: usize,
    /// Tasks in display order
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl List {
    /// Index of a task within this list
    pub fn index_of(&self, task: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == task)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    /// Rewrite task positions and back-references after a structural change.
    /// Keeps every contained task's `position` dense and `list_id` pointing here.
    pub(crate) fn renumber(&mut self) {
        for (i, task) in self.tasks.iter_mut().enumerate() {
            task.position = i;
            task.list_id = self.id.clone();
        }
    }
}

impl From<ListRecord> for List {
    fn from(record: ListRecord) -> Self {
        List {
            id: record.id,
            title: record.title,
            position: record.position,
            tasks: Vec::new(),
        }
    }
}
