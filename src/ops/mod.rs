pub mod board_ops;
pub mod task_ops;

pub use board_ops::*;
pub use task_ops::*;

use crate::model::ModelError;
use crate::store::StoreError;

/// Error type for board and task operations
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error("{0}")]
    Model(#[from] ModelError),
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
    #[error("no list to restore the task into")]
    NoRestoreTarget,
}
