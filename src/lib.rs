//! Drag-and-reorder engine for kanban boards.
//!
//! The crate owns everything between a pointer gesture and a persisted
//! ordering: an in-memory board model with dense positions, a drag session
//! state machine fed by pointer samples, a geometry resolver that turns
//! coordinates into insertion indices, and a bridge that batches the
//! resulting reorders out to a [`store::BoardStore`] backend.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use corkboard::store::MemoryStore;
//! use corkboard::{DragController, EngineConfig, Notifier, PersistBridge};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::default();
//! let (notifier, _notices) = Notifier::channel();
//! let store = Arc::new(MemoryStore::new());
//!
//! let mut board = corkboard::ops::load_board(store.as_ref(), &notifier, &config, "user-1").await?;
//! let mut drag = DragController::new(&config);
//! let bridge = PersistBridge::new(store, notifier.clone());
//! // Wire pointer events into `drag`, and hand each committed move to `bridge`.
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod config;
pub mod drag;
pub mod model;
pub mod notify;
pub mod ops;
pub mod store;

pub use bridge::PersistBridge;
pub use config::EngineConfig;
pub use drag::{
    Axis, BoardLayout, CardBox, ColumnLayout, CommittedMove, DragController, DragKind, DragSession,
    DropOutcome, Grip, LiveUpdate, Point, Rect, Restored, SessionError, insertion_index,
};
pub use model::{Board, List, ListId, ModelError, MoveOutcome, Task, TaskId};
pub use notify::{Notice, NoticeKind, Notifier};
pub use ops::{OpError, TaskEdit, THEMES};
pub use store::{BoardStore, StoreError};
