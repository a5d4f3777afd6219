use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};

use crate::drag::CommittedMove;
use crate::model::{Board, List, ListId};
use crate::notify::Notifier;
use crate::store::{BoardStore, ListPosition, StoreError, TaskPosition};

/// One serialized write lane: the board's list order, or one list's task order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Lane {
    Board,
    List(ListId),
}

enum LanePayload {
    Tasks {
        list: ListId,
        positions: Vec<TaskPosition>,
    },
    Lists {
        positions: Vec<ListPosition>,
    },
}

struct LaneJob {
    payload: LanePayload,
    ack: oneshot::Sender<Result<(), StoreError>>,
}

/// Applies committed moves to the store.
///
/// Each container gets its own write lane — a spawned worker draining an
/// in-order queue — so successive reorders of the same container reach the
/// store in issuance order, while distinct containers write concurrently.
/// `commit` returns once every affected container's write has settled; by
/// then the gesture state machine has long been IDLE again.
pub struct PersistBridge<S> {
    store: Arc<S>,
    notifier: Notifier,
    lanes: Mutex<HashMap<Lane, mpsc::UnboundedSender<LaneJob>>>,
}

impl<S: BoardStore + 'static> PersistBridge<S> {
    pub fn new(store: Arc<S>, notifier: Notifier) -> Self {
        PersistBridge {
            store,
            notifier,
            lanes: Mutex::new(HashMap::new()),
        }
    }

    /// Persist a committed move. The model is authoritative: a failed write
    /// is logged and surfaced as a notice, never rolled back — the next full
    /// board fetch reconciles the store.
    pub async fn commit(&self, board: &Board, mv: &CommittedMove) {
        let mut acks = Vec::new();
        let failure_message = match mv {
            CommittedMove::Task { from, to, .. } => {
                // Destination always; origin only when the move crossed lists.
                let mut affected = vec![to];
                if from != to {
                    affected.push(from);
                }
                for list_id in affected {
                    let Some(list) = board.list(list_id) else {
                        tracing::debug!(list = %list_id, "skipping reorder of a list no longer on the board");
                        continue;
                    };
                    let job = LanePayload::Tasks {
                        list: list_id.clone(),
                        positions: task_positions(list),
                    };
                    acks.push(self.enqueue(Lane::List(list_id.clone()), job).await);
                }
                "Failed to save task order"
            }
            CommittedMove::List { .. } => {
                let positions = board
                    .lists
                    .iter()
                    .map(|l| ListPosition {
                        id: l.id.clone(),
                        position: l.position,
                    })
                    .collect();
                let job = LanePayload::Lists { positions };
                acks.push(self.enqueue(Lane::Board, job).await);
                "Failed to save list order"
            }
        };

        let mut failed = false;
        for ack in acks {
            match ack.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "reorder persistence failed; board left as shown");
                    failed = true;
                }
                Err(_) => {
                    tracing::warn!("reorder write lane dropped before acknowledging");
                    failed = true;
                }
            }
        }
        if failed {
            self.notifier.error(failure_message);
        }
    }

    async fn enqueue(
        &self,
        lane: Lane,
        payload: LanePayload,
    ) -> oneshot::Receiver<Result<(), StoreError>> {
        let (ack, rx) = oneshot::channel();
        let tx = self.lane_sender(lane).await;
        // A closed lane surfaces as a recv error on the ack side.
        let _ = tx.send(LaneJob { payload, ack });
        rx
    }

    async fn lane_sender(&self, lane: Lane) -> mpsc::UnboundedSender<LaneJob> {
        let mut lanes = self.lanes.lock().await;
        if let Some(tx) = lanes.get(&lane)
            && !tx.is_closed()
        {
            return tx.clone();
        }
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_lane(self.store.clone(), rx));
        lanes.insert(lane, tx.clone());
        tx
    }
}

fn task_positions(list: &List) -> Vec<TaskPosition> {
    list.tasks
        .iter()
        .map(|t| TaskPosition {
            id: t.id.clone(),
            position: t.position,
        })
        .collect()
}

/// Drains one lane's queue, applying each write and acknowledging its result
async fn run_lane<S: BoardStore + 'static>(
    store: Arc<S>,
    mut rx: mpsc::UnboundedReceiver<LaneJob>,
) {
    while let Some(job) = rx.recv().await {
        let result = match job.payload {
            LanePayload::Tasks { list, positions } => {
                tracing::debug!(list = %list, count = positions.len(), "writing task order");
                store.reorder_tasks(&list, &positions).await
            }
            LanePayload::Lists { positions } => {
                tracing::debug!(count = positions.len(), "writing list order");
                store.reorder_lists(&positions).await
            }
        };
        let _ = job.ack.send(result);
    }
}
