//! Single-writer task that owns the [`ItemStore`] and serializes commands
//! coming from the view layer.
//!
//! Commands that hit the remote take a busy flag for their whole round trip;
//! a second remote-bound command dispatched meanwhile is rejected instead of
//! racing on the collection. View-only commands queue behind it.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::domain::{ItemDraft, ItemId, SortOrder};
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        oneshot, watch,
    },
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    error::{DispatchError, StoreError},
    store::{ItemStore, StoreSnapshot},
};

const COMMAND_QUEUE_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    Initialize,
    Create(ItemDraft),
    Update(ItemDraft),
    Delete(ItemId),
    ChangeSort(SortOrder),
    ChangePage(usize),
    BeginEdit(ItemId),
    CancelEdit,
    DismissNotice,
}

impl StoreCommand {
    pub fn name(&self) -> &'static str {
        match self {
            StoreCommand::Initialize => "initialize",
            StoreCommand::Create(_) => "create",
            StoreCommand::Update(_) => "update",
            StoreCommand::Delete(_) => "delete",
            StoreCommand::ChangeSort(_) => "change_sort",
            StoreCommand::ChangePage(_) => "change_page",
            StoreCommand::BeginEdit(_) => "begin_edit",
            StoreCommand::CancelEdit => "cancel_edit",
            StoreCommand::DismissNotice => "dismiss_notice",
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            StoreCommand::Initialize
                | StoreCommand::Create(_)
                | StoreCommand::Update(_)
                | StoreCommand::Delete(_)
        )
    }
}

struct Envelope {
    command: StoreCommand,
    reply: Option<oneshot::Sender<StoreSnapshot>>,
}

#[derive(Clone)]
pub struct StoreHandle {
    commands: mpsc::Sender<Envelope>,
    busy: Arc<AtomicBool>,
    snapshots: watch::Receiver<StoreSnapshot>,
}

/// Moves `store` onto its own task. Must be called inside a tokio runtime.
pub fn spawn_store_worker(store: ItemStore) -> (StoreHandle, JoinHandle<()>) {
    let (commands, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let busy = Arc::new(AtomicBool::new(false));
    let (snapshot_tx, snapshots) = watch::channel(store.snapshot(0, false));

    let worker = tokio::spawn(run_worker(store, rx, busy.clone(), snapshot_tx));
    (
        StoreHandle {
            commands,
            busy,
            snapshots,
        },
        worker,
    )
}

impl StoreHandle {
    /// Queues `command` without waiting for it.
    pub fn dispatch(&self, command: StoreCommand) -> Result<(), DispatchError> {
        self.enqueue(command, None)
    }

    /// Queues `command` and waits for the snapshot published right after it
    /// was applied.
    pub async fn execute(&self, command: StoreCommand) -> Result<StoreSnapshot, DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.enqueue(command, Some(reply_tx))?;
        reply_rx.await.map_err(|_| DispatchError::Disconnected)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshots.clone()
    }

    fn enqueue(
        &self,
        command: StoreCommand,
        reply: Option<oneshot::Sender<StoreSnapshot>>,
    ) -> Result<(), DispatchError> {
        let remote = command.is_remote();
        if remote
            && self
                .busy
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            debug!(command = command.name(), "rejected command while busy");
            return Err(DispatchError::Busy);
        }

        let name = command.name();
        match self.commands.try_send(Envelope { command, reply }) {
            Ok(()) => {
                debug!(command = name, "queued store command");
                Ok(())
            }
            Err(err) => {
                if remote {
                    self.busy.store(false, Ordering::Release);
                }
                match err {
                    TrySendError::Full(_) => Err(DispatchError::QueueFull),
                    TrySendError::Closed(_) => Err(DispatchError::Disconnected),
                }
            }
        }
    }
}

async fn run_worker(
    mut store: ItemStore,
    mut commands: mpsc::Receiver<Envelope>,
    busy: Arc<AtomicBool>,
    snapshots: watch::Sender<StoreSnapshot>,
) {
    let mut revision = 0u64;
    while let Some(Envelope { command, reply }) = commands.recv().await {
        let name = command.name();
        let remote = command.is_remote();
        let result = apply_command(&mut store, command).await;
        if remote {
            busy.store(false, Ordering::Release);
        }

        revision += 1;
        let mut snapshot = store.snapshot(revision, busy.load(Ordering::Acquire));
        if let Err(error) = result {
            warn!(command = name, %error, "store command rejected");
            snapshot.command_error = Some(error.to_string());
        }

        snapshots.send_replace(snapshot.clone());
        if let Some(reply) = reply {
            let _ = reply.send(snapshot);
        }
    }
    debug!("store worker stopped");
}

async fn apply_command(store: &mut ItemStore, command: StoreCommand) -> Result<(), StoreError> {
    match command {
        StoreCommand::Initialize => {
            store.initialize().await;
        }
        StoreCommand::Create(draft) => {
            store.create(draft).await;
        }
        StoreCommand::Update(draft) => {
            store.update(draft).await?;
        }
        StoreCommand::Delete(id) => {
            store.delete(id).await;
        }
        StoreCommand::ChangeSort(order) => store.change_sort_order(order),
        StoreCommand::ChangePage(page) => store.change_page(page),
        StoreCommand::BeginEdit(id) => {
            store.begin_edit(id)?;
        }
        StoreCommand::CancelEdit => store.cancel_edit(),
        StoreCommand::DismissNotice => store.dismiss_notice(),
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/worker_tests.rs"]
mod tests;
