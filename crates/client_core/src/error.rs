use shared::domain::ItemId;
use thiserror::Error;

/// Failure of a single call against the remote item collection. The variant
/// names the operation; the payload is the underlying cause as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("failed to fetch items: {0}")]
    LoadFailed(String),
    #[error("failed to create item: {0}")]
    CreateFailed(String),
    #[error("failed to update item {id}: {reason}")]
    UpdateFailed { id: ItemId, reason: String },
    #[error("failed to delete item {id}: {reason}")]
    DeleteFailed { id: ItemId, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no item is selected for editing")]
    NotEditing,
    #[error("item {0} is not in the collection")]
    UnknownItem(ItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("another remote operation is still in flight; retry when it finishes")]
    Busy,
    #[error("store command queue is full; please retry")]
    QueueFull,
    #[error("store worker has stopped")]
    Disconnected,
}
