//! Results of store operations as the view layer reports them.
//!
//! There are two tiers. Remote failures the store recovered from locally
//! (create, delete) are reported with success styling; a failed load or a
//! rejected edit is an error the user has to act on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Loaded,
    LoadFailed,
    Created,
    CreatedLocally,
    Updated,
    UpdateFailedNotFound,
    Deleted,
    DeletedLocally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

impl OutcomeKind {
    pub fn severity(self) -> Severity {
        match self {
            OutcomeKind::LoadFailed | OutcomeKind::UpdateFailedNotFound => Severity::Error,
            _ => Severity::Success,
        }
    }

    pub fn is_error(self) -> bool {
        self.severity() == Severity::Error
    }

    /// Failed remotely but applied locally anyway.
    pub fn is_soft_recovered(self) -> bool {
        matches!(self, OutcomeKind::CreatedLocally | OutcomeKind::DeletedLocally)
    }

    pub fn default_message(self) -> &'static str {
        match self {
            OutcomeKind::Loaded => "Items loaded",
            OutcomeKind::LoadFailed => "Failed to fetch items",
            OutcomeKind::Created => "Item created successfully!",
            OutcomeKind::CreatedLocally => "Item created locally!",
            OutcomeKind::Updated => "Item updated successfully!",
            OutcomeKind::UpdateFailedNotFound => {
                "Failed to save item, the item does not exist in the remote store"
            }
            OutcomeKind::Deleted => "Item deleted successfully!",
            OutcomeKind::DeletedLocally => "Item deleted locally!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub message: String,
}

impl Outcome {
    pub fn new(kind: OutcomeKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }
}
