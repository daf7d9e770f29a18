use serde::{Deserialize, Serialize};

use crate::domain::{Item, ItemDraft, ItemId, ItemOrigin};

/// A record as the remote `/posts` collection stores it. Every field is
/// optional because mock backends echo back whatever they were sent, and the
/// create endpoint may omit the id entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RemotePost {
    /// The id handed out by the remote, if it is one we can use. Zero and
    /// negative ids count as absent.
    pub fn usable_id(&self) -> Option<ItemId> {
        self.id.filter(|id| *id > 0).map(ItemId)
    }

    /// Builds an item from the response, taking fields the response left out
    /// from `fallback`.
    pub fn merge_into_item(self, id: ItemId, origin: ItemOrigin, fallback: &ItemDraft) -> Item {
        Item {
            id,
            title: self
                .title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| fallback.title().to_string()),
            description: self
                .body
                .filter(|body| !body.trim().is_empty())
                .unwrap_or_else(|| fallback.description().to_string()),
            origin,
        }
    }
}

/// Request body for create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub body: String,
}

impl PostPayload {
    pub fn create(draft: &ItemDraft) -> Self {
        Self {
            id: None,
            title: draft.title().to_string(),
            body: draft.description().to_string(),
        }
    }

    pub fn update(id: ItemId, draft: &ItemDraft) -> Self {
        Self {
            id: Some(id.0),
            ..Self::create(draft)
        }
    }
}
