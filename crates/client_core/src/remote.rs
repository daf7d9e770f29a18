use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Item, ItemDraft, ItemId, ItemOrigin},
    protocol::{PostPayload, RemotePost},
};
use tracing::{debug, warn};

use crate::error::RemoteError;

/// The remote item collection. One call per operation, no retries.
#[async_trait]
pub trait ItemService: Send + Sync {
    async fn list(&self) -> Result<Vec<Item>, RemoteError>;
    async fn create(&self, draft: &ItemDraft) -> Result<RemotePost, RemoteError>;
    async fn update(&self, id: ItemId, draft: &ItemDraft) -> Result<RemotePost, RemoteError>;
    async fn delete(&self, id: ItemId) -> Result<(), RemoteError>;
}

/// Used when no remote is configured. Every call fails, so the store runs on
/// local fallbacks alone.
pub struct UnavailableItemService;

#[async_trait]
impl ItemService for UnavailableItemService {
    async fn list(&self) -> Result<Vec<Item>, RemoteError> {
        Err(RemoteError::LoadFailed("remote item service is unavailable".into()))
    }

    async fn create(&self, _draft: &ItemDraft) -> Result<RemotePost, RemoteError> {
        Err(RemoteError::CreateFailed(
            "remote item service is unavailable".into(),
        ))
    }

    async fn update(&self, id: ItemId, _draft: &ItemDraft) -> Result<RemotePost, RemoteError> {
        Err(RemoteError::UpdateFailed {
            id,
            reason: "remote item service is unavailable".into(),
        })
    }

    async fn delete(&self, id: ItemId) -> Result<(), RemoteError> {
        Err(RemoteError::DeleteFailed {
            id,
            reason: "remote item service is unavailable".into(),
        })
    }
}

/// REST adapter for a `/posts` collection.
pub struct HttpItemService {
    http: Client,
    base_url: String,
}

impl HttpItemService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn posts_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }

    fn post_url(&self, id: ItemId) -> String {
        format!("{}/posts/{}", self.base_url, id.0)
    }

    async fn fetch_posts(&self) -> reqwest::Result<Vec<RemotePost>> {
        self.http
            .get(self.posts_url())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn post_new(&self, draft: &ItemDraft) -> reqwest::Result<RemotePost> {
        self.http
            .post(self.posts_url())
            .json(&PostPayload::create(draft))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn put_existing(&self, id: ItemId, draft: &ItemDraft) -> reqwest::Result<RemotePost> {
        self.http
            .put(self.post_url(id))
            .json(&PostPayload::update(id, draft))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    async fn delete_existing(&self, id: ItemId) -> reqwest::Result<()> {
        self.http
            .delete(self.post_url(id))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl ItemService for HttpItemService {
    async fn list(&self) -> Result<Vec<Item>, RemoteError> {
        let posts = self
            .fetch_posts()
            .await
            .map_err(|e| RemoteError::LoadFailed(e.to_string()))?;
        debug!(count = posts.len(), "fetched remote posts");
        Ok(items_from_posts(posts))
    }

    async fn create(&self, draft: &ItemDraft) -> Result<RemotePost, RemoteError> {
        self.post_new(draft)
            .await
            .map_err(|e| RemoteError::CreateFailed(e.to_string()))
    }

    async fn update(&self, id: ItemId, draft: &ItemDraft) -> Result<RemotePost, RemoteError> {
        self.put_existing(id, draft)
            .await
            .map_err(|e| RemoteError::UpdateFailed {
                id,
                reason: e.to_string(),
            })
    }

    async fn delete(&self, id: ItemId) -> Result<(), RemoteError> {
        self.delete_existing(id)
            .await
            .map_err(|e| RemoteError::DeleteFailed {
                id,
                reason: e.to_string(),
            })
    }
}

/// Maps listed posts to items. Posts without a usable id are skipped, and a
/// repeated id keeps its first occurrence.
pub fn items_from_posts(posts: Vec<RemotePost>) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(posts.len());
    for post in posts {
        let Some(id) = post.usable_id() else {
            warn!(title = ?post.title, "skipping remote post without a usable id");
            continue;
        };
        if !seen.insert(id) {
            warn!(item_id = id.0, "skipping duplicate remote post id");
            continue;
        }
        items.push(Item {
            id,
            title: post.title.unwrap_or_default(),
            description: post.body.unwrap_or_default(),
            origin: ItemOrigin::Remote,
        });
    }
    items
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
