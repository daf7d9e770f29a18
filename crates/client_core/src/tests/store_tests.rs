use std::collections::HashSet;

use async_trait::async_trait;
use shared::protocol::RemotePost;
use tokio::sync::Mutex;

use super::*;
use crate::error::RemoteError;

/// Remote double: knows the ids it listed, can be told to fail per operation.
#[derive(Default)]
struct ScriptedService {
    listed: Vec<Item>,
    fail_list: bool,
    fail_create: bool,
    fail_delete: bool,
    created_id: Option<i64>,
    update_echo_id: Option<i64>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedService {
    fn with_ids(ids: &[i64]) -> Self {
        Self {
            listed: ids
                .iter()
                .map(|id| {
                    Item::new(
                        ItemId(*id),
                        format!("title {id}"),
                        format!("body {id}"),
                        ItemOrigin::Remote,
                    )
                })
                .collect(),
            ..Self::default()
        }
    }

    async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ItemService for ScriptedService {
    async fn list(&self) -> Result<Vec<Item>, RemoteError> {
        self.calls.lock().await.push("list".into());
        if self.fail_list {
            return Err(RemoteError::LoadFailed("503 Service Unavailable".into()));
        }
        Ok(self.listed.clone())
    }

    async fn create(&self, draft: &ItemDraft) -> Result<RemotePost, RemoteError> {
        self.calls.lock().await.push("create".into());
        if self.fail_create {
            return Err(RemoteError::CreateFailed("connection refused".into()));
        }
        Ok(RemotePost {
            id: self.created_id,
            title: Some(draft.title().to_string()),
            body: Some(draft.description().to_string()),
        })
    }

    async fn update(&self, id: ItemId, draft: &ItemDraft) -> Result<RemotePost, RemoteError> {
        self.calls.lock().await.push(format!("update {}", id.0));
        if !self.listed.iter().any(|item| item.id == id) {
            return Err(RemoteError::UpdateFailed {
                id,
                reason: "500 Internal Server Error".into(),
            });
        }
        Ok(RemotePost {
            id: Some(self.update_echo_id.unwrap_or(id.0)),
            title: Some(format!("{} (saved)", draft.title())),
            body: Some(draft.description().to_string()),
        })
    }

    async fn delete(&self, id: ItemId) -> Result<(), RemoteError> {
        self.calls.lock().await.push(format!("delete {}", id.0));
        if self.fail_delete {
            return Err(RemoteError::DeleteFailed {
                id,
                reason: "503 Service Unavailable".into(),
            });
        }
        Ok(())
    }
}

fn draft(title: &str) -> ItemDraft {
    ItemDraft::new(title, format!("{title} description")).expect("draft")
}

fn ids(items: &[Item]) -> Vec<i64> {
    items.iter().map(|item| item.id.0).collect()
}

async fn loaded_store(
    service: ScriptedService,
    page_size: usize,
) -> (ItemStore, Arc<ScriptedService>) {
    let service = Arc::new(service);
    let mut store = ItemStore::new(service.clone(), page_size);
    let outcome = store.initialize().await;
    assert_eq!(outcome.kind, OutcomeKind::Loaded);
    (store, service)
}

#[tokio::test]
async fn initialize_sorts_ascending_on_first_page() {
    let (store, _service) = loaded_store(ScriptedService::with_ids(&[3, 1, 2]), 6).await;
    assert_eq!(ids(store.items()), vec![1, 2, 3]);
    assert_eq!(store.current_page(), 1);
    assert_eq!(store.sort_order(), SortOrder::Ascending);
    assert!(store.load_error().is_none());
}

#[tokio::test]
async fn failed_initialize_leaves_collection_empty_with_banner() {
    let service = Arc::new(ScriptedService {
        fail_list: true,
        ..ScriptedService::with_ids(&[1, 2])
    });
    let mut store = ItemStore::new(service.clone(), 6);

    let outcome = store.initialize().await;

    assert_eq!(outcome.kind, OutcomeKind::LoadFailed);
    assert!(store.items().is_empty());
    assert_eq!(store.load_error(), Some("Failed to fetch items"));
    let snapshot = store.snapshot(1, false);
    assert_eq!(snapshot.banner(), Some("Failed to fetch items"));
    assert!(snapshot.notice().is_none());
    assert_eq!(service.calls().await, vec!["list"]);
}

#[tokio::test]
async fn create_keeps_remote_assigned_id() {
    let service = ScriptedService {
        created_id: Some(101),
        ..ScriptedService::with_ids(&[1, 2, 3])
    };
    let (mut store, _service) = loaded_store(service, 6).await;

    let outcome = store.create(draft("milk")).await;

    assert_eq!(outcome.kind, OutcomeKind::Created);
    let created = store.item(ItemId(101)).expect("created item");
    assert_eq!(created.title, "milk");
    assert_eq!(created.origin, ItemOrigin::Remote);
    assert_eq!(ids(store.items()), vec![1, 2, 3, 101]);
}

#[tokio::test]
async fn create_replaces_colliding_remote_id_with_local_one() {
    let service = ScriptedService {
        created_id: Some(101),
        ..ScriptedService::with_ids(&[1, 2, 3])
    };
    let (mut store, _service) = loaded_store(service, 6).await;

    store.create(draft("first")).await;
    let outcome = store.create(draft("second")).await;

    assert_eq!(outcome.kind, OutcomeKind::Created);
    assert_eq!(ids(store.items()), vec![1, 2, 3, 101, 102]);
    let second = store.item(ItemId(102)).expect("second");
    assert_eq!(second.title, "second");
    assert!(second.is_local());
}

#[tokio::test]
async fn create_without_remote_id_assigns_next_local_id() {
    let (mut store, _service) = loaded_store(ScriptedService::with_ids(&[4, 9]), 6).await;

    let outcome = store.create(draft("note")).await;

    assert_eq!(outcome.kind, OutcomeKind::Created);
    assert_eq!(ids(store.items()), vec![4, 9, 10]);
    assert!(store.item(ItemId(10)).expect("note").is_local());
}

#[tokio::test]
async fn create_with_failing_remote_is_recovered_locally() {
    let service = ScriptedService {
        fail_create: true,
        ..ScriptedService::with_ids(&[2, 5, 3])
    };
    let (mut store, _service) = loaded_store(service, 6).await;
    let before = store.items().len();

    let outcome = store.create(draft("offline")).await;

    assert_eq!(outcome.kind, OutcomeKind::CreatedLocally);
    assert!(!outcome.is_error());
    assert_eq!(outcome.message, "Item created locally!");
    assert_eq!(store.items().len(), before + 1);
    let item = store.item(ItemId(6)).expect("local item");
    assert_eq!(item.description, "offline description");
    assert!(item.is_local());
}

#[tokio::test]
async fn create_into_empty_collection_starts_at_one() {
    let service = Arc::new(ScriptedService {
        fail_list: true,
        fail_create: true,
        ..ScriptedService::default()
    });
    let mut store = ItemStore::new(service, 6);
    store.initialize().await;

    store.create(draft("first")).await;

    assert_eq!(ids(store.items()), vec![1]);
    // Finishing a create clears the stale load error.
    assert!(store.load_error().is_none());
}

#[tokio::test]
async fn create_resorts_but_keeps_current_page() {
    let ids_in: Vec<i64> = (1..=8).collect();
    let service = ScriptedService {
        fail_create: true,
        ..ScriptedService::with_ids(&ids_in)
    };
    let (mut store, _service) = loaded_store(service, 6).await;
    store.change_sort_order(SortOrder::Descending);
    store.change_page(2);

    store.create(draft("newest")).await;

    assert_eq!(store.current_page(), 2);
    assert_eq!(store.items()[0].id, ItemId(9));
    // The new item is on page 1 and so not visible from here.
    assert!(store.page_items().iter().all(|item| item.id != ItemId(9)));
}

#[tokio::test]
async fn update_applies_server_fields_but_keeps_original_id() {
    let service = ScriptedService {
        update_echo_id: Some(1),
        ..ScriptedService::with_ids(&[1, 2, 3])
    };
    let (mut store, _service) = loaded_store(service, 6).await;
    store.begin_edit(ItemId(3)).expect("edit");

    let outcome = store.update(draft("renamed")).await.expect("update");

    assert_eq!(outcome.kind, OutcomeKind::Updated);
    assert_eq!(ids(store.items()), vec![1, 2, 3]);
    assert_eq!(store.item(ItemId(3)).expect("item").title, "renamed (saved)");
    assert_eq!(store.item(ItemId(1)).expect("item").title, "title 1");
    assert!(store.editing().is_none());
}

#[tokio::test]
async fn update_of_item_unknown_to_remote_changes_nothing() {
    let service = ScriptedService {
        fail_create: true,
        ..ScriptedService::with_ids(&[1, 2])
    };
    let (mut store, service) = loaded_store(service, 6).await;
    store.create(draft("local only")).await;
    let before = store.items().to_vec();
    store.begin_edit(ItemId(3)).expect("edit");

    let outcome = store.update(draft("edited")).await.expect("update");

    assert_eq!(outcome.kind, OutcomeKind::UpdateFailedNotFound);
    assert!(outcome.is_error());
    assert_eq!(store.items(), before.as_slice());
    assert!(store.editing().is_none());
    assert!(store.load_error().is_none());
    assert_eq!(store.snapshot(1, false).banner(), Some(outcome.message.as_str()));
    assert!(service.calls().await.contains(&"update 3".to_string()));
}

#[tokio::test]
async fn update_requires_an_editing_selection() {
    let (mut store, service) = loaded_store(ScriptedService::with_ids(&[1]), 6).await;

    assert_eq!(
        store.update(draft("x")).await,
        Err(StoreError::NotEditing)
    );
    assert_eq!(
        store.update_item(ItemId(42), draft("x")).await,
        Err(StoreError::UnknownItem(ItemId(42)))
    );
    assert_eq!(service.calls().await, vec!["list"]);
}

#[tokio::test]
async fn deleting_last_item_on_last_page_clamps_page() {
    let ids_in: Vec<i64> = (1..=7).collect();
    let (mut store, _service) = loaded_store(ScriptedService::with_ids(&ids_in), 6).await;
    store.change_page(2);
    assert_eq!(ids(store.page_items()), vec![7]);

    let outcome = store.delete(ItemId(7)).await;

    assert_eq!(outcome.kind, OutcomeKind::Deleted);
    assert_eq!(store.current_page(), 1);
    assert_eq!(store.total_pages(), 1);
    assert_eq!(store.page_items().len(), 6);
}

#[tokio::test]
async fn delete_with_failing_remote_still_removes_and_clamps() {
    let ids_in: Vec<i64> = (1..=7).collect();
    let service = ScriptedService {
        fail_delete: true,
        ..ScriptedService::with_ids(&ids_in)
    };
    let (mut store, _service) = loaded_store(service, 6).await;
    store.change_page(2);
    store.begin_edit(ItemId(7)).expect("edit");

    let outcome = store.delete(ItemId(7)).await;

    assert_eq!(outcome.kind, OutcomeKind::DeletedLocally);
    assert!(!outcome.is_error());
    assert!(store.item(ItemId(7)).is_none());
    assert_eq!(store.current_page(), 1);
    assert!(store.editing().is_none());
}

#[tokio::test]
async fn deleting_everything_keeps_page_one() {
    let (mut store, _service) = loaded_store(ScriptedService::with_ids(&[1]), 6).await;
    store.delete(ItemId(1)).await;
    assert!(store.items().is_empty());
    assert_eq!(store.current_page(), 1);
    assert_eq!(store.total_pages(), 1);
    assert!(store.page_items().is_empty());
}

#[tokio::test]
async fn sort_change_resets_page_and_is_idempotent() {
    let ids_in: Vec<i64> = (1..=13).collect();
    let (mut store, _service) = loaded_store(ScriptedService::with_ids(&ids_in), 6).await;
    store.change_page(3);

    store.change_sort_order(SortOrder::Descending);
    let once = store.items().to_vec();
    store.change_sort_order(SortOrder::Descending);

    assert_eq!(store.items(), once.as_slice());
    assert_eq!(store.current_page(), 1);
    assert_eq!(ids(store.page_items()), vec![13, 12, 11, 10, 9, 8]);
}

#[tokio::test]
async fn page_change_requests_scroll_and_slices_collection() {
    let ids_in: Vec<i64> = (1..=13).collect();
    let (mut store, _service) = loaded_store(ScriptedService::with_ids(&ids_in), 6).await;

    store.change_page(3);
    let snapshot = store.snapshot(1, false);
    assert!(snapshot.scroll_to_top);
    assert_eq!(snapshot.showing, Some((13, 13)));
    assert_eq!(ids(&snapshot.page_items), vec![13]);

    store.change_sort_order(SortOrder::Ascending);
    assert!(!store.snapshot(2, false).scroll_to_top);

    // No upper bound check: an out-of-range page simply shows nothing.
    store.change_page(9);
    assert!(store.page_items().is_empty());
}

#[tokio::test]
async fn ids_stay_unique_across_create_and_delete_sequences() {
    let service = ScriptedService {
        created_id: Some(11),
        ..ScriptedService::with_ids(&[1, 5, 10])
    };
    let (mut store, _service) = loaded_store(service, 6).await;

    for step in 0..40u32 {
        if step % 3 == 2 {
            let victim = store.items()[(step as usize * 7) % store.items().len()].id;
            store.delete(victim).await;
        } else {
            store.create(draft(&format!("item {step}"))).await;
        }
        let unique: HashSet<_> = store.items().iter().map(|item| item.id).collect();
        assert_eq!(unique.len(), store.items().len(), "duplicate id at step {step}");
    }
}

#[tokio::test]
async fn local_id_falls_back_to_lowest_free_when_max_is_taken() {
    let (mut store, _service) = loaded_store(
        ScriptedService {
            fail_create: true,
            ..ScriptedService::with_ids(&[1, i64::MAX])
        },
        6,
    )
    .await;

    let outcome = store.create(draft("edge")).await;
    assert_eq!(outcome.kind, OutcomeKind::CreatedLocally);
    assert_eq!(ids(store.items()), vec![1, 2, i64::MAX]);

    store.create(draft("edge again")).await;
    assert_eq!(ids(store.items()), vec![1, 2, 3, i64::MAX]);
}

#[tokio::test]
async fn colliding_remote_id_at_top_of_range_gets_a_free_local_id() {
    let (mut store, _service) = loaded_store(
        ScriptedService {
            created_id: Some(i64::MAX),
            ..ScriptedService::with_ids(&[i64::MAX])
        },
        6,
    )
    .await;

    store.create(draft("edge")).await;
    let created = store.item(ItemId(1)).expect("local item");
    assert!(created.is_local());
}

#[tokio::test]
async fn reinitialize_drops_the_editing_selection() {
    let (mut store, _service) = loaded_store(ScriptedService::with_ids(&[1, 2]), 6).await;
    store.begin_edit(ItemId(2)).expect("begin edit");

    store.initialize().await;

    assert!(store.editing().is_none());
    assert_eq!(store.update(draft("x")).await, Err(StoreError::NotEditing));
}

#[tokio::test]
async fn update_with_stale_selection_clears_it() {
    let (mut store, service) = loaded_store(ScriptedService::with_ids(&[1]), 6).await;
    store.editing = Some(ItemId(9));

    assert_eq!(
        store.update(draft("x")).await,
        Err(StoreError::UnknownItem(ItemId(9)))
    );
    assert_eq!(store.editing, None);
    assert_eq!(service.calls().await, vec!["list"]);
}

#[tokio::test]
async fn begin_edit_rejects_unknown_ids() {
    let (mut store, _service) = loaded_store(ScriptedService::with_ids(&[1]), 6).await;
    assert_eq!(
        store.begin_edit(ItemId(2)).map(|item| item.id),
        Err(StoreError::UnknownItem(ItemId(2)))
    );
    assert_eq!(store.begin_edit(ItemId(1)).map(|item| item.id), Ok(ItemId(1)));
    store.cancel_edit();
    assert!(store.editing().is_none());
}

#[tokio::test]
async fn dismiss_notice_clears_outcome() {
    let (mut store, _service) = loaded_store(ScriptedService::with_ids(&[1]), 6).await;
    store.delete(ItemId(1)).await;
    assert_eq!(
        store.snapshot(1, false).notice().map(|o| o.kind),
        Some(OutcomeKind::Deleted)
    );
    store.dismiss_notice();
    assert!(store.last_outcome().is_none());
}
