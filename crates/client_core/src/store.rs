use std::{collections::BTreeSet, sync::Arc};

use shared::domain::{Item, ItemDraft, ItemId, ItemOrigin, SortOrder};
use tracing::{info, warn};

use crate::{
    error::StoreError,
    outcome::{Outcome, OutcomeKind},
    pagination::{clamp_page, PageWindow},
    remote::ItemService,
};

/// The in-memory item collection plus the view state derived from it.
///
/// Every operation runs its single remote call to completion before touching
/// local state, so a caller holding `&ItemStore` never sees a half-applied
/// mutation.
pub struct ItemStore {
    service: Arc<dyn ItemService>,
    items: Vec<Item>,
    sort_order: SortOrder,
    current_page: usize,
    page_size: usize,
    editing: Option<ItemId>,
    load_error: Option<String>,
    last_outcome: Option<Outcome>,
    scroll_to_top: bool,
}

/// Everything a view needs to draw the list, cloned out of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub revision: u64,
    pub page_items: Vec<Item>,
    pub sort_order: SortOrder,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    pub showing: Option<(usize, usize)>,
    pub editing: Option<Item>,
    pub last_outcome: Option<Outcome>,
    pub load_error: Option<String>,
    /// Set after a rejected command, e.g. editing an id that is not listed.
    pub command_error: Option<String>,
    pub busy: bool,
    pub scroll_to_top: bool,
}

impl StoreSnapshot {
    /// Persistent error line: the load failure, or an error outcome.
    pub fn banner(&self) -> Option<&str> {
        if let Some(load_error) = &self.load_error {
            return Some(load_error);
        }
        self.last_outcome
            .as_ref()
            .filter(|outcome| outcome.is_error())
            .map(|outcome| outcome.message.as_str())
    }

    /// Transient success-styled notice, including soft-recovered outcomes.
    pub fn notice(&self) -> Option<&Outcome> {
        self.last_outcome
            .as_ref()
            .filter(|outcome| !outcome.is_error())
    }
}

impl ItemStore {
    pub fn new(service: Arc<dyn ItemService>, page_size: usize) -> Self {
        Self {
            service,
            items: Vec::new(),
            sort_order: SortOrder::Ascending,
            current_page: 1,
            page_size: page_size.max(1),
            editing: None,
            load_error: None,
            last_outcome: None,
            scroll_to_top: false,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn editing(&self) -> Option<&Item> {
        self.editing.and_then(|id| self.item(id))
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.current_page, self.page_size, self.items.len())
    }

    pub fn total_pages(&self) -> usize {
        self.window().total_pages()
    }

    pub fn page_items(&self) -> &[Item] {
        &self.items[self.window().range()]
    }

    pub fn snapshot(&self, revision: u64, busy: bool) -> StoreSnapshot {
        let window = self.window();
        StoreSnapshot {
            revision,
            page_items: self.page_items().to_vec(),
            sort_order: self.sort_order,
            current_page: self.current_page,
            total_pages: window.total_pages(),
            total_items: self.items.len(),
            page_size: self.page_size,
            showing: window.showing(),
            editing: self.editing().cloned(),
            last_outcome: self.last_outcome.clone(),
            load_error: self.load_error.clone(),
            command_error: None,
            busy,
            scroll_to_top: self.scroll_to_top,
        }
    }

    /// Replaces the collection with the remote one, sorted ascending on page 1.
    /// A failed fetch leaves the collection empty and records a load error.
    pub async fn initialize(&mut self) -> Outcome {
        self.scroll_to_top = false;
        self.sort_order = SortOrder::Ascending;
        self.current_page = 1;
        self.editing = None;

        let outcome = match self.service.list().await {
            Ok(mut items) => {
                SortOrder::Ascending.apply(&mut items);
                info!(count = items.len(), "loaded items from remote");
                self.items = items;
                self.load_error = None;
                Outcome::new(OutcomeKind::Loaded)
            }
            Err(error) => {
                warn!(%error, "initial item load failed");
                self.items.clear();
                let outcome = Outcome::new(OutcomeKind::LoadFailed);
                self.load_error = Some(outcome.message.clone());
                outcome
            }
        };
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Creates an item remotely, falling back to a local id when the remote
    /// fails or hands back an id that is missing or already held. The current
    /// page is left alone even if the new item sorts onto another page.
    pub async fn create(&mut self, draft: ItemDraft) -> Outcome {
        self.scroll_to_top = false;

        let created = self.service.create(&draft).await;
        let (item, kind) = match created {
            Ok(response) => {
                let (id, origin) = match response.usable_id() {
                    Some(id) if self.item(id).is_none() => (id, ItemOrigin::Remote),
                    Some(id) => {
                        warn!(
                            item_id = id.0,
                            "remote returned an id already held locally; assigning a local id"
                        );
                        (self.next_local_id(), ItemOrigin::Local)
                    }
                    None => (self.next_local_id(), ItemOrigin::Local),
                };
                (
                    response.merge_into_item(id, origin, &draft),
                    OutcomeKind::Created,
                )
            }
            Err(error) => {
                warn!(%error, "remote create failed; keeping item locally");
                let id = self.next_local_id();
                (
                    draft.into_item(id, ItemOrigin::Local),
                    OutcomeKind::CreatedLocally,
                )
            }
        };

        info!(item_id = item.id.0, origin = ?item.origin, "item created");
        self.items.push(item);
        self.sort_order.apply(&mut self.items);
        self.finish_edit_flow(Outcome::new(kind))
    }

    /// Saves `draft` over the item currently selected for editing.
    pub async fn update(&mut self, draft: ItemDraft) -> Result<Outcome, StoreError> {
        let id = self.editing.ok_or(StoreError::NotEditing)?;
        self.update_item(id, draft).await
    }

    /// Saves `draft` over item `id`. Only a successful remote update changes
    /// local state; a rejected one discards the edit.
    pub async fn update_item(
        &mut self,
        id: ItemId,
        draft: ItemDraft,
    ) -> Result<Outcome, StoreError> {
        self.scroll_to_top = false;
        let Some(origin) = self.item(id).map(|item| item.origin) else {
            self.editing = None;
            return Err(StoreError::UnknownItem(id));
        };

        let outcome = match self.service.update(id, &draft).await {
            Ok(response) => {
                // Some backends echo a different or fixed id; ours stays.
                let updated = response.merge_into_item(id, origin, &draft);
                if let Some(slot) = self.items.iter_mut().find(|item| item.id == id) {
                    *slot = updated;
                }
                self.sort_order.apply(&mut self.items);
                info!(item_id = id.0, "item updated");
                Outcome::new(OutcomeKind::Updated)
            }
            Err(error) => {
                warn!(item_id = id.0, %error, "remote update rejected; edit discarded");
                Outcome::new(OutcomeKind::UpdateFailedNotFound)
            }
        };
        Ok(self.finish_edit_flow(outcome))
    }

    /// Removes item `id` locally whatever the remote says, then pulls the
    /// current page back if it is now past the end.
    pub async fn delete(&mut self, id: ItemId) -> Outcome {
        self.scroll_to_top = false;

        let kind = match self.service.delete(id).await {
            Ok(()) => OutcomeKind::Deleted,
            Err(error) => {
                warn!(item_id = id.0, %error, "remote delete failed; removing locally");
                OutcomeKind::DeletedLocally
            }
        };

        self.items.retain(|item| item.id != id);
        if self.editing == Some(id) {
            self.editing = None;
        }
        self.current_page = clamp_page(self.current_page, self.items.len(), self.page_size);
        info!(item_id = id.0, page = self.current_page, "item deleted");

        let outcome = Outcome::new(kind);
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Re-sorts everything and restarts the view at page 1.
    pub fn change_sort_order(&mut self, sort_order: SortOrder) {
        self.sort_order = sort_order;
        self.sort_order.apply(&mut self.items);
        self.current_page = 1;
        self.scroll_to_top = false;
    }

    /// Jumps to `page` without an upper bound check; the view only offers
    /// existing pages. Asks the view to scroll back to the top.
    pub fn change_page(&mut self, page: usize) {
        self.current_page = page.max(1);
        self.scroll_to_top = true;
    }

    pub fn begin_edit(&mut self, id: ItemId) -> Result<&Item, StoreError> {
        self.scroll_to_top = false;
        if self.item(id).is_none() {
            return Err(StoreError::UnknownItem(id));
        }
        self.editing = Some(id);
        self.item(id).ok_or(StoreError::UnknownItem(id))
    }

    pub fn cancel_edit(&mut self) {
        self.scroll_to_top = false;
        self.editing = None;
    }

    pub fn dismiss_notice(&mut self) {
        self.scroll_to_top = false;
        self.last_outcome = None;
    }

    /// `max(existing ids, 0) + 1`, or the lowest free positive id once the
    /// remote has used up the top of the range.
    pub fn next_local_id(&self) -> ItemId {
        let max = self.items.iter().map(|item| item.id.0).max().unwrap_or(0);
        match max.max(0).checked_add(1) {
            Some(next) => ItemId(next),
            None => self.lowest_free_id(),
        }
    }

    fn lowest_free_id(&self) -> ItemId {
        let taken: BTreeSet<i64> = self
            .items
            .iter()
            .map(|item| item.id.0)
            .filter(|id| *id > 0)
            .collect();
        let mut candidate = 1;
        for id in taken {
            if id != candidate {
                break;
            }
            candidate += 1;
        }
        ItemId(candidate)
    }

    fn finish_edit_flow(&mut self, outcome: Outcome) -> Outcome {
        self.editing = None;
        self.load_error = None;
        self.last_outcome = Some(outcome.clone());
        outcome
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
