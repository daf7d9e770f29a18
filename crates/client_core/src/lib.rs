use std::sync::Arc;

pub mod config;
pub mod error;
pub mod outcome;
pub mod pagination;
pub mod remote;
pub mod store;
pub mod worker;

pub use config::ClientSettings;
pub use error::{DispatchError, RemoteError, StoreError};
pub use outcome::{Outcome, OutcomeKind, Severity};
pub use pagination::PageWindow;
pub use remote::{HttpItemService, ItemService, UnavailableItemService};
pub use store::{ItemStore, StoreSnapshot};
pub use worker::{spawn_store_worker, StoreCommand, StoreHandle};

/// Store wired to the configured remote, or to no remote at all when
/// `offline` is set.
pub fn build_store(settings: &ClientSettings, offline: bool) -> ItemStore {
    let service: Arc<dyn ItemService> = if offline {
        Arc::new(UnavailableItemService)
    } else {
        Arc::new(HttpItemService::new(settings.api_base_url.clone()))
    };
    ItemStore::new(service, settings.page_size)
}
