pub(crate) mod list_sync;

use crate::analytics::Analytics;
use crate::api::{ApiClient, EnvConfig};
use crate::models::{Bookmark, Identity};
use crate::storage::load_identity_from_storage;
use leptos::prelude::*;

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub analytics: Analytics,

    /// Resolved by the session guard on mount of the bookmarks view. The
    /// stored value (if any) only warms the welcome line; data loading waits
    /// for a fresh lookup.
    pub identity: RwSignal<Option<Identity>>,

    /// The in-memory bookmark collection, newest first. Disposable cache;
    /// the remote collection is the source of truth.
    pub bookmarks: RwSignal<Vec<Bookmark>>,
    pub bookmarks_loading: RwSignal<bool>,

    /// Bumped on sign-out and view teardown. Async confirmations capture the
    /// epoch when issued and apply nothing once it has moved.
    pub session_epoch: RwSignal<u64>,
}

impl AppState {
    pub fn new() -> Self {
        let cfg = EnvConfig::new();
        let stored_client = ApiClient::load_from_storage(&cfg);
        let stored_identity = load_identity_from_storage();
        let analytics = Analytics::from_config(&cfg);

        Self {
            api_client: RwSignal::new(stored_client),
            analytics,
            identity: RwSignal::new(stored_identity),
            bookmarks: RwSignal::new(vec![]),
            bookmarks_loading: RwSignal::new(false),
            session_epoch: RwSignal::new(0),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
