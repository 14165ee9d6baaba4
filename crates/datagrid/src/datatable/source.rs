//! List data source: binds [`ListState`] to a remote list endpoint and keeps
//! the location, history and storage in step with it.
//!
//! Everything runs on one thread. Mutators are `async` because they end in a
//! reload; while a fetch is outstanding they do nothing, so at most one
//! request per source is ever in flight. No `RefCell` borrow is held across an
//! await point.

use contracts::datatable::{FilterExpr, ListMetadata};
use futures::future::{self, Either};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::api::{FetchError, ListRequest, ListTransport};
use super::codec;
use super::config::ListOptions;
use super::env::EnvironmentPort;
use super::events::ListEvent;
use super::gate::FetchGate;
use super::state::{self, ListState, PAGE_SIZE_PARAM};
use super::storage::{self, StoredState};

pub const NOT_AUTHENTICATED_MESSAGE: &str = "Error: you are not logged in, data cannot be \
     retrieved from the server, please refresh the page.";

pub type HeadersHook = Box<dyn Fn() -> Vec<(String, String)>>;
type Listener = Rc<dyn Fn(&ListEvent)>;

/// Result of one `load`/`reload` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was fetched: the gate was held, or nothing was loaded yet
    Skipped,
    Loaded,
    Failed(FetchError),
}

pub struct ListDataSource<T> {
    options: ListOptions,
    storage_key: String,
    env: Rc<dyn EnvironmentPort>,
    transport: Rc<dyn ListTransport<T>>,
    headers: Option<HeadersHook>,
    state: RefCell<ListState>,
    metadata: RefCell<Option<ListMetadata>>,
    records: RefCell<Vec<T>>,
    visibility: RefCell<BTreeMap<String, bool>>,
    gate: FetchGate,
    listeners: RefCell<Vec<Listener>>,
}

impl<T> ListDataSource<T> {
    /// Seeds state from the location, then storage, then `options`, and
    /// replaces the current history entry with the resolved state.
    pub fn new(
        options: ListOptions,
        env: Rc<dyn EnvironmentPort>,
        transport: Rc<dyn ListTransport<T>>,
    ) -> Self {
        let storage_key = storage::storage_key(&options.id);
        let mut state = ListState::new(options.fallback_page_size());

        let location = env.read_location();
        let location_page_size = location_page_size(&location);
        if !location.trim_start_matches('?').is_empty() {
            state = codec::decode_from_location(&location, &state);
        }

        let stored = storage::read_storage(&*env, options.storage_scope, &storage_key);
        state.page_size = location_page_size
            .or(stored.page_size)
            .unwrap_or_else(|| options.fallback_page_size());

        log::debug!(
            "list {}: sort={:?} page={} page_size={} filters={:?}",
            options.id,
            state.sort,
            state.page,
            state.page_size,
            state.filters
        );

        let source = Self {
            options,
            storage_key,
            env,
            transport,
            headers: None,
            state: RefCell::new(state),
            metadata: RefCell::new(None),
            records: RefCell::new(Vec::new()),
            visibility: RefCell::new(stored.visibility),
            gate: FetchGate::new(),
            listeners: RefCell::new(Vec::new()),
        };
        source.save_state_to_location(true);
        source
    }

    /// Headers sent with every list request
    pub fn with_headers(mut self, hook: impl Fn() -> Vec<(String, String)> + 'static) -> Self {
        self.headers = Some(Box::new(hook));
        self
    }

    // ---- observers ----

    pub fn subscribe(&self, listener: impl Fn(&ListEvent) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Called for every failed fetch, 403 included
    pub fn on_error(&self, callback: impl Fn(&FetchError) + 'static) {
        self.subscribe(move |event| {
            if let ListEvent::LoadFailed(error) = event {
                callback(error);
            }
        });
    }

    fn emit(&self, event: ListEvent) {
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&event);
        }
    }

    // ---- accessors ----

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    pub fn metadata(&self) -> Option<ListMetadata> {
        self.metadata.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.gate.is_loading()
    }

    pub fn environment(&self) -> &dyn EnvironmentPort {
        &*self.env
    }

    pub fn gate(&self) -> &FetchGate {
        &self.gate
    }

    pub fn with_records<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.records.borrow())
    }

    pub fn records(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.records.borrow().clone()
    }

    pub fn visibility(&self) -> BTreeMap<String, bool> {
        self.visibility.borrow().clone()
    }

    /// Columns without a recorded preference are visible
    pub fn is_column_visible(&self, name: &str) -> bool {
        self.visibility.borrow().get(name).copied().unwrap_or(true)
    }

    /// Request for the current state
    pub fn request(&self) -> ListRequest {
        ListRequest {
            endpoint: self.options.endpoint.clone(),
            headers: self.headers.as_ref().map(|hook| hook()).unwrap_or_default(),
            params: self.state.borrow().to_ordered_params(),
        }
    }

    // ---- persistence ----

    fn save_state_to_location(&self, replace: bool) {
        let state = self.state();
        if let Err(e) = codec::push_or_replace_history(&*self.env, &state, replace) {
            log::warn!("list {}: cannot update location: {e}", self.options.id);
        }
    }

    fn save_state_to_storage(&self) {
        let stored = StoredState {
            page_size: Some(self.state.borrow().page_size),
            visibility: self.visibility(),
        };
        storage::write_storage(
            &*self.env,
            self.options.storage_scope,
            &self.storage_key,
            &stored,
        );
    }

    // ---- loading ----

    pub async fn load(&self) -> LoadOutcome {
        self.load_with(|_| {}).await
    }

    /// Fetches the page described by the current state. Does nothing while
    /// another fetch is outstanding.
    pub async fn load_with(&self, on_success: impl FnOnce(&Self)) -> LoadOutcome {
        let Some(guard) = self.gate.try_acquire() else {
            log::debug!("list {}: fetch already in flight", self.options.id);
            return LoadOutcome::Skipped;
        };
        self.emit(ListEvent::DataRequested);

        let request = self.request();
        let result = {
            let fetch = self.transport.fetch(&request);
            match self.options.request_timeout() {
                Some(timeout) => match future::select(fetch, self.env.sleep(timeout)).await {
                    Either::Left((result, _)) => result,
                    Either::Right(((), _)) => Err(FetchError::Timeout(timeout)),
                },
                None => fetch.await,
            }
        };
        drop(guard);

        match result {
            Ok(response) => {
                log::debug!(
                    "list {}: page {}/{} ({} objects)",
                    self.options.id,
                    response.metadata.page,
                    response.metadata.pages_total,
                    response.metadata.number_of_objects
                );
                *self.metadata.borrow_mut() = Some(response.metadata);
                *self.records.borrow_mut() = response.result;
                self.emit(ListEvent::DataLoaded);
                on_success(self);
                LoadOutcome::Loaded
            }
            Err(error) => {
                log::warn!("list {}: fetch failed: {error}", self.options.id);
                if error.is_unauthorized() {
                    self.env.alert(NOT_AUTHENTICATED_MESSAGE);
                    self.emit(ListEvent::Unauthorized);
                }
                self.emit(ListEvent::LoadFailed(error.clone()));
                LoadOutcome::Failed(error)
            }
        }
    }

    /// Reloads, unless nothing has been loaded yet. With `persist` the state
    /// is pushed to the history first.
    pub async fn reload(&self, persist: bool) -> LoadOutcome {
        if self.metadata.borrow().is_none() {
            return LoadOutcome::Skipped;
        }
        if persist {
            self.save_state_to_location(false);
        }
        self.load().await
    }

    // ---- mutators ----

    pub async fn set_sort(&self, sort: impl Into<String>) -> bool {
        let sort = sort.into();
        if self.gate.is_loading() || self.state.borrow().sort == sort {
            return false;
        }
        {
            let mut st = self.state.borrow_mut();
            st.sort = sort;
            st.page = 1;
        }
        self.reload(true).await;
        true
    }

    /// Pages below 1 are treated as 1
    pub async fn set_page(&self, page: u32) -> bool {
        let page = page.max(1);
        if self.gate.is_loading() || self.state.borrow().page == page {
            return false;
        }
        self.state.borrow_mut().page = page;
        self.reload(true).await;
        true
    }

    /// Also stores the page size right away, so it survives without a reload
    pub async fn set_page_size(&self, page_size: u32) -> bool {
        if page_size == 0 || self.gate.is_loading() || self.state.borrow().page_size == page_size
        {
            return false;
        }
        {
            let mut st = self.state.borrow_mut();
            st.page_size = page_size;
            st.page = 1;
        }
        self.save_state_to_storage();
        self.reload(true).await;
        true
    }

    /// Replaces all filters. Applies even when they are unchanged. Filters
    /// with an empty field name cannot be put in a URL and are dropped.
    pub async fn set_filters(&self, mut filters: BTreeMap<String, String>) -> bool {
        if self.gate.is_loading() {
            return false;
        }
        if filters.remove("").is_some() {
            log::warn!("list {}: dropping filter without a field name", self.options.id);
        }
        {
            let mut st = self.state.borrow_mut();
            st.filters = filters;
            st.page = 1;
        }
        self.reload(true).await;
        true
    }

    pub async fn set_typed_filters<I, K>(&self, filters: I) -> bool
    where
        I: IntoIterator<Item = (K, FilterExpr)>,
        K: Into<String>,
    {
        self.set_filters(state::filters_from_exprs(filters)).await
    }

    // ---- columns ----

    /// Default visibility for columns without a stored preference
    pub fn register_columns<'a>(&self, columns: impl IntoIterator<Item = (&'a str, bool)>) {
        let mut visibility = self.visibility.borrow_mut();
        for (name, visible) in columns {
            visibility.entry(name.to_string()).or_insert(visible);
        }
    }

    pub fn set_column_visible(&self, name: &str, visible: bool) {
        self.visibility
            .borrow_mut()
            .insert(name.to_string(), visible);
        self.save_state_to_storage();
    }

    // ---- navigation ----

    /// Back/forward handler. `has_state` tells whether the new history entry
    /// carries a state object; entries without one predate this source.
    pub async fn handle_popstate(&self, has_state: bool) {
        if has_state {
            self.restore_from_location().await;
        } else {
            self.reset_state().await;
        }
    }

    /// Re-reads state from the current location and reloads without
    /// touching the history
    pub async fn restore_from_location(&self) {
        let location = self.env.read_location();
        let restored = codec::decode_from_location(&location, &self.state.borrow());
        *self.state.borrow_mut() = restored;
        self.emit(ListEvent::StateRestored);
        self.reload(false).await;
    }

    /// Back to initial values; page size comes from storage or the default
    pub async fn reset_state(&self) {
        let stored = storage::read_storage(&*self.env, self.options.storage_scope, &self.storage_key);
        let page_size = stored
            .page_size
            .unwrap_or_else(|| self.options.fallback_page_size());
        {
            let mut st = self.state.borrow_mut();
            st.sort.clear();
            st.page = 1;
            st.page_size = page_size;
            st.filters.clear();
        }
        self.save_state_to_storage();
        self.emit(ListEvent::StateReset);
        self.reload(false).await;
    }
}

fn location_page_size(location: &str) -> Option<u32> {
    codec::parse_query(location)
        .into_iter()
        .rev()
        .find(|(key, _)| key == PAGE_SIZE_PARAM)
        .and_then(|(_, value)| value.trim().parse::<u32>().ok())
        .filter(|size| *size >= 1)
}
