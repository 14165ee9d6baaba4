//! In-memory environment and scripted transport for unit tests.

use async_trait::async_trait;
use contracts::datatable::{ListMetadata, ListResponse};
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use super::api::{FetchError, ListRequest, ListTransport};
use super::config::StorageScope;
use super::env::{EnvError, EnvironmentPort, HistoryMode};

pub type HistoryWrite = (String, HistoryMode, BTreeMap<String, String>);

#[derive(Default)]
pub struct MemoryEnvironment {
    location: RefCell<String>,
    history: RefCell<Vec<HistoryWrite>>,
    storage: RefCell<HashMap<(StorageScope, String), String>>,
    alerts: RefCell<Vec<String>>,
    fail_writes: Cell<bool>,
    timers_fire: Cell<bool>,
    timers: RefCell<Vec<oneshot::Sender<()>>>,
}

impl MemoryEnvironment {
    pub fn with_location(query: &str) -> Self {
        let env = Self::default();
        env.set_location(query);
        env
    }

    pub fn set_location(&self, query: &str) {
        *self.location.borrow_mut() = query.to_string();
    }

    pub fn location(&self) -> String {
        self.location.borrow().clone()
    }

    pub fn history_writes(&self) -> Vec<HistoryWrite> {
        self.history.borrow().clone()
    }

    pub fn set_stored(&self, scope: StorageScope, key: &str, value: &str) {
        self.storage
            .borrow_mut()
            .insert((scope, key.to_string()), value.to_string());
    }

    pub fn stored(&self, scope: StorageScope, key: &str) -> Option<String> {
        self.storage.borrow().get(&(scope, key.to_string())).cloned()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn fail_storage_writes(&self) {
        self.fail_writes.set(true);
    }

    /// Makes every `sleep` resolve immediately
    pub fn fire_timers(&self) {
        self.timers_fire.set(true);
    }

    /// Wakes every `sleep` started so far
    pub fn elapse_pending_timers(&self) {
        for timer in self.timers.borrow_mut().drain(..) {
            let _ = timer.send(());
        }
    }
}

impl EnvironmentPort for MemoryEnvironment {
    fn read_location(&self) -> String {
        self.location()
    }

    fn write_location(
        &self,
        query: &str,
        payload: &BTreeMap<String, String>,
        mode: HistoryMode,
    ) -> Result<(), EnvError> {
        self.set_location(&format!("?{query}"));
        self.history
            .borrow_mut()
            .push((query.to_string(), mode, payload.clone()));
        Ok(())
    }

    fn read_storage(&self, scope: StorageScope, key: &str) -> Option<String> {
        self.stored(scope, key)
    }

    fn write_storage(&self, scope: StorageScope, key: &str, value: &str) -> Result<(), EnvError> {
        if self.fail_writes.get() {
            return Err(EnvError::StorageWrite("quota exceeded".to_string()));
        }
        self.set_stored(scope, key, value);
        Ok(())
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
        if self.timers_fire.get() {
            return future::ready(()).boxed_local();
        }
        let (tx, rx) = oneshot::channel();
        self.timers.borrow_mut().push(tx);
        rx.map(|_| ()).boxed_local()
    }
}

pub enum Scripted<T> {
    Respond(Result<ListResponse<T>, FetchError>),
    Deferred(oneshot::Receiver<Result<ListResponse<T>, FetchError>>),
    Hang,
}

/// Answers requests from a queue and records what was asked
pub struct ScriptedTransport<T> {
    script: RefCell<VecDeque<Scripted<T>>>,
    requests: RefCell<Vec<ListRequest>>,
}

impl<T> Default for ScriptedTransport<T> {
    fn default() -> Self {
        Self {
            script: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl<T> ScriptedTransport<T> {
    pub fn respond(&self, result: Result<ListResponse<T>, FetchError>) {
        self.script.borrow_mut().push_back(Scripted::Respond(result));
    }

    pub fn respond_ok(&self, metadata: ListMetadata, result: Vec<T>) {
        self.respond(Ok(ListResponse { metadata, result }));
    }

    pub fn defer(&self) -> oneshot::Sender<Result<ListResponse<T>, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.script.borrow_mut().push_back(Scripted::Deferred(rx));
        tx
    }

    pub fn hang(&self) {
        self.script.borrow_mut().push_back(Scripted::Hang);
    }

    pub fn requests(&self) -> Vec<ListRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl<T> ListTransport<T> for ScriptedTransport<T> {
    async fn fetch(&self, request: &ListRequest) -> Result<ListResponse<T>, FetchError> {
        self.requests.borrow_mut().push(request.clone());
        let next = self.script.borrow_mut().pop_front();
        match next {
            Some(Scripted::Respond(result)) => result,
            Some(Scripted::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Network("cancelled".to_string()))),
            Some(Scripted::Hang) => future::pending().await,
            None => Err(FetchError::Network("nothing scripted".to_string())),
        }
    }
}

pub fn metadata(page: u32, pages_total: u32, number_of_objects: u64) -> ListMetadata {
    ListMetadata {
        page,
        pages_total,
        number_of_objects,
        next: page < pages_total,
        ..Default::default()
    }
}
