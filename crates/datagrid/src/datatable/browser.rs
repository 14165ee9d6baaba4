//! `web-sys` binding of [`EnvironmentPort`] and the `popstate` listener.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{window, PopStateEvent};

use super::api::GlooTransport;
use super::config::{ListOptions, StorageScope};
use super::env::{EnvError, EnvironmentPort, HistoryMode};
use super::source::ListDataSource;

fn get_storage(scope: StorageScope) -> Option<web_sys::Storage> {
    let w = window()?;
    match scope {
        StorageScope::Session => w.session_storage().ok()?,
        StorageScope::Local => w.local_storage().ok()?,
    }
}

/// The current browser window
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserEnvironment;

impl EnvironmentPort for BrowserEnvironment {
    fn read_location(&self) -> String {
        window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default()
    }

    fn write_location(
        &self,
        query: &str,
        payload: &BTreeMap<String, String>,
        mode: HistoryMode,
    ) -> Result<(), EnvError> {
        let w = window().ok_or_else(|| EnvError::History("no window".to_string()))?;
        let history = w
            .history()
            .map_err(|e| EnvError::History(format!("{e:?}")))?;
        // keep the fragment, only the query changes
        let hash = w.location().hash().unwrap_or_default();
        let url = format!("?{query}{hash}");
        let state = payload
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| EnvError::History(e.to_string()))?;

        match mode {
            HistoryMode::Replace => history.replace_state_with_url(&state, "", Some(&url)),
            HistoryMode::Push => history.push_state_with_url(&state, "", Some(&url)),
        }
        .map_err(|e| EnvError::History(format!("{e:?}")))
    }

    fn read_storage(&self, scope: StorageScope, key: &str) -> Option<String> {
        get_storage(scope)?.get_item(key).ok()?
    }

    fn write_storage(&self, scope: StorageScope, key: &str, value: &str) -> Result<(), EnvError> {
        get_storage(scope)
            .ok_or(EnvError::StorageUnavailable)?
            .set_item(key, value)
            .map_err(|e| EnvError::StorageWrite(format!("{e:?}")))
    }

    fn alert(&self, message: &str) {
        if let Some(w) = window() {
            let _ = w.alert_with_message(message);
        }
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        gloo_timers::future::sleep(duration).boxed_local()
    }
}

/// Re-derives the source's state on back/forward navigation
pub fn attach_popstate<T: 'static>(source: Rc<ListDataSource<T>>) -> Result<(), EnvError> {
    let w = window().ok_or_else(|| EnvError::Navigation("no window".to_string()))?;

    let closure = Closure::wrap(Box::new(move |event: PopStateEvent| {
        let state = event.state();
        let has_state = !(state.is_null() || state.is_undefined());
        let source = source.clone();
        wasm_bindgen_futures::spawn_local(async move {
            source.handle_popstate(has_state).await;
        });
    }) as Box<dyn FnMut(PopStateEvent)>);

    w.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
        .map_err(|e| EnvError::Navigation(format!("{e:?}")))?;
    // lives as long as the page
    closure.forget();
    Ok(())
}

/// Data source wired to the current window and `fetch`, listening for
/// back/forward navigation
pub fn browser_source<T: DeserializeOwned + 'static>(
    options: ListOptions,
) -> Result<Rc<ListDataSource<T>>, EnvError> {
    let source = Rc::new(ListDataSource::new(
        options,
        Rc::new(BrowserEnvironment),
        Rc::new(GlooTransport::<T>::new()),
    ));
    attach_popstate(source.clone())?;
    Ok(source)
}
