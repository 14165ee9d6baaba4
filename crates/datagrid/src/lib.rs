//! Paginated, sortable, filterable list state bound to a REST list endpoint.
//!
//! [`ListDataSource`] mirrors sort/page/filter state into the URL, the browser
//! history and session storage, and keeps at most one request in flight.
//! Widget view models in [`datatable::ui`] read that state and call its mutators.

pub mod datatable;

pub use datatable::api::{FetchError, ListRequest, ListTransport};
pub use datatable::config::{ListOptions, StorageScope};
pub use datatable::env::{EnvError, EnvironmentPort, HistoryMode};
pub use datatable::events::ListEvent;
pub use datatable::gate::{FetchGate, GateGuard};
pub use datatable::source::{ListDataSource, LoadOutcome};
pub use datatable::state::ListState;

#[cfg(target_arch = "wasm32")]
pub use datatable::api::GlooTransport;
#[cfg(target_arch = "wasm32")]
pub use datatable::browser::{attach_popstate, browser_source, BrowserEnvironment};

/// Routes `log` output to the browser console and installs the panic hook
#[cfg(target_arch = "wasm32")]
pub fn init_logging(level: log::Level) {
    _ = console_log::init_with_level(level);
    console_error_panic_hook::set_once();
}
