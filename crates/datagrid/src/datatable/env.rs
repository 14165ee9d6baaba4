//! Port to the process-wide browser state: location, history, storage,
//! alerts and timers.
//!
//! The data source only talks to the browser through [`EnvironmentPort`], so it
//! can be driven by an in-memory implementation in tests.

use futures::future::LocalBoxFuture;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use super::config::StorageScope;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("storage unavailable")]
    StorageUnavailable,
    #[error("storage write failed: {0}")]
    StorageWrite(String),
    #[error("history update failed: {0}")]
    History(String),
    #[error("cannot listen for navigation: {0}")]
    Navigation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Overwrite the current entry
    Replace,
    /// Add a new entry
    Push,
}

pub trait EnvironmentPort {
    /// Current query string, with or without the leading `?`
    fn read_location(&self) -> String;

    /// Points the location at `query` and records `payload` as the state
    /// object of the history entry
    fn write_location(
        &self,
        query: &str,
        payload: &BTreeMap<String, String>,
        mode: HistoryMode,
    ) -> Result<(), EnvError>;

    fn read_storage(&self, scope: StorageScope, key: &str) -> Option<String>;

    fn write_storage(&self, scope: StorageScope, key: &str, value: &str) -> Result<(), EnvError>;

    /// Blocking user-facing notice
    fn alert(&self, message: &str);

    /// Resolves once `duration` has elapsed
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}
