//! Per-table blob kept in session/local storage: page size and column visibility.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::config::StorageScope;
use super::env::EnvironmentPort;

const STORAGE_PREFIX: &str = "datagrid.";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub visibility: BTreeMap<String, bool>,
}

pub fn storage_key(id: &str) -> String {
    format!("{STORAGE_PREFIX}{id}")
}

/// Reads the stored blob. Missing or corrupt data reads as empty.
pub fn read_storage(env: &dyn EnvironmentPort, scope: StorageScope, key: &str) -> StoredState {
    let Some(raw) = env.read_storage(scope, key) else {
        return StoredState::default();
    };
    match serde_json::from_str::<StoredState>(&raw) {
        Ok(mut stored) => {
            stored.page_size = stored.page_size.filter(|size| *size >= 1);
            stored
        }
        Err(e) => {
            log::warn!("ignoring corrupt stored state under {key}: {e}");
            StoredState::default()
        }
    }
}

/// Best-effort write; failures are logged and dropped
pub fn write_storage(
    env: &dyn EnvironmentPort,
    scope: StorageScope,
    key: &str,
    value: &StoredState,
) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("cannot serialize stored state for {key}: {e}");
            return;
        }
    };
    if let Err(e) = env.write_storage(scope, key, &raw) {
        log::warn!("cannot write stored state for {key}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatable::testing::MemoryEnvironment;

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key("orders"), "datagrid.orders");
    }

    #[test]
    fn test_write_then_read() {
        let env = MemoryEnvironment::default();
        let stored = StoredState {
            page_size: Some(30),
            visibility: BTreeMap::from([("email".to_string(), false)]),
        };
        write_storage(&env, StorageScope::Session, "datagrid.t", &stored);
        assert_eq!(
            env.stored(StorageScope::Session, "datagrid.t").as_deref(),
            Some(r#"{"page_size":30,"visibility":{"email":false}}"#)
        );
        assert_eq!(read_storage(&env, StorageScope::Session, "datagrid.t"), stored);
        assert_eq!(
            read_storage(&env, StorageScope::Local, "datagrid.t"),
            StoredState::default()
        );
    }

    #[test]
    fn test_corrupt_blob_reads_empty() {
        let env = MemoryEnvironment::default();
        env.set_stored(StorageScope::Session, "k", "{not json");
        assert_eq!(read_storage(&env, StorageScope::Session, "k"), StoredState::default());
    }

    #[test]
    fn test_partial_blob() {
        let env = MemoryEnvironment::default();
        env.set_stored(StorageScope::Local, "k", r#"{"page_size": 0}"#);
        let stored = read_storage(&env, StorageScope::Local, "k");
        assert_eq!(stored.page_size, None);
        assert!(stored.visibility.is_empty());
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let env = MemoryEnvironment::default();
        env.fail_storage_writes();
        write_storage(&env, StorageScope::Session, "k", &StoredState::default());
        assert_eq!(env.stored(StorageScope::Session, "k"), None);
    }
}
