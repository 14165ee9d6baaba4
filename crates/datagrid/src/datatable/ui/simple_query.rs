use std::cell::Cell;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::datatable::source::ListDataSource;

pub const DEFAULT_FIELD: &str = "q";
/// Input debounce before the query is applied
pub const DEBOUNCE_MS: u64 = 300;
pub const MAX_LENGTH: usize = 50;

/// Free-text search box bound to one filter field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleQuery {
    pub field_name: String,
    /// Bumped on every keystroke; a pending apply only runs if still current
    generation: Cell<u64>,
}

impl Default for SimpleQuery {
    fn default() -> Self {
        Self::new(DEFAULT_FIELD)
    }
}

impl SimpleQuery {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            generation: Cell::new(0),
        }
    }

    /// Filters for the typed text, cut to `MAX_LENGTH` characters
    pub fn query_params(&self, text: &str) -> BTreeMap<String, String> {
        let text: String = text.chars().take(MAX_LENGTH).collect();
        BTreeMap::from([(self.field_name.clone(), text)])
    }

    /// Text to show for the current filters
    pub fn value_from_filters(&self, filters: &BTreeMap<String, String>) -> String {
        filters.get(&self.field_name).cloned().unwrap_or_default()
    }

    pub async fn apply_to_source<T>(&self, source: &ListDataSource<T>, text: &str) -> bool {
        source.set_filters(self.query_params(text)).await
    }

    /// Applies `text` after `DEBOUNCE_MS` of quiet. Returns `false` without
    /// touching the source when a later keystroke superseded this one.
    pub async fn apply_debounced<T>(&self, source: &ListDataSource<T>, text: &str) -> bool {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);

        source
            .environment()
            .sleep(Duration::from_millis(DEBOUNCE_MS))
            .await;
        if self.generation.get() != generation {
            log::debug!("search {:?} superseded", text);
            return false;
        }
        self.apply_to_source(source, text).await
    }
}
