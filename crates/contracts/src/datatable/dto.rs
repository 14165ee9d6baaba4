use serde::{Deserialize, Serialize};

/// Pagination summary returned by a list endpoint alongside one page of records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMetadata {
    /// Page the result belongs to (1-based)
    pub page: u32,
    pub pages_total: u32,
    pub number_of_objects: u64,
    /// `true` when there is at least one more page after this one
    #[serde(default)]
    pub next: bool,
    /// The server stopped counting; `number_of_objects` is a lower bound
    #[serde(default)]
    pub limited_number_of_objects: bool,
    /// `number_of_objects` is an estimate
    #[serde(default)]
    pub approximated_number_of_objects: bool,
}

impl ListMetadata {
    /// Whether the current page is before the last one
    pub fn has_later_pages(&self) -> bool {
        self.page < self.pages_total
    }
}

/// Response body of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub metadata: ListMetadata,
    pub result: Vec<T>,
}
