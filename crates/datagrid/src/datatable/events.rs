use super::api::FetchError;

/// Notifications emitted by a list data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// State was re-read from the location after back/forward navigation
    StateRestored,
    /// State went back to its initial values
    StateReset,
    /// A fetch started
    DataRequested,
    /// Records were replaced by a successful fetch
    DataLoaded,
    /// The server answered 403
    Unauthorized,
    LoadFailed(FetchError),
}
