//! Remote read of one page from a list endpoint.

use async_trait::async_trait;
use contracts::datatable::ListResponse;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Network(String),
    #[error("failed to parse response: {0}")]
    Decode(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Status(403))
    }
}

/// GET request for one page: endpoint, headers and query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
}

impl ListRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait(?Send)]
pub trait ListTransport<T> {
    async fn fetch(&self, request: &ListRequest) -> Result<ListResponse<T>, FetchError>;
}

#[cfg(target_arch = "wasm32")]
pub use gloo::GlooTransport;

#[cfg(target_arch = "wasm32")]
mod gloo {
    use super::{FetchError, ListRequest, ListTransport};
    use async_trait::async_trait;
    use contracts::datatable::ListResponse;
    use gloo_net::http::Request;
    use serde::de::DeserializeOwned;
    use std::marker::PhantomData;

    /// Browser `fetch` transport
    pub struct GlooTransport<T> {
        _records: PhantomData<fn() -> T>,
    }

    impl<T> GlooTransport<T> {
        pub fn new() -> Self {
            Self {
                _records: PhantomData,
            }
        }
    }

    impl<T> Default for GlooTransport<T> {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait(?Send)]
    impl<T: DeserializeOwned + 'static> ListTransport<T> for GlooTransport<T> {
        async fn fetch(&self, request: &ListRequest) -> Result<ListResponse<T>, FetchError> {
            let mut builder = Request::get(&request.endpoint)
                .query(request.params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .header("Accept", "application/json");
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            if !response.ok() {
                return Err(FetchError::Status(response.status()));
            }

            response
                .json::<ListResponse<T>>()
                .await
                .map_err(|e| FetchError::Decode(e.to_string()))
        }
    }
}
