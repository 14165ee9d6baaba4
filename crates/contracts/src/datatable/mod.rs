pub mod dto;
pub mod filter;

pub use dto::{ListMetadata, ListResponse};
pub use filter::{FilterExpr, FilterOperator, FilterParseError, FilterValue};
