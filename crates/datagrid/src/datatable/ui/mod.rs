//! View models of the table widgets. They hold no state of their own beyond
//! configuration: everything is read from, or written to, a `ListDataSource`.

pub mod columns;
pub mod counter;
pub mod paginator;
pub mod query_builder;
pub mod simple_query;
