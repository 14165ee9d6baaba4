//! Wire types shared between list endpoints and the datagrid frontend.

pub mod datatable;
