pub mod memory;
pub mod models;
pub mod query;
pub mod rest;
pub mod store;

pub use memory::MemoryStore;
pub use query::{FilterOp, Query, SortDirection};
pub use rest::RestStore;
pub use store::{from_row, from_rows, to_row, DataStore, Row, StoreError, StoreResult};
