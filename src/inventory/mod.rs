//! Application inventory
//!
//! [`AppEnumerator`] turns the platform's listing command into candidates;
//! [`InventoryService`] resolves their icons concurrently and publishes the
//! result as an immutable [`Snapshot`].

pub mod enumerator;
pub mod service;

pub use enumerator::{AppEnumerator, parse_listing};
pub use service::{
    AppRecord, InventoryService, ScanReport, Snapshot, filter_records, order_records,
};
