//! Data module - CSV loading, merging and caching

mod cache;
mod loader;
mod records;

pub use cache::LoadCache;
pub use records::{MergedRecord, MergedTable, PO_DATE_FORMAT};
