//! Library catalog: filesystem index, snapshot queries and rescans.
//!
//! The index lives on a worker thread so scans never block the UI. Queries
//! apply the configured duration floor and a case-insensitive name sort.

mod model;
mod scan;
mod service;

pub use model::*;
pub use scan::{CatalogError, query, scan};
pub use service::{Catalog, CatalogEvent};

#[cfg(test)]
mod tests;
