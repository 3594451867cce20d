//! `cyberday-catalog` — product catalog records and the read-only store
//! adapter boundary.
//!
//! The catalog is owned and mutated by the upstream load stage; this core
//! only ever takes consistent snapshots of it.

pub mod product;
pub mod store;

pub use product::Product;
pub use store::{CatalogStore, InMemoryCatalogStore};
