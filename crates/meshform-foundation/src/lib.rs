//! Meshform Foundation - concrete data sources
//!
//! Each service lives in its own module and exposes a `data_sources()`
//! registration list for the host.

// appmesh module - Virtual Service lookup
pub mod appmesh;

pub use appmesh::VirtualServiceDataSource;
