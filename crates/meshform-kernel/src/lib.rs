//! Meshform Kernel - provider framework contracts
//!
//! The kernel owns every type a data source exchanges with its host:
//!
//! | Module | Contract |
//! |--------|----------|
//! | [`schema`] | Declarative attribute tree and the data-source rewrite |
//! | [`resource`] | Typed attribute store (`ResourceData`) |
//! | [`diag`] | Append-only diagnostics accumulator |
//! | [`context`] | Cancellation token, deadline and request id |
//! | [`appmesh`] | Upstream App Mesh client trait and record types |
//! | [`tags`] | Key/value tags and ignore filters |
//! | [`conns`] | Shared client container handed to every read |
//! | [`datasource`] | `DataSource` trait and the host-side runner |
//!
//! Concrete data sources live in `meshform-foundation`; SDK-backed clients
//! live in `meshform-integrations`.

pub mod appmesh;
pub mod conns;
pub mod context;
pub mod datasource;
pub mod diag;
pub mod logging;
pub mod resource;
pub mod schema;
pub mod tags;

#[cfg(feature = "config")]
pub mod config;
#[cfg(feature = "config")]
pub mod error;

pub use appmesh::{AppMeshApi, AppMeshError};
pub use conns::{AwsClient, ProviderConfig};
pub use context::ReadContext;
pub use datasource::{DataSource, ReadOutcome, read_data_source};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use resource::{AttributeError, ResourceData};
pub use schema::{Attribute, AttributeType, Schema, SchemaError};
pub use tags::{IgnoreTagsConfig, KeyValueTags};
