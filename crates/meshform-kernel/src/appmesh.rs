//! App Mesh control-plane client contract
//!
//! Defines the two upstream operations a Virtual Service lookup needs and the
//! record types they return. The SDK-backed implementation lives in
//! `meshform-integrations`; tests substitute a recording mock.

use crate::context::ContextError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failure returned by an [`AppMeshApi`] call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AppMeshError {
    /// The requested resource does not exist.
    #[error("NotFoundException: {0}")]
    NotFound(String),

    /// The caller is not authorised for the operation.
    #[error("ForbiddenException: {0}")]
    Forbidden(String),

    /// Any other service or transport failure.
    #[error("{0}")]
    Service(String),

    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl AppMeshError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppMeshError::NotFound(_))
    }
}

impl From<ContextError> for AppMeshError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Cancelled => AppMeshError::Cancelled,
            ContextError::DeadlineExceeded => AppMeshError::DeadlineExceeded,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// Input of `DescribeVirtualService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeVirtualServiceInput {
    pub mesh_name: String,
    /// `None` lets the control plane resolve the calling account.
    pub mesh_owner: Option<String>,
    pub virtual_service_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMetadata {
    pub arn: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub mesh_owner: String,
    pub resource_owner: String,
    pub uid: String,
    pub version: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualServiceStatusCode {
    Active,
    Inactive,
    Deleted,
}

/// The target a virtual service routes to. Exactly one variant is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualServiceProvider {
    VirtualNode { virtual_node_name: String },
    VirtualRouter { virtual_router_name: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualServiceSpec {
    pub provider: Option<VirtualServiceProvider>,
}

/// A virtual service as returned by `DescribeVirtualService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualServiceData {
    pub mesh_name: String,
    pub virtual_service_name: String,
    pub spec: Option<VirtualServiceSpec>,
    pub metadata: ResourceMetadata,
    pub status: VirtualServiceStatusCode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client trait
// ─────────────────────────────────────────────────────────────────────────────

/// The App Mesh operations consumed by the data source.
///
/// Implementations own retry and pagination; callers add neither.
#[async_trait]
pub trait AppMeshApi: Send + Sync {
    /// Returns `Ok(None)` when the service answered without a record.
    async fn describe_virtual_service(
        &self,
        input: DescribeVirtualServiceInput,
    ) -> Result<Option<VirtualServiceData>, AppMeshError>;

    /// Every tag attached to `resource_arn`.
    async fn list_tags_for_resource(&self, resource_arn: &str) -> Result<Vec<Tag>, AppMeshError>;
}
