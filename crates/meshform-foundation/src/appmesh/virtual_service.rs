//! Virtual Service pieces shared by every App Mesh Virtual Service surface:
//! the write-side `spec` schema, lookup by three-part key, and the spec
//! flattener.

use meshform_kernel::appmesh::{
    AppMeshApi, AppMeshError, DescribeVirtualServiceInput, VirtualServiceData,
    VirtualServiceProvider, VirtualServiceSpec, VirtualServiceStatusCode,
};
use meshform_kernel::context::ReadContext;
use meshform_kernel::schema::{Attribute, Schema, Validation};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// App Mesh object names are 1 to 255 characters.
pub const NAME_LENGTH: Validation = Validation::StringLenBetween(1, 255);

// ─────────────────────────────────────────────────────────────────────────────
// Schema
// ─────────────────────────────────────────────────────────────────────────────

/// The `spec` block as configured on a Virtual Service.
///
/// Exactly one provider variant may be configured.
pub fn virtual_service_spec_schema() -> Attribute {
    let virtual_node = Schema::new().with_attribute(
        "virtual_node_name",
        Attribute::required_string().with_validation(NAME_LENGTH),
    );
    let virtual_router = Schema::new().with_attribute(
        "virtual_router_name",
        Attribute::required_string().with_validation(NAME_LENGTH),
    );

    let provider = Schema::new()
        .with_attribute(
            "virtual_node",
            Attribute::block_list(virtual_node)
                .optional()
                .with_max_items(1)
                .conflicts_with("spec.0.provider.0.virtual_router"),
        )
        .with_attribute(
            "virtual_router",
            Attribute::block_list(virtual_router)
                .optional()
                .with_max_items(1)
                .conflicts_with("spec.0.provider.0.virtual_node"),
        );

    Attribute::block_list(Schema::new().with_attribute(
        "provider",
        Attribute::block_list(provider).optional().with_max_items(1),
    ))
    .required()
    .with_min_items(1)
    .with_max_items(1)
}

// ─────────────────────────────────────────────────────────────────────────────
// Finder
// ─────────────────────────────────────────────────────────────────────────────

/// Lookup failure. The first three variants all mean "not found".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum FindError {
    /// The control plane reported that the virtual service does not exist.
    #[error("couldn't find resource")]
    NotFound(#[source] AppMeshError),

    /// The record still exists but has been deleted.
    #[error("couldn't find resource: status DELETED")]
    Deleted,

    /// The call succeeded without returning a record.
    #[error("empty result")]
    EmptyResult,

    /// Any other upstream failure, including cancellation.
    #[error(transparent)]
    Upstream(AppMeshError),
}

impl FindError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FindError::NotFound(_) | FindError::Deleted | FindError::EmptyResult
        )
    }
}

impl From<AppMeshError> for FindError {
    fn from(err: AppMeshError) -> Self {
        if err.is_not_found() {
            FindError::NotFound(err)
        } else {
            FindError::Upstream(err)
        }
    }
}

/// Describe the virtual service identified by mesh, mesh owner and name.
///
/// An empty `mesh_owner` is sent as absent so the control plane resolves
/// the calling account.
pub async fn find_virtual_service_by_three_part_key(
    ctx: &ReadContext,
    conn: &dyn AppMeshApi,
    mesh_name: &str,
    mesh_owner: &str,
    name: &str,
) -> Result<VirtualServiceData, FindError> {
    let input = DescribeVirtualServiceInput {
        mesh_name: mesh_name.to_string(),
        mesh_owner: (!mesh_owner.is_empty()).then(|| mesh_owner.to_string()),
        virtual_service_name: name.to_string(),
    };

    let virtual_service = ctx
        .run(conn.describe_virtual_service(input))
        .await?
        .ok_or(FindError::EmptyResult)?;

    if virtual_service.status == VirtualServiceStatusCode::Deleted {
        return Err(FindError::Deleted);
    }

    Ok(virtual_service)
}

// ─────────────────────────────────────────────────────────────────────────────
// Flattener
// ─────────────────────────────────────────────────────────────────────────────

/// Flatten a spec into the single-item block list the schema expects.
///
/// Only the populated provider variant is emitted.
pub fn flatten_virtual_service_spec(spec: Option<&VirtualServiceSpec>) -> Value {
    let Some(spec) = spec else {
        return Value::Array(Vec::new());
    };

    let mut m_spec = Map::new();

    if let Some(provider) = &spec.provider {
        let m_provider = match provider {
            VirtualServiceProvider::VirtualNode { virtual_node_name } => json!({
                "virtual_node": [{ "virtual_node_name": virtual_node_name }],
            }),
            VirtualServiceProvider::VirtualRouter {
                virtual_router_name,
            } => json!({
                "virtual_router": [{ "virtual_router_name": virtual_router_name }],
            }),
        };
        m_spec.insert("provider".to_string(), Value::Array(vec![m_provider]));
    }

    Value::Array(vec![Value::Object(m_spec)])
}
