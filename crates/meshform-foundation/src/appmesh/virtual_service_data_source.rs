//! `aws_appmesh_virtual_service` data source.
//!
//! Looks up one virtual service by mesh name, optional mesh owner and name,
//! projects it into flat attributes and, when the caller owns the mesh,
//! attaches its tags.

use super::virtual_service::{
    NAME_LENGTH, find_virtual_service_by_three_part_key, flatten_virtual_service_spec,
    virtual_service_spec_schema,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use meshform_kernel::appmesh::{AppMeshApi, AppMeshError, VirtualServiceData};
use meshform_kernel::conns::AwsClient;
use meshform_kernel::context::ReadContext;
use meshform_kernel::datasource::DataSource;
use meshform_kernel::diag::Diagnostics;
use meshform_kernel::resource::{AttributeError, ResourceData};
use meshform_kernel::schema::{Attribute, Schema, data_source_attribute};
use meshform_kernel::tags::KeyValueTags;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

pub const TYPE_NAME: &str = "aws_appmesh_virtual_service";

/// A rejected attribute assignment during projection.
#[derive(Debug, Error)]
#[error("setting {attribute}: {source}")]
pub struct ProjectionError {
    pub attribute: &'static str,
    #[source]
    pub source: AttributeError,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualServiceDataSource;

impl VirtualServiceDataSource {
    pub fn new() -> Self {
        Self
    }
}

/// Declared attributes of the data source.
pub fn data_source_schema() -> Schema {
    Schema::new()
        .with_attribute("arn", Attribute::computed_string())
        .with_attribute("created_date", Attribute::computed_string())
        .with_attribute("last_updated_date", Attribute::computed_string())
        .with_attribute(
            "mesh_name",
            Attribute::required_string().with_validation(NAME_LENGTH),
        )
        .with_attribute("mesh_owner", Attribute::optional_computed_string())
        .with_attribute(
            "name",
            Attribute::required_string().with_validation(NAME_LENGTH),
        )
        .with_attribute("resource_owner", Attribute::computed_string())
        .with_attribute("spec", data_source_attribute(&virtual_service_spec_schema()))
        .with_attribute("tags", Attribute::computed_string_map())
}

/// Tags are only listable from the account that created the mesh; consumers
/// of a shared mesh get an authorisation error.
pub fn may_read_tags(caller_account_id: &str, mesh_owner: &str) -> bool {
    caller_account_id == mesh_owner
}

/// RFC 3339, whole seconds, numeric offset.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn set_attribute(
    d: &mut ResourceData,
    attribute: &'static str,
    value: impl Into<Value>,
) -> Result<(), ProjectionError> {
    d.set(attribute, value)
        .map_err(|source| ProjectionError { attribute, source })
}

/// Write every computed attribute except `tags`.
fn project(d: &mut ResourceData, vs: &VirtualServiceData) -> Result<(), ProjectionError> {
    let metadata = &vs.metadata;

    set_attribute(d, "arn", metadata.arn.as_str())?;
    set_attribute(d, "created_date", format_timestamp(&metadata.created_at))?;
    set_attribute(d, "last_updated_date", format_timestamp(&metadata.last_updated_at))?;
    set_attribute(d, "mesh_name", vs.mesh_name.as_str())?;
    set_attribute(d, "mesh_owner", metadata.mesh_owner.as_str())?;
    set_attribute(d, "name", vs.virtual_service_name.as_str())?;
    set_attribute(d, "resource_owner", metadata.resource_owner.as_str())?;
    set_attribute(d, "spec", flatten_virtual_service_spec(vs.spec.as_ref()))?;

    Ok(())
}

async fn list_tags(
    ctx: &ReadContext,
    conn: &dyn AppMeshApi,
    arn: &str,
) -> Result<KeyValueTags, AppMeshError> {
    let tags = ctx.run(conn.list_tags_for_resource(arn)).await?;
    Ok(KeyValueTags::from(tags))
}

fn tags_value(tags: BTreeMap<String, String>) -> Value {
    Value::Object(
        tags.into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect(),
    )
}

#[async_trait]
impl DataSource for VirtualServiceDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        data_source_schema()
    }

    async fn read(
        &self,
        ctx: &ReadContext,
        d: &mut ResourceData,
        client: &AwsClient,
    ) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let conn = client.appmesh_client(ctx);
        let ignore_tags_config = client.ignore_tags_config();

        let virtual_service_name = d.get_string("name");
        let mesh_name = d.get_string("mesh_name");
        let mesh_owner = d.get_string("mesh_owner");

        debug!(
            request_id = %ctx.request_id(),
            mesh_name = %mesh_name,
            mesh_owner = %mesh_owner,
            name = %virtual_service_name,
            "reading App Mesh Virtual Service"
        );

        let vs = match find_virtual_service_by_three_part_key(
            ctx,
            conn.as_ref(),
            &mesh_name,
            &mesh_owner,
            &virtual_service_name,
        )
        .await
        {
            Ok(vs) => vs,
            Err(err) => {
                diags.append_error(format_args!(
                    "reading App Mesh Virtual Service ({virtual_service_name}): {err}"
                ));
                return diags;
            }
        };

        d.set_id(vs.virtual_service_name.as_str());
        if let Err(err) = project(d, &vs) {
            diags.append_error(err);
            return diags;
        }

        let arn = vs.metadata.arn.as_str();
        let mesh_owner = vs.metadata.mesh_owner.as_str();

        let tags = if may_read_tags(client.account_id(), mesh_owner) {
            match list_tags(ctx, conn.as_ref(), arn).await {
                Ok(tags) => tags,
                Err(err) => {
                    diags.append_error(format_args!(
                        "listing tags for App Mesh Virtual Service ({arn}): {err}"
                    ));
                    return diags;
                }
            }
        } else {
            debug!(
                request_id = %ctx.request_id(),
                arn = %arn,
                mesh_owner = %mesh_owner,
                "mesh is shared with this account, skipping tag listing"
            );
            KeyValueTags::new()
        };

        let tags = tags.ignore_aws().ignore_config(ignore_tags_config).map();
        if let Err(err) = d.set("tags", tags_value(tags)) {
            diags.append_error(format_args!("setting tags: {err}"));
        }

        diags
    }
}
