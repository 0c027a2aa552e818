//! AWS App Mesh control-plane adapter
//!
//! Implements the kernel `AppMeshApi` trait backed by the official
//! `aws-sdk-appmesh` crate. Setting `endpoint_url` on the provider config
//! points the client at LocalStack or any compatible endpoint.
//!
//! # Authentication
//!
//! Credentials are resolved in the standard AWS order:
//! environment variables → shared credentials file → IAM instance profile.
//! The account id is taken from the provider config, not from the
//! credentials.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_appmesh::Client;
use aws_sdk_appmesh::config::Builder as AppMeshBuilder;
use aws_sdk_appmesh::config::Region;
use aws_sdk_appmesh::error::DisplayErrorContext;
use aws_sdk_appmesh::operation::describe_virtual_service::DescribeVirtualServiceError;
use aws_sdk_appmesh::operation::list_tags_for_resource::ListTagsForResourceError;
use aws_sdk_appmesh::primitives::DateTime as SdkDateTime;
use aws_sdk_appmesh::types as sdk;
use chrono::{DateTime, Utc};
use error_stack::{Report, ResultExt};
use meshform_kernel::appmesh::{
    AppMeshApi, AppMeshError, DescribeVirtualServiceInput, ResourceMetadata, Tag,
    VirtualServiceData, VirtualServiceProvider, VirtualServiceSpec, VirtualServiceStatusCode,
};
use meshform_kernel::config::validate_provider_config;
use meshform_kernel::conns::{AwsClient, ProviderConfig};
use meshform_kernel::error::{KernelError, KernelResult};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// `AppMeshApi` backed by AWS App Mesh (or a compatible endpoint).
#[derive(Debug, Clone)]
pub struct SdkAppMeshClient {
    client: Client,
}

impl SdkAppMeshClient {
    /// Build the client from a [`ProviderConfig`], loading AWS credentials
    /// from the environment using the standard AWS SDK credential chain.
    pub async fn new(config: &ProviderConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = AppMeshBuilder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Self::from_client(Client::from_conf(builder.build()))
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

/// Validate `config` and build the shared client container around an
/// SDK-backed App Mesh client.
pub async fn connect(config: &ProviderConfig) -> KernelResult<AwsClient> {
    validate_provider_config(config)
        .map_err(KernelError::from)
        .map_err(Report::new)
        .attach("building the App Mesh client")?;

    let appmesh = SdkAppMeshClient::new(config).await;
    tracing::info!(
        region = %config.region,
        account_id = %config.account_id,
        endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
        "App Mesh client ready"
    );

    Ok(AwsClient::from_config(config, Arc::new(appmesh)))
}

#[async_trait]
impl AppMeshApi for SdkAppMeshClient {
    async fn describe_virtual_service(
        &self,
        input: DescribeVirtualServiceInput,
    ) -> Result<Option<VirtualServiceData>, AppMeshError> {
        let result = self
            .client
            .describe_virtual_service()
            .mesh_name(&input.mesh_name)
            .set_mesh_owner(input.mesh_owner.clone())
            .virtual_service_name(&input.virtual_service_name)
            .send()
            .await;

        match result {
            Ok(output) => output
                .virtual_service()
                .map(virtual_service_from_sdk)
                .transpose(),
            Err(sdk_err) => Err(describe_error(sdk_err.into_service_error())),
        }
    }

    async fn list_tags_for_resource(&self, resource_arn: &str) -> Result<Vec<Tag>, AppMeshError> {
        let mut tags = Vec::new();
        let mut next_token = None;

        loop {
            let output = self
                .client
                .list_tags_for_resource()
                .resource_arn(resource_arn)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| list_tags_error(e.into_service_error()))?;

            tags.extend(output.tags().iter().map(|t| Tag::new(t.key(), t.value())));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(tags)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

fn describe_error(err: DescribeVirtualServiceError) -> AppMeshError {
    let message = DisplayErrorContext(&err).to_string();
    if err.is_not_found_exception() {
        AppMeshError::NotFound(message)
    } else if err.is_forbidden_exception() {
        AppMeshError::Forbidden(message)
    } else {
        AppMeshError::Service(message)
    }
}

fn list_tags_error(err: ListTagsForResourceError) -> AppMeshError {
    let message = DisplayErrorContext(&err).to_string();
    if err.is_not_found_exception() {
        AppMeshError::NotFound(message)
    } else if err.is_forbidden_exception() {
        AppMeshError::Forbidden(message)
    } else {
        AppMeshError::Service(message)
    }
}

fn timestamp_from_sdk(at: &SdkDateTime) -> Result<DateTime<Utc>, AppMeshError> {
    DateTime::from_timestamp(at.secs(), at.subsec_nanos())
        .ok_or_else(|| AppMeshError::Service(format!("timestamp out of range: {at:?}")))
}

fn status_from_sdk(status: Option<&sdk::VirtualServiceStatus>) -> VirtualServiceStatusCode {
    match status.map(|s| s.status()) {
        Some(sdk::VirtualServiceStatusCode::Deleted) => VirtualServiceStatusCode::Deleted,
        Some(sdk::VirtualServiceStatusCode::Inactive) => VirtualServiceStatusCode::Inactive,
        _ => VirtualServiceStatusCode::Active,
    }
}

fn spec_from_sdk(spec: &sdk::VirtualServiceSpec) -> VirtualServiceSpec {
    let provider = match spec.provider() {
        Some(sdk::VirtualServiceProvider::VirtualNode(node)) => {
            Some(VirtualServiceProvider::VirtualNode {
                virtual_node_name: node.virtual_node_name().to_string(),
            })
        }
        Some(sdk::VirtualServiceProvider::VirtualRouter(router)) => {
            Some(VirtualServiceProvider::VirtualRouter {
                virtual_router_name: router.virtual_router_name().to_string(),
            })
        }
        Some(other) => {
            tracing::warn!(provider = ?other, "ignoring unknown virtual service provider");
            None
        }
        None => None,
    };

    VirtualServiceSpec { provider }
}

fn virtual_service_from_sdk(vs: &sdk::VirtualServiceData) -> Result<VirtualServiceData, AppMeshError> {
    let metadata = vs.metadata().ok_or_else(|| {
        AppMeshError::Service(format!(
            "virtual service {} returned without metadata",
            vs.virtual_service_name()
        ))
    })?;

    Ok(VirtualServiceData {
        mesh_name: vs.mesh_name().to_string(),
        virtual_service_name: vs.virtual_service_name().to_string(),
        spec: vs.spec().map(spec_from_sdk),
        metadata: ResourceMetadata {
            arn: metadata.arn().to_string(),
            created_at: timestamp_from_sdk(metadata.created_at())?,
            last_updated_at: timestamp_from_sdk(metadata.last_updated_at())?,
            mesh_owner: metadata.mesh_owner().to_string(),
            resource_owner: metadata.resource_owner().to_string(),
            uid: metadata.uid().to_string(),
            version: metadata.version(),
        },
        status: status_from_sdk(vs.status()),
    })
}
