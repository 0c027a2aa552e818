//! Shared client container handed to every data-source read.
//!
//! Built once per provider configuration and shared behind an `Arc`; reads
//! only borrow from it.

use crate::appmesh::AppMeshApi;
use crate::context::ReadContext;
use crate::tags::IgnoreTagsConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Provider-level settings, usually loaded with [`crate::config`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// AWS region (e.g. `"us-west-2"`)
    pub region: String,
    /// Account the process authenticates as.
    pub account_id: String,
    /// Custom App Mesh endpoint (LocalStack and similar).
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub ignore_tags: IgnoreTagsConfig,
}

impl ProviderConfig {
    pub fn new(region: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            account_id: account_id.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn with_ignore_tags(mut self, ignore_tags: IgnoreTagsConfig) -> Self {
        self.ignore_tags = ignore_tags;
        self
    }
}

/// Clients and caller identity shared by all reads.
#[derive(Clone)]
pub struct AwsClient {
    account_id: String,
    region: String,
    ignore_tags_config: IgnoreTagsConfig,
    appmesh: Arc<dyn AppMeshApi>,
}

impl AwsClient {
    pub fn new(
        account_id: impl Into<String>,
        region: impl Into<String>,
        appmesh: Arc<dyn AppMeshApi>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
            ignore_tags_config: IgnoreTagsConfig::default(),
            appmesh,
        }
    }

    pub fn from_config(config: &ProviderConfig, appmesh: Arc<dyn AppMeshApi>) -> Self {
        Self::new(config.account_id.clone(), config.region.clone(), appmesh)
            .with_ignore_tags_config(config.ignore_tags.clone())
    }

    pub fn with_ignore_tags_config(mut self, config: IgnoreTagsConfig) -> Self {
        self.ignore_tags_config = config;
        self
    }

    pub fn appmesh_client(&self, ctx: &ReadContext) -> Arc<dyn AppMeshApi> {
        tracing::trace!(
            request_id = %ctx.request_id(),
            region = %self.region,
            "using App Mesh client"
        );
        Arc::clone(&self.appmesh)
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn ignore_tags_config(&self) -> &IgnoreTagsConfig {
        &self.ignore_tags_config
    }
}

impl fmt::Debug for AwsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsClient")
            .field("account_id", &self.account_id)
            .field("region", &self.region)
            .field("ignore_tags_config", &self.ignore_tags_config)
            .finish_non_exhaustive()
    }
}
