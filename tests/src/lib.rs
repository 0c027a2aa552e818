//! Meshform Testing Framework
//!
//! Provides a recording App Mesh client and record fixtures so data sources
//! can be exercised without live API calls.


pub use client::MockAppMeshClient;
pub use fixtures::VirtualServiceFixture;

use anyhow::{Context, Result};
use meshform_foundation::VirtualServiceDataSource;
use meshform_kernel::conns::AwsClient;
use meshform_kernel::context::ReadContext;
use meshform_kernel::datasource::{ReadOutcome, read_data_source};
use meshform_kernel::logging::{DEFAULT_DIRECTIVE, try_init_logging};
use meshform_kernel::tags::IgnoreTagsConfig;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Turn a `json!` object literal into data-source configuration.
pub fn config(value: Value) -> Result<Map<String, Value>> {
    value
        .as_object()
        .cloned()
        .context("data source configuration must be a JSON object")
}

/// Shared client container around `mock` for the given caller account.
pub fn aws_client(mock: &MockAppMeshClient, caller_account_id: &str) -> AwsClient {
    AwsClient::new(caller_account_id, fixtures::REGION, Arc::new(mock.clone()))
}

/// Run the Virtual Service data source end to end against `mock`.
pub async fn read_virtual_service(
    mock: &MockAppMeshClient,
    caller_account_id: &str,
    ignore_tags: IgnoreTagsConfig,
    input: Value,
) -> Result<ReadOutcome> {
    try_init_logging(DEFAULT_DIRECTIVE, false);
    let client = aws_client(mock, caller_account_id).with_ignore_tags_config(ignore_tags);
    let outcome = read_data_source(
        &VirtualServiceDataSource::new(),
        &ReadContext::new(),
        config(input)?,
        &client,
    )
    .await;
    tracing::debug!(diagnostics = outcome.diagnostics.len(), "virtual service read finished");
    Ok(outcome)
}

#[macro_export]
macro_rules! assert_list_tags_called {
    ($mock:expr, $expected_count:expr) => {
        let count = $mock.list_tags_count().await;
        assert_eq!(
            count, $expected_count,
            "Expected ListTagsForResource to be called {} times, but was called {} times",
            $expected_count, count
        );
    };
}
