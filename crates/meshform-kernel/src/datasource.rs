//! Data-source contract and the host-side read runner.

use crate::conns::AwsClient;
use crate::context::ReadContext;
use crate::diag::Diagnostics;
use crate::resource::ResourceData;
use crate::schema::Schema;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A read-only lookup exposed to the host framework.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Registry key, e.g. `aws_appmesh_virtual_service`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Populate `data` from the remote record.
    ///
    /// Failures are appended to the returned diagnostics; an unset id after
    /// return means the object was not found.
    async fn read(
        &self,
        ctx: &ReadContext,
        data: &mut ResourceData,
        client: &AwsClient,
    ) -> Diagnostics;
}

/// Static description used to register a data source with the host.
#[derive(Clone, Copy)]
pub struct DataSourceRegistration {
    pub type_name: &'static str,
    /// Human-readable name used in messages.
    pub name: &'static str,
    pub factory: fn() -> Box<dyn DataSource>,
}

impl std::fmt::Debug for DataSourceRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSourceRegistration")
            .field("type_name", &self.type_name)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What the host receives from one read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOutcome {
    /// Populated whenever the read set an id.
    pub state: Option<Map<String, Value>>,
    pub diagnostics: Diagnostics,
}

impl ReadOutcome {
    pub fn is_success(&self) -> bool {
        self.state.is_some() && !self.diagnostics.has_error()
    }
}

/// Validate `config`, run the read, and package the result.
pub async fn read_data_source(
    data_source: &dyn DataSource,
    ctx: &ReadContext,
    config: Map<String, Value>,
    client: &AwsClient,
) -> ReadOutcome {
    let schema = Arc::new(data_source.schema());
    let mut diagnostics = Diagnostics::new();

    if let Err(errors) = schema.validate_config(&config) {
        for err in errors {
            diagnostics.append_error(err);
        }
        return ReadOutcome {
            state: None,
            diagnostics,
        };
    }

    let mut data = ResourceData::new(schema, config);
    diagnostics.extend(data_source.read(ctx, &mut data, client).await);

    if data.id().is_none() && !diagnostics.has_error() {
        diagnostics.append_error(format_args!(
            "{}: read completed without setting an id",
            data_source.type_name()
        ));
    }

    ReadOutcome {
        state: data.state(),
        diagnostics,
    }
}
