//! App Mesh service package.

pub mod virtual_service;
pub mod virtual_service_data_source;

pub use virtual_service::{
    FindError, find_virtual_service_by_three_part_key, flatten_virtual_service_spec,
    virtual_service_spec_schema,
};
pub use virtual_service_data_source::{
    ProjectionError, TYPE_NAME as VIRTUAL_SERVICE_TYPE_NAME, VirtualServiceDataSource,
    data_source_schema as virtual_service_data_source_schema, may_read_tags,
};

use meshform_kernel::datasource::{DataSource, DataSourceRegistration};

fn new_virtual_service_data_source() -> Box<dyn DataSource> {
    Box::new(VirtualServiceDataSource::new())
}

/// Data sources contributed by this package.
pub fn data_sources() -> Vec<DataSourceRegistration> {
    vec![DataSourceRegistration {
        type_name: VIRTUAL_SERVICE_TYPE_NAME,
        name: "Virtual Service",
        factory: new_virtual_service_data_source,
    }]
}
