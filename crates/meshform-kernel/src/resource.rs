//! Typed attribute store exchanged between host and data source.
//!
//! A [`ResourceData`] starts from the caller's configuration and collects
//! computed values as the read projects the remote record. Every `set` is
//! checked against the schema; a rejected assignment comes back as an
//! [`AttributeError`] for the data source to surface.

use crate::schema::{Schema, SchemaError};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// The host refused an attribute assignment.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct AttributeError(#[from] pub SchemaError);

/// Attribute store for one read.
#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Arc<Schema>,
    config: Map<String, Value>,
    state: Map<String, Value>,
    id: Option<String>,
}

impl ResourceData {
    pub fn new(schema: Arc<Schema>, config: Map<String, Value>) -> Self {
        Self {
            schema,
            config,
            state: Map::new(),
            id: None,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Current value: the computed one if set, otherwise the configured one.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.state
            .get(name)
            .or_else(|| self.config.get(name))
            .filter(|v| !v.is_null())
    }

    /// String value of `name`, or `""` when absent.
    pub fn get_string(&self, name: &str) -> String {
        self.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AttributeError> {
        let value = value.into();
        self.schema.check_value(name, &value)?;
        self.state.insert(name.to_string(), value);
        Ok(())
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.id = if id.is_empty() { None } else { Some(id) };
    }

    /// `None` means the object is not present.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Configuration merged with computed values, keyed by attribute name.
    ///
    /// Returns `None` while `id` is unset so an unfinished read leaks nothing.
    pub fn state(&self) -> Option<Map<String, Value>> {
        let id = self.id.as_ref()?;
        let mut merged = self.config.clone();
        merged.extend(self.state.clone());
        merged.insert("id".to_string(), Value::String(id.clone()));
        Some(merged)
    }
}
