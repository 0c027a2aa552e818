//! Declarative attribute schema.
//!
//! A [`Schema`] is a tree: each named [`Attribute`] is a string, a map of
//! strings, or a list of nested blocks that carries its own [`Schema`].
//! Roles (`required`, `optional`, `computed`) and item bounds live on the
//! attribute, so deriving a read-only view of a write-side schema is a plain
//! recursive rewrite ([`data_source_attribute`]).
//!
//! ```rust
//! use meshform_kernel::schema::{Attribute, Schema};
//!
//! let schema = Schema::new()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("arn", Attribute::computed_string());
//!
//! assert!(schema.attribute("name").unwrap().required);
//! ```

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Structural or validation failure detected against a [`Schema`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    /// The attribute path is not declared by the schema.
    #[error("unsupported attribute \"{0}\"")]
    UnknownAttribute(String),

    /// A required argument was absent or null.
    #[error("missing required argument \"{0}\"")]
    MissingRequired(String),

    /// The caller supplied a value for an attribute that is computed only.
    #[error("\"{0}\": this attribute is computed and cannot be configured")]
    ComputedOnly(String),

    /// The value has the wrong shape for the declared type.
    #[error("{path}: expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
    },

    /// A block list holds more items than `max_items` allows.
    #[error("{path}: attribute supports {max} item maximum, but got {actual}")]
    TooManyItems {
        path: String,
        max: usize,
        actual: usize,
    },

    /// A value failed its attribute's [`Validation`].
    #[error("{path}: {message}")]
    Invalid { path: String, message: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Attribute
// ─────────────────────────────────────────────────────────────────────────────

/// Value-level validation applied to configured strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Character length within `min..=max`.
    StringLenBetween(usize, usize),
}

impl Validation {
    fn check(&self, value: &str) -> Result<(), String> {
        match *self {
            Validation::StringLenBetween(min, max) => {
                let len = value.chars().count();
                if len < min || len > max {
                    return Err(format!(
                        "expected length to be in the range ({min} - {max}), got {len}"
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Semantic type of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    /// Mapping from string to string.
    StringMap,
    /// Ordered list of nested blocks, each shaped by the inner schema.
    Block(Schema),
}

/// One named entry of a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub ty: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Lower bound on block items; `0` means no bound.
    pub min_items: usize,
    /// Upper bound on block items; `0` means no bound.
    pub max_items: usize,
    /// Attribute paths that may not be set together with this one.
    pub conflicts_with: Vec<String>,
    pub validation: Option<Validation>,
}

impl Attribute {
    /// Create an attribute of the given type with no role flags set.
    pub fn new(ty: AttributeType) -> Self {
        Self {
            ty,
            required: false,
            optional: false,
            computed: false,
            min_items: 0,
            max_items: 0,
            conflicts_with: Vec::new(),
            validation: None,
        }
    }

    pub fn required_string() -> Self {
        Self::new(AttributeType::String).required()
    }

    /// Accepted on input and written back from the remote record.
    pub fn optional_computed_string() -> Self {
        Self::new(AttributeType::String).optional().computed()
    }

    pub fn computed_string() -> Self {
        Self::new(AttributeType::String).computed()
    }

    pub fn computed_string_map() -> Self {
        Self::new(AttributeType::StringMap).computed()
    }

    /// A list of nested blocks. Chain a role modifier to make it usable.
    pub fn block_list(schema: Schema) -> Self {
        Self::new(AttributeType::Block(schema))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn with_min_items(mut self, min: usize) -> Self {
        self.min_items = min;
        self
    }

    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = max;
        self
    }

    pub fn conflicts_with(mut self, path: impl Into<String>) -> Self {
        self.conflicts_with.push(path.into());
        self
    }

    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = Some(validation);
        self
    }

    /// `true` when the caller can never supply a value.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    /// Nested schema for block attributes.
    pub fn nested(&self) -> Option<&Schema> {
        match &self.ty {
            AttributeType::Block(schema) => Some(schema),
            _ => None,
        }
    }
}

/// Rewrite a write-side attribute into its read-only data-source form.
///
/// Every level of the tree becomes computed only: role flags, item bounds,
/// conflicts and validations are cleared.
pub fn data_source_attribute(attr: &Attribute) -> Attribute {
    let ty = match &attr.ty {
        AttributeType::Block(nested) => AttributeType::Block(nested.to_data_source()),
        other => other.clone(),
    };

    Attribute::new(ty).computed()
}

// ─────────────────────────────────────────────────────────────────────────────
// Schema
// ─────────────────────────────────────────────────────────────────────────────

/// Named attributes of a resource, data source or nested block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The read-only view of this schema, see [`data_source_attribute`].
    pub fn to_data_source(&self) -> Schema {
        Schema {
            attributes: self
                .attributes
                .iter()
                .map(|(name, attr)| (name.clone(), data_source_attribute(attr)))
                .collect(),
        }
    }

    /// Check caller-supplied configuration against the top-level roles.
    ///
    /// All problems are collected rather than stopping at the first.
    pub fn validate_config(&self, config: &Map<String, Value>) -> Result<(), Vec<SchemaError>> {
        let mut errors = Vec::new();

        for (name, value) in config {
            let Some(attr) = self.attributes.get(name) else {
                errors.push(SchemaError::UnknownAttribute(name.clone()));
                continue;
            };
            if value.is_null() {
                continue;
            }
            if attr.is_computed_only() {
                errors.push(SchemaError::ComputedOnly(name.clone()));
                continue;
            }
            if let Err(e) = check_attribute(name, attr, value, true) {
                errors.push(e);
            }
        }

        for (name, attr) in &self.attributes {
            if attr.required && config.get(name).is_none_or(Value::is_null) {
                errors.push(SchemaError::MissingRequired(name.clone()));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Structural conformance of a value assigned to `name`.
    ///
    /// Validations are not applied here; they only guard configuration.
    pub fn check_value(&self, name: &str, value: &Value) -> Result<(), SchemaError> {
        let attr = self
            .attributes
            .get(name)
            .ok_or_else(|| SchemaError::UnknownAttribute(name.to_string()))?;
        check_attribute(name, attr, value, false)
    }
}

fn check_attribute(
    path: &str,
    attr: &Attribute,
    value: &Value,
    validate: bool,
) -> Result<(), SchemaError> {
    if value.is_null() {
        return Ok(());
    }

    match &attr.ty {
        AttributeType::String => {
            let s = value.as_str().ok_or_else(|| SchemaError::TypeMismatch {
                path: path.to_string(),
                expected: "string",
            })?;
            if validate {
                if let Some(validation) = &attr.validation {
                    validation.check(s).map_err(|message| SchemaError::Invalid {
                        path: path.to_string(),
                        message,
                    })?;
                }
            }
        }
        AttributeType::StringMap => {
            let map = value.as_object().ok_or_else(|| SchemaError::TypeMismatch {
                path: path.to_string(),
                expected: "map of string",
            })?;
            if let Some((key, _)) = map.iter().find(|(_, v)| !v.is_string()) {
                return Err(SchemaError::TypeMismatch {
                    path: format!("{path}.{key}"),
                    expected: "string",
                });
            }
        }
        AttributeType::Block(nested) => {
            let items = value.as_array().ok_or_else(|| SchemaError::TypeMismatch {
                path: path.to_string(),
                expected: "list of blocks",
            })?;
            if attr.max_items > 0 && items.len() > attr.max_items {
                return Err(SchemaError::TooManyItems {
                    path: path.to_string(),
                    max: attr.max_items,
                    actual: items.len(),
                });
            }
            for (i, item) in items.iter().enumerate() {
                let block = item.as_object().ok_or_else(|| SchemaError::TypeMismatch {
                    path: format!("{path}.{i}"),
                    expected: "block",
                })?;
                for (key, child_value) in block {
                    let child_path = format!("{path}.{i}.{key}");
                    let child = nested
                        .attribute(key)
                        .ok_or_else(|| SchemaError::UnknownAttribute(child_path.clone()))?;
                    check_attribute(&child_path, child, child_value, validate)?;
                }
            }
        }
    }

    Ok(())
}
