//! Manifest objects extracted from a bundle
//!
//! A [`ManifestObject`] is one decoded document: a mapping carrying at least
//! a `kind`. Objects are produced by [`loader::load_manifests`] and are
//! never modified afterwards.

pub mod loader;

pub use loader::load_manifests;

use serde_yaml::{Mapping, Value};

/// One decoded manifest document
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestObject {
    value: Value,
}

impl ManifestObject {
    /// Wrap a decoded document.
    ///
    /// Returns the reason as an error string when the document is not a
    /// mapping or has no non-empty `kind`.
    pub fn from_value(value: Value) -> std::result::Result<Self, String> {
        let Some(mapping) = value.as_mapping() else {
            return Err(format!("expected a mapping, found {}", type_name(&value)));
        };
        match mapping.get("kind") {
            Some(Value::String(kind)) if !kind.is_empty() => Ok(Self { value }),
            Some(Value::String(_)) | None => Err("object 'kind' is missing".to_string()),
            Some(other) => Err(format!(
                "object 'kind' must be a string, found {}",
                type_name(other)
            )),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn kind(&self) -> &str {
        top_level_str(&self.value, "kind")
    }

    pub fn api_version(&self) -> &str {
        top_level_str(&self.value, "apiVersion")
    }

    pub fn name(&self) -> &str {
        metadata_str(&self.value, "name")
    }

    pub fn namespace(&self) -> &str {
        metadata_str(&self.value, "namespace")
    }
}

fn top_level_str<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn metadata_str<'a>(value: &'a Value, key: &str) -> &'a str {
    value
        .get("metadata")
        .and_then(Value::as_mapping)
        .and_then(|m: &Mapping| m.get(key))
        .and_then(Value::as_str)
        .unwrap_or("")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
