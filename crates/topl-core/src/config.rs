//! Resolved configuration
//!
//! [`ResolvedConfig`] is what a resolve call hands back: the resolved tree,
//! the placeholders nothing could fill, and read-only accessors. It never
//! re-runs resolution and never exposes the tree mutably.

use std::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// The outcome of a successful resolve call
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    value: Value,
    unresolved: Vec<String>,
    passes: usize,
}

impl ResolvedConfig {
    pub(crate) fn new(value: Value, unresolved: Vec<String>, passes: usize) -> Self {
        Self {
            value,
            unresolved,
            passes,
        }
    }

    /// Get the value at an accessor path (e.g., "database.host" or "items[0]")
    pub fn get(&self, path: &str) -> Result<&Value> {
        self.value.get_path(path)
    }

    /// Whether an accessor path exists
    pub fn contains(&self, path: &str) -> bool {
        self.value.get_path(path).is_ok()
    }

    /// Get a string value, with type coercion if needed
    pub fn get_string(&self, path: &str) -> Result<String> {
        let value = self.get(path)?;
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Integer(_) | Value::Float(_) | Value::Bool(_) => Ok(value.to_string()),
            Value::Null => Ok("null".to_string()),
            _ => Err(Error::type_coercion(path, "string", value.type_name())),
        }
    }

    /// Get an integer value, with type coercion if needed
    pub fn get_i64(&self, path: &str) -> Result<i64> {
        let value = self.get(path)?;
        if let Some(i) = value.as_i64() {
            return Ok(i);
        }
        match value {
            Value::String(s) => s
                .parse()
                .map_err(|_| Error::type_coercion(path, "integer", format!("string (\"{}\")", s))),
            _ => Err(Error::type_coercion(path, "integer", value.type_name())),
        }
    }

    /// Get a float value, with type coercion if needed
    pub fn get_f64(&self, path: &str) -> Result<f64> {
        let value = self.get(path)?;
        if let Some(f) = value.as_f64() {
            return Ok(f);
        }
        match value {
            Value::String(s) => s
                .parse()
                .map_err(|_| Error::type_coercion(path, "float", format!("string (\"{}\")", s))),
            _ => Err(Error::type_coercion(path, "float", value.type_name())),
        }
    }

    /// Get a boolean value; strings must be exactly "true" or "false"
    /// (case-insensitive)
    pub fn get_bool(&self, path: &str) -> Result<bool> {
        let value = self.get(path)?;
        if let Some(b) = value.as_bool() {
            return Ok(b);
        }
        match value {
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Error::type_coercion(
                    path,
                    "boolean",
                    format!("string (\"{}\") - only \"true\" or \"false\" allowed", s),
                )),
            },
            _ => Err(Error::type_coercion(path, "boolean", value.type_name())),
        }
    }

    /// Placeholders left after both phases, sorted and without duplicates
    pub fn unresolved_placeholders(&self) -> &[String] {
        &self.unresolved
    }

    /// Whether any placeholder was left unresolved
    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Internal passes run before the tree settled
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Borrow the resolved tree
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Deep copy of the resolved tree
    pub fn to_value(&self) -> Value {
        self.value.clone()
    }

    /// Take the resolved tree
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Render the resolved tree as TOML
    ///
    /// Fails if the tree holds nulls, which TOML cannot represent.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(&self.value).map_err(|e| Error::serialize("toml", e.to_string()))
    }

    /// Render the resolved tree as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.value)
            .map_err(|e| Error::serialize("json", e.to_string()))
    }

    /// Render the resolved tree as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.value).map_err(|e| Error::serialize("yaml", e.to_string()))
    }
}

impl fmt::Display for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResolvedConfig({}", self.value)?;
        if self.has_unresolved() {
            write!(f, ", {} unresolved", self.unresolved.len())?;
        }
        write!(f, ")")
    }
}
