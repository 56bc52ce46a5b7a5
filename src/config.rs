//! Engine configuration.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options recognised by the engine.
///
/// Deserializes from a loosely-typed options object (`{"preserve_json": false}`);
/// missing keys take their defaults and unknown keys are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Resolve relationship descriptors against records already in the store.
    pub follow_relationships_data: bool,
    /// Keep the raw resource (and raw document for collections) under `_jv.json`.
    pub preserve_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            follow_relationships_data: false,
            preserve_json: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn follow_relationships_data(mut self, follow: bool) -> Self {
        self.follow_relationships_data = follow;
        self
    }

    pub fn preserve_json(mut self, preserve: bool) -> Self {
        self.preserve_json = preserve;
        self
    }

    /// Parse an options object, e.g. one handed over by a host application.
    pub fn from_value(options: Value) -> Result<Self, ConfigError> {
        match options {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => {
                serde_json::from_value(options).map_err(|e| ConfigError(e.to_string()))
            }
            other => Err(ConfigError(format!("expected an options object, got {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}
